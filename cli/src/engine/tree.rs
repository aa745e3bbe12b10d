//! # Staged File Tree
//!
//! File: cli/src/engine/tree.rs
//!
//! ## Overview
//!
//! `Tree` is an in-memory, staged view of a directory. Reads fall through to
//! the disk (when the tree has a root) unless the path was touched by a
//! staged operation; writes are buffered and recorded as an ordered list of
//! [`Action`]s that the workflow later validates, reports and commits.
//!
//! Trees without a root (`Tree::empty()`) are used as template sources: they
//! are rendered in memory, optionally moved under a directory, and merged
//! into the host tree.
//!
//! ## Action Coalescing
//!
//! Successive operations on the same path collapse into the smallest
//! equivalent action so that reports stay readable:
//! - create, then overwrite => create with the final content
//! - create, then delete => nothing
//! - create, then rename => create at the new path
//! - overwrite, then delete => delete
//!
//! All paths are normalized to absolute, `/`-separated form (`src/a.ts` and
//! `/src/./a.ts` are the same path). A path may not climb above the root.
//!
use crate::core::error::{Result, SchematicsError};
use crate::engine::rules::MergeStrategy;
use anyhow::{bail, Context};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A single staged change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Create { path: String, content: Vec<u8> },
    Overwrite { path: String, content: Vec<u8> },
    Rename { from: String, to: String },
    Delete { path: String },
}

/// Normalizes a tree path to absolute `/`-separated form.
pub fn normalize_path(path: &str) -> Result<String> {
    let mut parts: Vec<&str> = Vec::new();
    let unified = path.replace('\\', "/");
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    bail!("Path \"{}\" escapes the root of the tree.", path);
                }
            }
            other => parts.push(other),
        }
    }
    Ok(format!("/{}", parts.join("/")))
}

/// Joins a directory and a tree path: `join_path("app", "/src/a.ts")` => `/app/src/a.ts`.
pub fn join_path(dir: &str, path: &str) -> Result<String> {
    normalize_path(&format!("{}/{}", dir, path))
}

#[derive(Debug, Default)]
pub struct Tree {
    root: Option<PathBuf>,
    // `None` marks a path deleted in this tree.
    staged: BTreeMap<String, Option<Vec<u8>>>,
    actions: Vec<Action>,
}

impl Tree {
    /// A tree with no backing directory.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A tree staged over `root`; nothing is written until the workflow commits.
    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Paths holding content that was staged in this tree (disk files are not listed).
    pub fn staged_files(&self) -> Vec<&str> {
        self.staged
            .iter()
            .filter(|(_, content)| content.is_some())
            .map(|(path, _)| path.as_str())
            .collect()
    }

    fn read_base(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let Some(root) = &self.root else {
            return Ok(None);
        };
        let disk_path = root.join(path.trim_start_matches('/'));
        if !disk_path.is_file() {
            return Ok(None);
        }
        fs::read(&disk_path)
            .map(Some)
            .with_context(|| format!("Failed to read {}", disk_path.display()))
    }

    pub fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let path = normalize_path(path)?;
        match self.staged.get(&path) {
            Some(content) => Ok(content.clone()),
            None => self.read_base(&path),
        }
    }

    pub fn read_to_string(&self, path: &str) -> Result<Option<String>> {
        match self.read(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .with_context(|| format!("File \"{}\" is not valid UTF-8", path)),
            None => Ok(None),
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        matches!(self.read(path), Ok(Some(_)))
    }

    pub fn create(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = normalize_path(path)?;
        if self.exists(&path) {
            bail!(SchematicsError::FileAlreadyExists(path));
        }
        let content = content.into();
        self.staged.insert(path.clone(), Some(content.clone()));
        self.actions.push(Action::Create { path, content });
        Ok(())
    }

    pub fn overwrite(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = normalize_path(path)?;
        if !self.exists(&path) {
            bail!(SchematicsError::FileDoesNotExist(path));
        }
        let content = content.into();
        self.staged.insert(path.clone(), Some(content.clone()));
        for action in self.actions.iter_mut().rev() {
            match action {
                Action::Create { path: p, content: c } | Action::Overwrite { path: p, content: c }
                    if *p == path =>
                {
                    *c = content;
                    return Ok(());
                }
                _ => {}
            }
        }
        self.actions.push(Action::Overwrite { path, content });
        Ok(())
    }

    pub fn delete(&mut self, path: &str) -> Result<()> {
        let path = normalize_path(path)?;
        if !self.exists(&path) {
            bail!(SchematicsError::FileDoesNotExist(path));
        }
        self.staged.insert(path.clone(), None);
        let previous = self.actions.iter().rposition(|a| {
            matches!(a, Action::Create { path: p, .. } | Action::Overwrite { path: p, .. } if *p == path)
        });
        match previous {
            Some(i) if matches!(self.actions[i], Action::Create { .. }) => {
                self.actions.remove(i);
            }
            Some(i) => self.actions[i] = Action::Delete { path },
            None => self.actions.push(Action::Delete { path }),
        }
        Ok(())
    }

    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let from = normalize_path(from)?;
        let to = normalize_path(to)?;
        let content = self
            .read(&from)?
            .ok_or_else(|| SchematicsError::FileDoesNotExist(from.clone()))?;
        if self.exists(&to) {
            bail!(SchematicsError::FileAlreadyExists(to));
        }
        self.staged.insert(from.clone(), None);
        self.staged.insert(to.clone(), Some(content));
        let created = self
            .actions
            .iter_mut()
            .rev()
            .find(|a| matches!(a, Action::Create { path, .. } if *path == from));
        match created {
            Some(Action::Create { path, .. }) => *path = to,
            _ => self.actions.push(Action::Rename { from, to }),
        }
        Ok(())
    }

    /// Replays the actions of `other` onto this tree.
    ///
    /// A create over an existing path is a conflict unless the content is
    /// identical or the strategy is [`MergeStrategy::Overwrite`].
    pub fn merge(&mut self, other: Tree, strategy: MergeStrategy) -> Result<()> {
        for action in other.actions {
            match action {
                Action::Create { path, content } => {
                    if !self.exists(&path) {
                        self.create(&path, content)?;
                    } else if self.read(&path)?.as_deref() == Some(content.as_slice()) {
                        debug!("Skipping identical file during merge: {}", path);
                    } else if strategy == MergeStrategy::Overwrite {
                        self.overwrite(&path, content)?;
                    } else {
                        bail!(SchematicsError::MergeConflict(path));
                    }
                }
                Action::Overwrite { path, content } => {
                    if self.exists(&path) {
                        self.overwrite(&path, content)?;
                    } else {
                        self.create(&path, content)?;
                    }
                }
                Action::Delete { path } => {
                    if self.exists(&path) {
                        self.delete(&path)?;
                    }
                }
                Action::Rename { from, to } => self.rename(&from, &to)?,
            }
        }
        Ok(())
    }

    /// Moves every staged path of a rootless tree under `dir`.
    pub fn move_to(&mut self, dir: &str) -> Result<()> {
        if self.root.is_some() {
            bail!("Only in-memory trees can be moved.");
        }
        let staged = std::mem::take(&mut self.staged);
        for (path, content) in staged {
            self.staged.insert(join_path(dir, &path)?, content);
        }
        for action in &mut self.actions {
            match action {
                Action::Create { path, .. }
                | Action::Overwrite { path, .. }
                | Action::Delete { path } => *path = join_path(dir, path)?,
                Action::Rename { from, to } => {
                    *from = join_path(dir, from)?;
                    *to = join_path(dir, to)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("src/a.ts").unwrap(), "/src/a.ts");
        assert_eq!(normalize_path("/src/./a.ts").unwrap(), "/src/a.ts");
        assert_eq!(normalize_path("./src//b/../a.ts").unwrap(), "/src/a.ts");
        assert_eq!(normalize_path("src\\a.ts").unwrap(), "/src/a.ts");
        assert_eq!(normalize_path("").unwrap(), "/");
        assert!(normalize_path("../outside").is_err());
    }

    #[test]
    fn test_create_then_overwrite_coalesces() -> Result<()> {
        let mut tree = Tree::empty();
        tree.create("a.txt", "one")?;
        tree.overwrite("/a.txt", "two")?;
        assert_eq!(
            tree.actions(),
            &[Action::Create {
                path: "/a.txt".into(),
                content: b"two".to_vec()
            }]
        );
        assert_eq!(tree.read_to_string("a.txt")?.as_deref(), Some("two"));
        Ok(())
    }

    #[test]
    fn test_create_then_delete_leaves_nothing() -> Result<()> {
        let mut tree = Tree::empty();
        tree.create("a.txt", "one")?;
        tree.delete("a.txt")?;
        assert!(tree.actions().is_empty());
        assert!(!tree.exists("a.txt"));
        Ok(())
    }

    #[test]
    fn test_create_then_rename_moves_create() -> Result<()> {
        let mut tree = Tree::empty();
        tree.create("a.txt", "one")?;
        tree.rename("a.txt", "b/c.txt")?;
        assert_eq!(
            tree.actions(),
            &[Action::Create {
                path: "/b/c.txt".into(),
                content: b"one".to_vec()
            }]
        );
        assert!(!tree.exists("a.txt"));
        Ok(())
    }

    #[test]
    fn test_disk_backed_reads_and_conflicts() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("existing.txt"), "on disk")?;
        let mut tree = Tree::from_dir(dir.path());

        assert!(tree.exists("/existing.txt"));
        assert_eq!(tree.read_to_string("existing.txt")?.as_deref(), Some("on disk"));

        let err = tree.create("existing.txt", "new").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchematicsError>(),
            Some(SchematicsError::FileAlreadyExists(_))
        ));
        assert!(tree.overwrite("missing.txt", "x").is_err());

        tree.overwrite("existing.txt", "updated")?;
        tree.delete("existing.txt")?;
        assert_eq!(
            tree.actions(),
            &[Action::Delete {
                path: "/existing.txt".into()
            }]
        );
        // Staged only; the disk is untouched.
        assert_eq!(fs::read_to_string(dir.path().join("existing.txt"))?, "on disk");
        Ok(())
    }

    #[test]
    fn test_move_to_prefixes_all_paths() -> Result<()> {
        let mut tree = Tree::empty();
        tree.create("README.md", "# readme")?;
        tree.create("src/index.ts", "export {}")?;
        tree.move_to("my-thing")?;
        assert_eq!(
            tree.staged_files(),
            vec!["/my-thing/README.md", "/my-thing/src/index.ts"]
        );
        assert!(tree.exists("my-thing/src/index.ts"));
        assert!(!tree.exists("src/index.ts"));
        Ok(())
    }

    #[test]
    fn test_merge_strategies() -> Result<()> {
        let mut host = Tree::empty();
        host.create("same.txt", "same")?;
        host.create("differs.txt", "host")?;

        let mut identical = Tree::empty();
        identical.create("same.txt", "same")?;
        host.merge(identical, MergeStrategy::Default)?;

        let mut conflicting = Tree::empty();
        conflicting.create("differs.txt", "source")?;
        let err = host.merge(conflicting, MergeStrategy::Default).unwrap_err();
        assert!(err.to_string().contains("merge conflicted"));

        let mut conflicting = Tree::empty();
        conflicting.create("differs.txt", "source")?;
        host.merge(conflicting, MergeStrategy::Overwrite)?;
        assert_eq!(host.read_to_string("differs.txt")?.as_deref(), Some("source"));
        Ok(())
    }
}
