//! # Rules, Sources and the Schematic Context
//!
//! File: cli/src/engine/rules.rs
//!
//! A [`Rule`] transforms a [`Tree`]; a [`Source`] produces a fresh in-memory
//! tree (typically rendered templates). Both receive the
//! [`SchematicContext`] of the running schematic, which carries the task
//! queue and the run-wide settings a rule may need.
//!
//! Only the combinators the built-in schematics use are provided: [`chain`]
//! and [`merge_with`]. Moving a source under a directory is done on the
//! produced tree with [`Tree::move_to`].
//!
use crate::core::config::VersionsConfig;
use crate::core::error::Result;
use crate::core::templating::{EmbeddedFile, TemplateSource};
use crate::engine::tasks::Task;
use crate::engine::tree::Tree;
use std::path::PathBuf;
use tracing::debug;

pub type Rule = Box<dyn FnOnce(&mut Tree, &mut SchematicContext) -> Result<()>>;
pub type Source = Box<dyn FnOnce(&mut SchematicContext) -> Result<Tree>>;

/// How a merge treats a create over a path that already holds other content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    #[default]
    Default,
    Overwrite,
}

#[derive(Debug)]
pub struct SchematicContext {
    pub collection: String,
    pub schematic: String,
    force: bool,
    versions: VersionsConfig,
    template_root: Option<PathBuf>,
    tasks: Vec<Task>,
}

impl SchematicContext {
    pub fn new(collection: impl Into<String>, schematic: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            schematic: schematic.into(),
            force: false,
            versions: VersionsConfig::default(),
            template_root: None,
            tasks: Vec::new(),
        }
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_versions(mut self, versions: VersionsConfig) -> Self {
        self.versions = versions;
        self
    }

    pub fn with_template_root(mut self, root: Option<PathBuf>) -> Self {
        self.template_root = root;
        self
    }

    pub fn versions(&self) -> &VersionsConfig {
        &self.versions
    }

    pub fn strategy(&self) -> MergeStrategy {
        if self.force {
            MergeStrategy::Overwrite
        } else {
            MergeStrategy::Default
        }
    }

    pub fn add_task(&mut self, task: Task) {
        debug!(
            "{}:{} scheduled task {:?}",
            self.collection, self.schematic, task
        );
        self.tasks.push(task);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    /// Resolves a template set of the running schematic. A directory
    /// `<template_root>/<schematic>/<set>` takes precedence over the
    /// embedded files.
    pub fn template_source(&self, set: &str, embedded: &'static [EmbeddedFile]) -> TemplateSource {
        if let Some(root) = &self.template_root {
            let dir = root.join(&self.schematic).join(set);
            if dir.is_dir() {
                debug!("Using template directory {}", dir.display());
                return TemplateSource::Directory(dir);
            }
        }
        TemplateSource::Embedded(embedded)
    }
}

/// Runs rules in order against the same tree.
pub fn chain(rules: Vec<Rule>) -> Rule {
    Box::new(move |tree, context| {
        for rule in rules {
            rule(tree, context)?;
        }
        Ok(())
    })
}

/// Produces the source tree and merges it into the target using the
/// context's merge strategy.
pub fn merge_with(source: Source) -> Rule {
    Box::new(move |tree, context| {
        let produced = source(context)?;
        tree.merge(produced, context.strategy())
    })
}
