//! # Collections
//!
//! File: cli/src/engine/collection.rs
//!
//! ## Overview
//!
//! A collection is a JSON manifest mapping schematic names to their
//! descriptions:
//!
//! ```json
//! {
//!   "schematics": {
//!     "blank": { "description": "...", "factory": "./blank/factory" }
//!   }
//! }
//! ```
//!
//! Collections are resolved from a name:
//! - `@schematics/schematics` is the built-in collection compiled into the
//!   binary; its factories are native.
//! - Names starting with `.` or `/` are paths: a manifest file, or a
//!   directory holding `collection.json` or a `package.json` whose
//!   `schematics` field points at the manifest.
//! - Any other name is looked up as an installed package under
//!   `node_modules/<name>`.
//!
//! Only built-in factories can be executed; other collections can be listed.
//!
use crate::common::fs::io;
use crate::core::error::{Result, SchematicsError};
use crate::engine::rules::Rule;
use crate::schematics::{self, FactoryFn};
use anyhow::{anyhow, Context};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_COLLECTION: &str = "@schematics/schematics";

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SchematicDescription {
    #[serde(default)]
    pub description: String,
    pub factory: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub name: String,
    /// Manifest location on disk; `None` for the built-in collection.
    pub path: Option<PathBuf>,
    // Manifest order is kept.
    schematics: Vec<(String, SchematicDescription)>,
}

pub fn is_local_collection(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('/')
}

impl Collection {
    /// Parses a manifest. `fallback_name` is used when the manifest has no `name`.
    pub fn from_manifest(fallback_name: &str, manifest: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(manifest).map_err(|e| {
            anyhow!(SchematicsError::InvalidCollection(format!(
                "Collection \"{}\" is not valid JSON: {}",
                fallback_name, e
            )))
        })?;
        let object = value.as_object().ok_or_else(|| {
            SchematicsError::InvalidCollection("Invalid collection content.".to_string())
        })?;
        let entries: &Map<String, Value> = object
            .get("schematics")
            .and_then(Value::as_object)
            .ok_or_else(|| {
                SchematicsError::InvalidCollection(
                    "Invalid collection.json; schematics needs to be an object.".to_string(),
                )
            })?;

        let mut schematics = Vec::with_capacity(entries.len());
        for (name, entry) in entries {
            let description: SchematicDescription = serde_json::from_value(entry.clone())
                .with_context(|| format!("Invalid description for schematic \"{}\"", name))?;
            schematics.push((name.clone(), description));
        }

        let name = object
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name)
            .to_string();
        Ok(Self {
            name,
            path: None,
            schematics,
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_manifest(DEFAULT_COLLECTION, schematics::BUILTIN_COLLECTION_MANIFEST)
    }

    /// Resolves `name` relative to `cwd`.
    pub fn load(name: &str, cwd: &Path) -> Result<Self> {
        if name == DEFAULT_COLLECTION {
            return Self::builtin();
        }
        let manifest_path = if is_local_collection(name) {
            resolve_manifest_path(&cwd.join(name))
        } else {
            resolve_manifest_path(&cwd.join("node_modules").join(name))
        }
        .ok_or_else(|| SchematicsError::CollectionNotFound(name.to_string()))?;

        debug!(
            "Loading collection '{}' from {}",
            name,
            manifest_path.display()
        );
        let content = io::read_file_to_string(&manifest_path)?;
        let mut collection = Self::from_manifest(name, &content)?;
        collection.path = Some(manifest_path);
        Ok(collection)
    }

    pub fn is_builtin(&self) -> bool {
        self.path.is_none()
    }

    /// Finds a schematic by name or alias.
    pub fn find(&self, name: &str) -> Option<(&str, &SchematicDescription)> {
        self.schematics
            .iter()
            .find(|(key, _)| key == name)
            .or_else(|| {
                self.schematics
                    .iter()
                    .find(|(_, desc)| desc.aliases.iter().any(|a| a == name))
            })
            .map(|(key, desc)| (key.as_str(), desc))
    }

    /// Names of schematics meant to be run from the command line.
    pub fn list_schematic_names(&self) -> Vec<String> {
        self.schematics
            .iter()
            .filter(|(_, desc)| !desc.hidden && !desc.private)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Looks up the schematic and returns the factory that builds its rule.
    pub fn create_factory(&self, name: &str, allow_private: bool) -> Result<(String, FactoryFn)> {
        let (key, description) =
            self.find(name)
                .ok_or_else(|| SchematicsError::SchematicNotFound {
                    schematic: name.to_string(),
                    collection: self.name.clone(),
                })?;
        debug!("Resolved schematic '{}': {}", key, description.description);
        if description.private && !allow_private {
            return Err(SchematicsError::PrivateSchematic(key.to_string()).into());
        }
        let factory = self
            .is_builtin()
            .then(|| schematics::builtin_factory(&description.factory))
            .flatten()
            .ok_or_else(|| SchematicsError::UnsupportedFactory {
                schematic: key.to_string(),
                factory: description.factory.clone(),
            })?;
        Ok((key.to_string(), factory))
    }
}

fn resolve_manifest_path(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }
    let collection_json = path.join("collection.json");
    if collection_json.is_file() {
        return Some(collection_json);
    }
    let package_json = io::read_file_to_string(&path.join("package.json")).ok()?;
    let package: Value = serde_json::from_str(&package_json).ok()?;
    let manifest = path.join(package.get("schematics")?.as_str()?);
    manifest.is_file().then_some(manifest)
}

/// Calls the factory for `options`; missing required options surface here,
/// before any tree is touched.
pub fn build_rule(factory: FactoryFn, options: Map<String, Value>) -> Result<Rule> {
    factory(options)
}
