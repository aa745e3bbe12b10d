//! # Built-in Schematics
//!
//! File: cli/src/schematics/mod.rs
//!
//! ## Overview
//!
//! The schematics compiled into the binary, exposed as the collection
//! `@schematics/schematics`. The collection manifest (`collection.json`)
//! names each schematic's factory by the same string form a JavaScript
//! collection would use; [`builtin_factory`] maps those strings to native
//! functions.
//!
//! | Schematic | Factory           | Purpose                                    |
//! |-----------|-------------------|--------------------------------------------|
//! | `blank`   | `./blank/factory` | New schematic project, or a new schematic  |
//!
use crate::core::error::Result;
use crate::engine::rules::Rule;
use serde_json::{Map, Value};

pub mod blank;

/// Builds the rule of a schematic from its options.
pub type FactoryFn = fn(Map<String, Value>) -> Result<Rule>;

pub const BUILTIN_COLLECTION_MANIFEST: &str = include_str!("collection.json");

pub fn builtin_factory(factory: &str) -> Option<FactoryFn> {
    match factory {
        "./blank/factory" => Some(blank::factory),
        _ => None,
    }
}
