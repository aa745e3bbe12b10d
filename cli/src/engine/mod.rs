//! # Schematics Engine
//!
//! File: cli/src/engine/mod.rs
//!
//! ## Overview
//!
//! The host-side engine that runs a schematic against the working directory:
//! - `collection`: Locating collection manifests and resolving schematics
//! - `tree`: The staged, in-memory view of the file system
//! - `rules`: Rules, sources, combinators and the schematic context
//! - `tasks`: Work scheduled by rules to run after the commit
//! - `workflow`: Executing a schematic, emitting events, committing changes
//!
pub mod collection;
pub mod rules;
pub mod tasks;
pub mod tree;
pub mod workflow;
