//! # Command Handlers
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! The `schematics` binary has a single command surface: run (or list) the
//! schematics of a collection. Its implementation lives in [`schematic`];
//! `main` only sets up logging and hands over the process arguments.
//!
pub mod schematic;
