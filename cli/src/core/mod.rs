//! # Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundational pieces shared by the engine and the command layer:
//! - `config`: Configuration loading, merging, and validation
//! - `error`: Error types and the crate-wide `Result` alias
//! - `strings`: Name case conversions (`dasherize`, `camelize`)
//! - `templating`: Rendering template sets into in-memory trees
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{Result, SchematicsError}; // For error handling
//! use crate::core::strings; // For name conversions
//! ```
//!
pub mod config;
pub mod error;
pub mod strings;
pub mod templating;
