//! # Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Cross-cutting helpers kept apart from the command logic (`commands::`)
//! and the engine (`engine::`):
//!
//! - **`fs`**: Reading, writing and moving files on disk.
//! - **`process`**: Running external programs such as the package manager.
//! - **`ui`**: The `Console` through which all user-facing output is written.
//!
pub mod fs;
pub mod process;
pub mod ui;
