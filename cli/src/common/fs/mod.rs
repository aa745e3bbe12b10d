//! # Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Disk access used outside the staged [`Tree`](crate::engine::tree::Tree).
//! See [`io`] for the individual operations.
//!
pub mod io;
