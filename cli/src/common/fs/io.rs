//! # Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` used when a staged tree is committed and
//! when manifests are read. Every error carries the offending path as
//! `anyhow` context.
//!
//! - **`ensure_dir_exists`**: Creates a directory and its parents if missing; fails if the path is a file.
//! - **`read_file_to_string`**: Reads a whole file.
//! - **`write_bytes_to_file`**: Writes a file, creating parent directories first.
//! - **`remove_file`**: Deletes a file.
//! - **`rename_file`**: Moves a file, creating the destination's parent directories.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::write_bytes_to_file(&root.join("my-thing/package.json"), b"{}")?;
//! let content = io::read_file_to_string(&root.join("my-thing/package.json"))?;
//! ```
//!
use crate::core::error::Result;
use anyhow::{bail, Context};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Ensures that a directory exists at `path`, creating parents as needed.
///
/// # Errors
///
/// Fails if the path exists but is not a directory, or if creation fails.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        bail!("Path exists but is not a directory: {:?}", path);
    }
    Ok(())
}

pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Writes `content` to `path`, replacing any existing file.
pub fn write_bytes_to_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write to file {:?}", path))?;
    debug!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).with_context(|| format!("Failed to remove file {:?}", path))
}

pub fn rename_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        ensure_dir_exists(parent)?;
    }
    fs::rename(from, to).with_context(|| format!("Failed to rename {:?} to {:?}", from, to))
}
