//! # Integration Test Helpers
//!
//! File: cli/tests/common.rs
//!
//! Shared by every integration test file in `cli/tests/`.
//!
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;

/// Command for the compiled `schematics` binary.
pub fn schematics_cmd() -> Command {
    Command::cargo_bin("schematics").expect("Failed to find schematics binary for testing")
}

/// Command running inside `dir`, isolated from the user's configuration and
/// never spawning a package manager.
pub fn schematics_in(dir: &Path) -> Command {
    let mut cmd = schematics_cmd();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("SCHEMATICS_SKIP_INSTALL", "true")
        .env_remove("SCHEMATICS_TEMPLATES_DIR")
        .env_remove("SCHEMATICS_PACKAGE_MANAGER")
        .env_remove("RUST_LOG");
    cmd
}
