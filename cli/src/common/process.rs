//! # Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Wrappers around `tokio::process::Command` for running external tools
//! (currently the package manager invoked by the install task). Output is
//! streamed straight to the user's terminal; a non-zero exit status is mapped
//! to `SchematicsError::ExternalCommand`.
//!
//! ```rust
//! process::run_command_streamed("npm", &["install", "--quiet"], Some(project_dir)).await?;
//! ```
//!
use crate::core::error::{Result, SchematicsError};
use anyhow::{anyhow, Context};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `cmd args...` with inherited stdio, optionally inside `cwd`, and
/// waits for it to finish.
pub async fn run_command_streamed(cmd: &str, args: &[&str], cwd: Option<&Path>) -> Result<()> {
    let mut command = Command::new(cmd);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }
    debug!("Running '{} {}' in {:?}", cmd, args.join(" "), cwd);

    let status = command
        .status()
        .await
        .with_context(|| format!("Failed to start '{}'. Is it installed and on PATH?", cmd))?;

    if !status.success() {
        return Err(anyhow!(SchematicsError::ExternalCommand {
            cmd: format!("{} {}", cmd, args.join(" ")),
            status: status.to_string(),
        }));
    }
    Ok(())
}
