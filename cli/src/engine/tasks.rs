//! # Post-Commit Tasks
//!
//! File: cli/src/engine/tasks.rs
//!
//! Tasks are scheduled by rules through `SchematicContext::add_task` and run
//! by the workflow after the tree was committed to disk. The only task kind
//! is the package install that follows the creation of a new project.
//!
use crate::common::process;
use crate::core::config::InstallConfig;
use crate::core::error::Result;
use anyhow::Context;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Installs the dependencies of the package in `working_directory`
    /// (relative to the workflow root).
    NodePackageInstall { working_directory: String },
}

impl Task {
    pub fn node_package_install(working_directory: impl Into<String>) -> Self {
        Task::NodePackageInstall {
            working_directory: working_directory.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::NodePackageInstall { .. } => "node-package",
        }
    }
}

pub async fn execute(task: &Task, root: &Path, install: &InstallConfig) -> Result<()> {
    match task {
        Task::NodePackageInstall { working_directory } => {
            let cwd = root.join(working_directory.trim_start_matches('/'));
            info!(
                "Installing packages in '{}' with '{}'",
                cwd.display(),
                install.package_manager
            );
            process::run_command_streamed(&install.package_manager, &["install", "--quiet"], Some(&cwd))
                .await
                .with_context(|| format!("Package install failed in '{}'", cwd.display()))
        }
    }
}
