//! # Schematics Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the configuration of the
//! Schematics CLI. Configuration controls the side effects of a run that are
//! not expressed as schematic options: which package manager the post-install
//! task invokes, the library versions written into generated projects, and an
//! optional directory of user-provided template sets.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Environment variables (`SCHEMATICS_PACKAGE_MANAGER`,
//!    `SCHEMATICS_SKIP_INSTALL`, `SCHEMATICS_TEMPLATES_DIR`)
//! 2. Project-specific `.schematics.toml` in the current directory or an
//!    ancestor (the search stops at a directory containing `.git`)
//! 3. User-specific `config.toml` in the platform config directory
//! 4. Default values defined in the code
//!
//! ## Examples
//!
//! ```toml
//! [install]
//! package_manager = "pnpm"
//!
//! [versions]
//! core = "17.3.0"
//! schematics = "17.3.0"
//!
//! [templates]
//! directory = "~/my-schematic-templates"
//! ```
//!
use crate::core::error::{Result, SchematicsError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,
    #[serde(default)]
    pub versions: VersionsConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Settings for the package-install task scheduled by new projects.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InstallConfig {
    /// Executable used to install dependencies (`npm`, `yarn`, `pnpm`...).
    #[serde(default = "default_package_manager")]
    pub package_manager: String,
    /// Never run install tasks.
    #[serde(default)]
    pub skip: bool,
}

/// Library versions substituted into generated `package.json` files.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VersionsConfig {
    #[serde(default = "default_core_version")]
    pub core: String,
    #[serde(default = "default_schematics_version")]
    pub schematics: String,
}

/// Location of user-provided template sets overriding the built-in ones.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Root directory laid out as `<dir>/<schematic>/<template-set>/...`.
    pub directory: Option<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            package_manager: default_package_manager(),
            skip: false,
        }
    }
}

impl Default for VersionsConfig {
    fn default() -> Self {
        Self {
            core: default_core_version(),
            schematics: default_schematics_version(),
        }
    }
}

fn default_package_manager() -> String {
    "npm".to_string()
}
fn default_core_version() -> String {
    "17.3.0".to_string()
}
fn default_schematics_version() -> String {
    "17.3.0".to_string()
}

const PROJECT_CONFIG_FILENAME: &str = ".schematics.toml";

pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config()?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    apply_env_overrides(&mut merged_config, |key| env::var(key).ok())?;
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("io", "Schematics", "schematics") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config() -> Result<Option<Config>> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    if let Some(project_config_path) = find_project_config_path(&current_dir) {
        info!(
            "Loading project configuration from: {}",
            project_config_path.display()
        );
        load_config_from_path(&project_config_path).map(Some)
    } else {
        debug!("No project configuration file (.schematics.toml) found.");
        Ok(None)
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win whenever they differ from the built-in default.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.install.package_manager =
        if project_cfg.install.package_manager != default_package_manager() {
            project_cfg.install.package_manager
        } else {
            user.install.package_manager
        };
    merged.install.skip = project_cfg.install.skip || user.install.skip;
    merged.versions.core = if project_cfg.versions.core != default_core_version() {
        project_cfg.versions.core
    } else {
        user.versions.core
    };
    merged.versions.schematics =
        if project_cfg.versions.schematics != default_schematics_version() {
            project_cfg.versions.schematics
        } else {
            user.versions.schematics
        };
    merged.templates.directory = project_cfg
        .templates
        .directory
        .or(user.templates.directory);
    merged
}

fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(pm) = lookup("SCHEMATICS_PACKAGE_MANAGER") {
        debug!("SCHEMATICS_PACKAGE_MANAGER overrides package manager: {}", pm);
        config.install.package_manager = pm;
    }
    if let Some(skip) = lookup("SCHEMATICS_SKIP_INSTALL") {
        config.install.skip = match skip.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" | "" => false,
            other => {
                return Err(anyhow!(SchematicsError::Config(format!(
                    "Invalid value for SCHEMATICS_SKIP_INSTALL: '{}'",
                    other
                ))))
            }
        };
    }
    if let Some(dir) = lookup("SCHEMATICS_TEMPLATES_DIR") {
        config.templates.directory = Some(dir);
    }
    Ok(())
}

fn expand_config_paths(config: &mut Config) {
    if let Some(dir) = config.templates.directory.as_mut() {
        *dir = shellexpand::tilde(dir).into_owned();
        debug!("Expanded templates directory: {}", dir);
    }
}

fn validate_config(config: &Config) -> Result<()> {
    if config.install.package_manager.trim().is_empty() {
        return Err(anyhow!(SchematicsError::Config(
            "install.package_manager cannot be empty.".to_string()
        )));
    }
    if config.versions.core.trim().is_empty() || config.versions.schematics.trim().is_empty() {
        return Err(anyhow!(SchematicsError::Config(
            "versions.core and versions.schematics cannot be empty.".to_string()
        )));
    }
    if let Some(dir) = &config.templates.directory {
        let path = PathBuf::from(dir);
        if !path.exists() {
            warn!(
                "Configured templates directory '{}' does not exist.",
                path.display()
            );
        } else if !path.is_dir() {
            return Err(anyhow!(SchematicsError::Config(format!(
                "Configured templates path '{}' exists but is not a directory.",
                path.display()
            ))));
        }
    }
    Ok(())
}
