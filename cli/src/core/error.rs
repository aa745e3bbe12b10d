//! # Schematics Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the Schematics CLI.
//! It follows a two-layer approach:
//! - `SchematicsError`: a `thiserror` enum for failures callers may need to
//!   match on (missing options, invalid manifests, tree conflicts, the
//!   unsuccessful-workflow sentinel).
//! - `Result<T>`: an alias for `anyhow::Result<T>` so any error can be
//!   propagated with `?` and enriched with `.context(...)`.
//!
//! The error taxonomy mirrors how failures are surfaced to the user:
//! - **Configuration errors**: a required schematic option is missing
//!   (`OptionIsNotDefined`) or the tool configuration is invalid (`Config`).
//! - **Data errors**: unreadable or structurally invalid collection
//!   manifests (`InvalidCollection`).
//! - **Tree errors**: conflicting operations on the staged tree.
//! - **Workflow errors**: the `UnsuccessfulWorkflowExecution` sentinel, raised
//!   after the details were already reported as dry-run error events.
//!
//! ## Examples
//!
//! ```rust
//! // Pattern matching on the sentinel after a failed execution
//! match result {
//!     Err(e) if matches!(e.downcast_ref::<SchematicsError>(),
//!                        Some(SchematicsError::UnsuccessfulWorkflowExecution)) => {
//!         console.fatal("The Schematic workflow failed. See above.");
//!     }
//!     Err(e) => console.fatal(&format!("{:#}", e)),
//!     Ok(()) => {}
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the Schematics CLI.
#[derive(Error, Debug)]
pub enum SchematicsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Option ({0}) is not defined.")]
    OptionIsNotDefined(String),

    #[error("{0}")]
    InvalidCollection(String),

    #[error("Path \"{0}\" already exist.")]
    FileAlreadyExists(String),

    #[error("Path \"{0}\" does not exist.")]
    FileDoesNotExist(String),

    #[error("A merge conflicted on path \"{0}\".")]
    MergeConflict(String),

    #[error("Collection \"{0}\" cannot be resolved.")]
    CollectionNotFound(String),

    #[error("Schematic \"{schematic}\" not found in collection \"{collection}\".")]
    SchematicNotFound {
        schematic: String,
        collection: String,
    },

    #[error("Schematic \"{0}\" is private and cannot be run from the command line. Use --allow-private.")]
    PrivateSchematic(String),

    #[error("Schematic \"{schematic}\" uses factory \"{factory}\" which cannot be executed by this runner.")]
    UnsupportedFactory { schematic: String, factory: String },

    #[error("Workflow did not execute successfully.")]
    UnsuccessfulWorkflowExecution,

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("External command failed: {cmd}, Status: {status}")]
    ExternalCommand { cmd: String, status: String },
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
