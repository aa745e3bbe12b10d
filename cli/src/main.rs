//! # Schematics CLI Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `schematics` binary. It:
//! - Sets up `tracing` diagnostics on stderr (`warn` by default, `debug`
//!   with `--verbose`, `RUST_LOG` overrides both)
//! - Hands the process arguments to the schematic runner
//! - Exits with the code the runner returns
//!
//! ## Examples
//!
//! ```bash
//! # Scaffold a new schematics project in ./my-thing
//! schematics blank --name=my-thing
//!
//! # Show what a local collection's schematic would do, without writing
//! schematics ./my-thing/src/collection.json:my-thing --dry-run
//!
//! # List the schematics of the built-in collection
//! schematics --list-schematics
//! ```
//!
use std::io;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;
mod engine;
mod schematics;

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Only the runner's own `--verbose` raises the level; schematic options
    // after `--` do not count.
    let verbose = args
        .iter()
        .take_while(|a| *a != "--")
        .any(|a| a == "--verbose");
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Process arguments: {:?}", args);

    let code = commands::schematic::run(&args, io::stdout(), io::stderr()).await;
    std::process::exit(code);
}
