//! # Console Output (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! `Console` is the single sink for user-facing output. It is generic over
//! its writers so commands can be driven against in-memory buffers in tests
//! and against the process streams in `main`.
//!
//! | Level   | Stream | Shown                 |
//! |---------|--------|-----------------------|
//! | `debug` | stdout | only with `--verbose` |
//! | `info`  | stdout | always                |
//! | `warn`  | stderr | always, yellow        |
//! | `error` | stderr | always, red           |
//! | `fatal` | stderr | always, bold red      |
//!
//! Diagnostics for developers go through `tracing` instead; the console is
//! what the user reads.
//!
use colored::Colorize;
use std::fmt::Display;
use std::io::Write;
use tracing::warn;

/// Writes one line. Write failures are logged and otherwise ignored.
fn write_line(writer: &mut impl Write, line: impl Display) {
    if let Err(e) = writeln!(writer, "{}", line) {
        warn!("Failed to write console output: {}", e);
    }
}

pub struct Console<O: Write, E: Write> {
    out: O,
    err: E,
    verbose: bool,
}

impl<O: Write, E: Write> Console<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            verbose: false,
        }
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn debug(&mut self, message: &str) {
        if self.verbose {
            write_line(&mut self.out, message.dimmed());
        }
    }

    pub fn info(&mut self, message: &str) {
        write_line(&mut self.out, message);
    }

    pub fn warn(&mut self, message: &str) {
        write_line(&mut self.err, message.yellow());
    }

    pub fn error(&mut self, message: &str) {
        write_line(&mut self.err, message.red());
    }

    pub fn fatal(&mut self, message: &str) {
        write_line(&mut self.err, message.red().bold());
    }

    /// Returns the underlying writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}
