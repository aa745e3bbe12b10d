//! # Workflow Reporting
//!
//! File: cli/src/commands/schematic/report.rs
//!
//! ## Overview
//!
//! `Reporter` turns workflow events into console output. Changes are queued
//! and printed together at the end of a phase (`WorkflowEnd` or
//! `PostTasksStart`). An `Error` event is printed immediately and suppresses
//! the queued changes of its phase, since nothing of that phase is applied.
//!
//! ```text
//! CREATE my-thing/README.md (639 bytes)
//! UPDATE src/collection.json (173 bytes)
//! DELETE src/old.ts
//! RENAME src/a.ts => src/b.ts
//! ERROR! src/app.ts already exists.
//! ```
//!
use crate::common::ui::Console;
use crate::engine::workflow::{DryRunErrorKind, DryRunEvent, LifeCycleEvent, WorkflowObserver};
use colored::Colorize;
use std::io::Write;
use tracing::debug;

pub struct Reporter<'a, O: Write, E: Write> {
    console: &'a mut Console<O, E>,
    queue: Vec<String>,
    error: bool,
    nothing_done: bool,
}

impl<'a, O: Write, E: Write> Reporter<'a, O, E> {
    pub fn new(console: &'a mut Console<O, E>) -> Self {
        Self {
            console,
            queue: Vec::new(),
            error: false,
            nothing_done: true,
        }
    }

    /// True until the first reporter event.
    pub fn nothing_done(&self) -> bool {
        self.nothing_done
    }

    fn flush(&mut self) {
        if !self.error {
            for line in &self.queue {
                self.console.info(line);
            }
        }
        self.queue.clear();
        self.error = false;
    }
}

fn display_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

impl<O: Write, E: Write> WorkflowObserver for Reporter<'_, O, E> {
    fn on_report(&mut self, event: &DryRunEvent) {
        self.nothing_done = false;
        match event {
            DryRunEvent::Error { path, description } => {
                self.error = true;
                let reason = match description {
                    DryRunErrorKind::AlreadyExist => "already exists",
                    DryRunErrorKind::DoesNotExist => "does not exist",
                };
                self.console
                    .error(&format!("ERROR! {} {}.", display_path(path), reason));
            }
            DryRunEvent::Create { path, content } => self.queue.push(format!(
                "{} {} ({} bytes)",
                "CREATE".green(),
                display_path(path),
                content.len()
            )),
            DryRunEvent::Update { path, content } => self.queue.push(format!(
                "{} {} ({} bytes)",
                "UPDATE".cyan(),
                display_path(path),
                content.len()
            )),
            DryRunEvent::Delete { path } => self
                .queue
                .push(format!("{} {}", "DELETE".yellow(), display_path(path))),
            DryRunEvent::Rename { path, to } => self.queue.push(format!(
                "{} {} => {}",
                "RENAME".blue(),
                display_path(path),
                display_path(to)
            )),
        }
    }

    fn on_lifecycle(&mut self, event: &LifeCycleEvent) {
        debug!("Lifecycle: {:?}", event);
        match event {
            LifeCycleEvent::WorkflowEnd | LifeCycleEvent::PostTasksStart => self.flush(),
            LifeCycleEvent::SchematicStart {
                collection,
                schematic,
            } => self
                .console
                .debug(&format!("Running schematic {}:{}", collection, schematic)),
            LifeCycleEvent::SchematicEnd {
                collection,
                schematic,
            } => self
                .console
                .debug(&format!("Finished schematic {}:{}", collection, schematic)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(path: &str) -> DryRunEvent {
        DryRunEvent::Create {
            path: path.into(),
            content: b"12345".to_vec(),
        }
    }

    fn output(console: Console<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = console.into_inner();
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_changes_are_flushed_at_phase_end() {
        let mut console = Console::new(Vec::new(), Vec::new());
        let mut reporter = Reporter::new(&mut console);
        assert!(reporter.nothing_done());
        reporter.on_report(&create("/my-thing/package.json"));
        reporter.on_report(&DryRunEvent::Rename {
            path: "/a.ts".into(),
            to: "/b.ts".into(),
        });
        assert!(!reporter.nothing_done());
        reporter.on_lifecycle(&LifeCycleEvent::WorkflowEnd);

        let (out, err) = output(console);
        assert!(out.contains("CREATE"));
        assert!(out.contains(" my-thing/package.json (5 bytes)"));
        assert!(out.contains(" a.ts => b.ts"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_error_suppresses_flush_and_resets() {
        let mut console = Console::new(Vec::new(), Vec::new());
        let mut reporter = Reporter::new(&mut console);
        reporter.on_report(&create("/first.txt"));
        reporter.on_report(&DryRunEvent::Error {
            path: "/taken.txt".into(),
            description: DryRunErrorKind::AlreadyExist,
        });
        reporter.on_lifecycle(&LifeCycleEvent::WorkflowEnd);

        reporter.on_report(&create("/second.txt"));
        reporter.on_lifecycle(&LifeCycleEvent::PostTasksStart);

        let (out, err) = output(console);
        assert!(!out.contains("first.txt"));
        assert!(out.contains("second.txt"));
        assert!(err.contains("ERROR! taken.txt already exists."));
    }

    #[test]
    fn test_nothing_queued_until_phase_end() {
        let mut console = Console::new(Vec::new(), Vec::new());
        let mut reporter = Reporter::new(&mut console);
        reporter.on_report(&DryRunEvent::Delete {
            path: "/gone.txt".into(),
        });
        reporter.on_lifecycle(&LifeCycleEvent::SchematicEnd {
            collection: "c".into(),
            schematic: "s".into(),
        });
        let (out, _) = output(console);
        assert!(out.is_empty());
    }
}
