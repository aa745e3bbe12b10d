//! # Schematic Runner Command
//!
//! File: cli/src/commands/schematic/mod.rs
//!
//! ## Overview
//!
//! The whole command line of the `schematics` binary: resolve a
//! `collection:schematic` pair, run it through a [`Workflow`], report what
//! changed and turn the outcome into an exit code.
//!
//! ## Architecture
//!
//! - `args`: Flag parsing, free-form schematic options, name resolution
//! - `report`: The workflow observer that prints `CREATE`/`UPDATE`/... lines
//! - `list`: `--list-schematics`
//! - `run`: Entry point called by `main`
//!
//! ## Exit Codes
//!
//! | Code | Meaning                                                  |
//! |------|----------------------------------------------------------|
//! | 0    | Success, `--help`, `--list-schematics`                   |
//! | 1    | Workflow failure, missing schematic name, invalid flags  |
//! | 2    | Empty schematic name after `collection:`                 |
//!
use crate::common::ui::Console;
use crate::core::config;
use crate::core::error::SchematicsError;
use crate::engine::workflow::{ExecutionRequest, HostWorkflow, Workflow};
use std::env;
use std::io::Write;
use tracing::debug;

mod args;
mod list;
mod report;

use report::Reporter;

pub const USAGE: &str = "\
schematics [CollectionName:]SchematicName [options, ...]

By default, if the collection name is not specified, use the internal collection provided
by the Schematics CLI.

Options:
    --debug             Debug mode. This is true by default if the collection is a relative
                        path (in that case, turn off with --debug=false).

    --allow-private     Allow private schematics to be run from the command line. Default to
                        false.

    --dry-run           Do not output anything, but instead just show what actions would be
                        performed. Default to true if debug is also true.

    --force             Force overwriting files that would otherwise be an error.

    --list-schematics   List all schematics from the collection, by name. A collection name
                        should be suffixed by a colon. Example: '@schematics/schematics:'.

    --verbose           Show more information.

    --help              Show this message.

Any additional option is passed to the Schematics depending on its schema.
";

/// Runs the command line `args` (without the program name) and returns the
/// process exit code.
pub async fn run<O: Write, E: Write>(args: &[String], stdout: O, stderr: E) -> i32 {
    let mut console = Console::new(stdout, stderr);

    let opts = match args::parse_args(args) {
        Ok(opts) => opts,
        Err(e) => {
            console.error(&format!("{:#}", e));
            console.info(USAGE);
            return 1;
        }
    };
    console.set_verbose(opts.verbose);

    if opts.help {
        console.info(USAGE);
        return 0;
    }

    let cwd = match env::current_dir() {
        Ok(cwd) => cwd,
        Err(e) => {
            console.fatal(&format!("Cannot read the current directory: {}", e));
            return 1;
        }
    };
    let config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            console.fatal(&format!("{:#}", e));
            return 1;
        }
    };

    if opts.list_schematics {
        let collection = args::list_target(opts.schematic.as_deref());
        return list::handle_list(&HostWorkflow::new(cwd, config), &collection, &mut console);
    }

    let name = match args::parse_schematic_name(opts.schematic.as_deref()) {
        Ok(name) => name,
        Err(e) => {
            console.error(&e.to_string());
            console.info(USAGE);
            return e.exit_code();
        }
    };

    // `debug` would collide with the name `tracing::debug!` imports internally.
    let debug_mode = args::resolve_debug(opts.debug, &name.collection);
    let dry_run = args::resolve_dry_run(opts.dry_run, debug_mode);
    if debug_mode && opts.debug.is_none() {
        console.info("Debug mode enabled by default for local collections.");
    }
    debug!(
        "Running {}:{} (debug: {}, dry run: {}, force: {})",
        name.collection, name.schematic, debug_mode, dry_run, opts.force
    );

    let workflow = HostWorkflow::new(cwd, config)
        .with_dry_run(dry_run)
        .with_force(opts.force);
    let request = ExecutionRequest {
        collection: name.collection,
        schematic: name.schematic,
        options: opts.options,
        allow_private: opts.allow_private,
        debug: debug_mode,
    };
    execute(&workflow, request, dry_run, &mut console).await
}

/// Executes `request` on `workflow`, reporting through `console`.
pub async fn execute<W: Workflow, O: Write, E: Write>(
    workflow: &W,
    request: ExecutionRequest,
    dry_run: bool,
    console: &mut Console<O, E>,
) -> i32 {
    let debug_mode = request.debug;
    let mut reporter = Reporter::new(console);
    let result = workflow.execute(request, &mut reporter).await;
    let nothing_done = reporter.nothing_done();

    match result {
        Ok(()) => {
            if nothing_done {
                console.info("Nothing to be done.");
            } else if dry_run {
                console.warn("\nNOTE: The \"dryRun\" flag means no changes were made.");
            }
            0
        }
        Err(e) => {
            if matches!(
                e.downcast_ref::<SchematicsError>(),
                Some(SchematicsError::UnsuccessfulWorkflowExecution)
            ) {
                console.fatal("The Schematic workflow failed. See above.");
            } else if debug_mode {
                console.fatal(&format!("An error occurred:\n{:?}", e));
            } else {
                console.fatal(&format!("{:#}", e));
            }
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Result;
    use crate::engine::workflow::{DryRunErrorKind, DryRunEvent, WorkflowObserver};
    use anyhow::anyhow;
    use serde_json::Map;

    /// Replays canned events and returns a canned outcome.
    struct FakeWorkflow {
        events: Vec<DryRunEvent>,
        failure: Option<fn() -> anyhow::Error>,
    }

    impl Workflow for FakeWorkflow {
        async fn execute(
            &self,
            _request: ExecutionRequest,
            observer: &mut dyn WorkflowObserver,
        ) -> Result<()> {
            for event in &self.events {
                observer.on_report(event);
            }
            observer.on_lifecycle(&crate::engine::workflow::LifeCycleEvent::WorkflowEnd);
            match self.failure {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }

        fn list_schematic_names(&self, _collection: &str) -> Result<Vec<String>> {
            Ok(vec!["blank".into(), "other".into()])
        }
    }

    fn request(debug: bool) -> ExecutionRequest {
        ExecutionRequest {
            collection: "@schematics/schematics".into(),
            schematic: "blank".into(),
            options: Map::new(),
            allow_private: false,
            debug,
        }
    }

    async fn execute_fake(
        workflow: FakeWorkflow,
        dry_run: bool,
        debug: bool,
    ) -> (i32, String, String) {
        let mut console = Console::new(Vec::new(), Vec::new());
        let code = execute(&workflow, request(debug), dry_run, &mut console).await;
        let (out, err) = console.into_inner();
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn create_event() -> DryRunEvent {
        DryRunEvent::Create {
            path: "/a.txt".into(),
            content: b"a".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_nothing_to_be_done() {
        let fake = FakeWorkflow {
            events: vec![],
            failure: None,
        };
        let (code, out, _) = execute_fake(fake, false, false).await;
        assert_eq!(code, 0);
        assert!(out.contains("Nothing to be done."));
    }

    #[tokio::test]
    async fn test_dry_run_note() {
        let fake = FakeWorkflow {
            events: vec![create_event()],
            failure: None,
        };
        let (code, out, err) = execute_fake(fake, true, false).await;
        assert_eq!(code, 0);
        assert!(out.contains("a.txt (1 bytes)"));
        assert!(err.contains("\"dryRun\" flag means no changes were made"));
    }

    #[tokio::test]
    async fn test_unsuccessful_workflow_message() {
        let fake = FakeWorkflow {
            events: vec![DryRunEvent::Error {
                path: "/a.txt".into(),
                description: DryRunErrorKind::AlreadyExist,
            }],
            failure: Some(|| anyhow!(SchematicsError::UnsuccessfulWorkflowExecution)),
        };
        let (code, out, err) = execute_fake(fake, false, false).await;
        assert_eq!(code, 1);
        assert!(err.contains("ERROR! a.txt already exists."));
        assert!(err.contains("The Schematic workflow failed. See above."));
        assert!(!out.contains("Nothing to be done."));
    }

    #[tokio::test]
    async fn test_error_message_depends_on_debug() {
        let failing = || FakeWorkflow {
            events: vec![],
            failure: Some(|| {
                anyhow!(SchematicsError::OptionIsNotDefined("name".into())).context("blank failed")
            }),
        };
        let (code, _, err) = execute_fake(failing(), false, false).await;
        assert_eq!(code, 1);
        assert!(err.contains("blank failed: Option (name) is not defined."));
        assert!(!err.contains("An error occurred"));

        let (_, _, err) = execute_fake(failing(), false, true).await;
        assert!(err.contains("An error occurred:"));
        assert!(err.contains("Option (name) is not defined."));
    }

    #[test]
    fn test_list_prints_names() {
        let fake = FakeWorkflow {
            events: vec![],
            failure: None,
        };
        let mut console = Console::new(Vec::new(), Vec::new());
        assert_eq!(list::handle_list(&fake, "@schematics/schematics", &mut console), 0);
        let (out, _) = console.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), "blank\nother\n");
    }

    #[tokio::test]
    async fn test_run_defaults_debug_for_local_collections() {
        let local = vec!["./no-such-collection:thing".to_string()];
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(&local, &mut out, &mut err).await, 1);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Debug mode enabled by default for local collections."));
        assert!(String::from_utf8(err).unwrap().contains("An error occurred:"));
    }

    #[tokio::test]
    async fn test_run_help_and_usage_errors() {
        let help = vec!["--help".to_string()];
        let mut out = Vec::new();
        assert_eq!(run(&help, &mut out, Vec::new()).await, 0);
        assert!(String::from_utf8(out).unwrap().contains("--list-schematics"));

        let empty = vec!["foo:".to_string()];
        assert_eq!(run(&empty, Vec::new(), Vec::new()).await, 2);
        assert_eq!(run(&[], Vec::new(), Vec::new()).await, 1);
        assert_eq!(
            run(&["--dry-run=maybe".to_string()], Vec::new(), Vec::new()).await,
            1
        );
    }
}
