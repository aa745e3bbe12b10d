//! # Workflow Execution
//!
//! File: cli/src/engine/workflow.rs
//!
//! ## Overview
//!
//! A [`Workflow`] runs one schematic of one collection against a root
//! directory and reports what happens through a [`WorkflowObserver`]:
//!
//! - **Reporter events** ([`DryRunEvent`]): one per staged change, plus
//!   `Error` events for changes that cannot be applied to the disk.
//! - **Lifecycle events** ([`LifeCycleEvent`]): the phase boundaries of the
//!   run, which the command layer uses to flush its report.
//!
//! ## Execution Order
//!
//! 1. `Start`, `WorkflowStart`, `SchematicStart`
//! 2. The factory builds the rule, the rule runs against a [`Tree`] staged
//!    over the root
//! 3. `SchematicEnd`
//! 4. Every staged action is validated against the disk and reported; any
//!    `Error` event aborts with `UnsuccessfulWorkflowExecution`
//! 5. The actions are committed (skipped on dry run), then `WorkflowEnd`
//! 6. `PostTasksStart`, scheduled tasks (skipped on dry run or when install
//!    is disabled), `PostTasksEnd`
//! 7. `End`, emitted whether or not the run succeeded
//!
use crate::common::fs::io;
use crate::core::config::Config;
use crate::core::error::{Result, SchematicsError};
use crate::engine::collection::{self, Collection};
use crate::engine::rules::SchematicContext;
use crate::engine::tasks;
use crate::engine::tree::{Action, Tree};
use anyhow::anyhow;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DryRunErrorKind {
    AlreadyExist,
    DoesNotExist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DryRunEvent {
    Error {
        path: String,
        description: DryRunErrorKind,
    },
    Create {
        path: String,
        content: Vec<u8>,
    },
    Update {
        path: String,
        content: Vec<u8>,
    },
    Delete {
        path: String,
    },
    Rename {
        path: String,
        to: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifeCycleEvent {
    Start,
    WorkflowStart,
    SchematicStart { collection: String, schematic: String },
    SchematicEnd { collection: String, schematic: String },
    WorkflowEnd,
    PostTasksStart,
    PostTasksEnd,
    End,
}

/// Receives the events of a run, in order, on the calling task.
pub trait WorkflowObserver {
    fn on_report(&mut self, event: &DryRunEvent);
    fn on_lifecycle(&mut self, event: &LifeCycleEvent);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub collection: String,
    pub schematic: String,
    pub options: Map<String, Value>,
    pub allow_private: bool,
    pub debug: bool,
}

#[allow(async_fn_in_trait)]
pub trait Workflow {
    async fn execute(
        &self,
        request: ExecutionRequest,
        observer: &mut dyn WorkflowObserver,
    ) -> Result<()>;

    fn list_schematic_names(&self, collection: &str) -> Result<Vec<String>>;
}

/// Runs schematics against a directory on the local disk.
#[derive(Debug, Clone)]
pub struct HostWorkflow {
    root: PathBuf,
    dry_run: bool,
    force: bool,
    config: Config,
}

impl HostWorkflow {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
            force: false,
            config,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    async fn run(
        &self,
        request: ExecutionRequest,
        observer: &mut dyn WorkflowObserver,
    ) -> Result<()> {
        let collection = Collection::load(&request.collection, &self.root)?;
        let (schematic, factory) =
            collection.create_factory(&request.schematic, request.allow_private)?;
        debug!(
            "Executing {}:{} in {} (debug: {}, dry run: {}, force: {})",
            collection.name,
            schematic,
            self.root.display(),
            request.debug,
            self.dry_run,
            self.force
        );

        observer.on_lifecycle(&LifeCycleEvent::WorkflowStart);
        observer.on_lifecycle(&LifeCycleEvent::SchematicStart {
            collection: collection.name.clone(),
            schematic: schematic.clone(),
        });

        let rule = collection::build_rule(factory, request.options)?;
        let mut tree = Tree::from_dir(&self.root);
        let mut context = SchematicContext::new(&collection.name, &schematic)
            .with_force(self.force)
            .with_versions(self.config.versions.clone())
            .with_template_root(self.config.templates.directory.as_ref().map(PathBuf::from));
        rule(&mut tree, &mut context)?;
        debug!(
            "Rule staged {} file(s), scheduled {} task(s)",
            tree.staged_files().len(),
            context.tasks().len()
        );

        observer.on_lifecycle(&LifeCycleEvent::SchematicEnd {
            collection: collection.name.clone(),
            schematic,
        });

        let events = dry_run_events(tree.actions(), &self.root, self.force);
        let mut failed = false;
        for event in &events {
            failed |= matches!(event, DryRunEvent::Error { .. });
            observer.on_report(event);
        }
        if failed {
            return Err(anyhow!(SchematicsError::UnsuccessfulWorkflowExecution));
        }

        if !self.dry_run {
            commit(&events, &self.root)?;
        }
        observer.on_lifecycle(&LifeCycleEvent::WorkflowEnd);

        observer.on_lifecycle(&LifeCycleEvent::PostTasksStart);
        let scheduled = context.take_tasks();
        if self.dry_run || self.config.install.skip {
            debug!("Skipping {} scheduled task(s)", scheduled.len());
        } else {
            for task in &scheduled {
                info!("Running task '{}'", task.name());
                tasks::execute(task, &self.root, &self.config.install).await?;
            }
        }
        observer.on_lifecycle(&LifeCycleEvent::PostTasksEnd);
        Ok(())
    }
}

impl Workflow for HostWorkflow {
    async fn execute(
        &self,
        request: ExecutionRequest,
        observer: &mut dyn WorkflowObserver,
    ) -> Result<()> {
        observer.on_lifecycle(&LifeCycleEvent::Start);
        let result = self.run(request, observer).await;
        observer.on_lifecycle(&LifeCycleEvent::End);
        result
    }

    fn list_schematic_names(&self, collection: &str) -> Result<Vec<String>> {
        Ok(Collection::load(collection, &self.root)?.list_schematic_names())
    }
}

/// Validates staged actions against the files under `root` and turns them
/// into reporter events. Presence is tracked as the actions are replayed so
/// that later actions see the effect of earlier ones.
pub fn dry_run_events(actions: &[Action], root: &Path, force: bool) -> Vec<DryRunEvent> {
    fn present(overlay: &HashMap<&str, bool>, root: &Path, path: &str) -> bool {
        overlay
            .get(path)
            .copied()
            .unwrap_or_else(|| root.join(path.trim_start_matches('/')).is_file())
    }
    fn error(path: &str, description: DryRunErrorKind) -> DryRunEvent {
        DryRunEvent::Error {
            path: path.to_string(),
            description,
        }
    }

    let mut overlay: HashMap<&str, bool> = HashMap::new();
    let mut events = Vec::with_capacity(actions.len());
    for action in actions {
        let event = match action {
            Action::Create { path, content } => {
                let exists = present(&overlay, root, path);
                if exists && !force {
                    error(path, DryRunErrorKind::AlreadyExist)
                } else {
                    overlay.insert(path.as_str(), true);
                    let (path, content) = (path.clone(), content.clone());
                    if exists {
                        DryRunEvent::Update { path, content }
                    } else {
                        DryRunEvent::Create { path, content }
                    }
                }
            }
            Action::Overwrite { path, content } => {
                if present(&overlay, root, path) {
                    DryRunEvent::Update {
                        path: path.clone(),
                        content: content.clone(),
                    }
                } else {
                    error(path, DryRunErrorKind::DoesNotExist)
                }
            }
            Action::Delete { path } => {
                if present(&overlay, root, path) {
                    overlay.insert(path.as_str(), false);
                    DryRunEvent::Delete { path: path.clone() }
                } else {
                    error(path, DryRunErrorKind::DoesNotExist)
                }
            }
            Action::Rename { from, to } => {
                if !present(&overlay, root, from) {
                    error(from, DryRunErrorKind::DoesNotExist)
                } else if present(&overlay, root, to) && !force {
                    error(to, DryRunErrorKind::AlreadyExist)
                } else {
                    overlay.insert(from.as_str(), false);
                    overlay.insert(to.as_str(), true);
                    DryRunEvent::Rename {
                        path: from.clone(),
                        to: to.clone(),
                    }
                }
            }
        };
        events.push(event);
    }
    events
}

fn commit(events: &[DryRunEvent], root: &Path) -> Result<()> {
    let on_disk = |path: &str| root.join(path.trim_start_matches('/'));
    for event in events {
        match event {
            DryRunEvent::Create { path, content } | DryRunEvent::Update { path, content } => {
                io::write_bytes_to_file(&on_disk(path), content)?
            }
            DryRunEvent::Delete { path } => io::remove_file(&on_disk(path))?,
            DryRunEvent::Rename { path, to } => io::rename_file(&on_disk(path), &on_disk(to))?,
            DryRunEvent::Error { .. } => {}
        }
    }
    debug!("Committed {} change(s) under {}", events.len(), root.display());
    Ok(())
}
