//! Handler for `--list-schematics`.
//!
use crate::common::ui::Console;
use crate::engine::workflow::Workflow;
use std::io::Write;

/// Prints the schematics of `collection` that can be run from the command
/// line, one per line.
pub fn handle_list<W: Workflow, O: Write, E: Write>(
    workflow: &W,
    collection: &str,
    console: &mut Console<O, E>,
) -> i32 {
    match workflow.list_schematic_names(collection) {
        Ok(names) => {
            for name in names {
                console.info(&name);
            }
            0
        }
        Err(e) => {
            console.fatal(&format!("{:#}", e));
            1
        }
    }
}
