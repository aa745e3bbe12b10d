//! # Runner Arguments
//!
//! File: cli/src/commands/schematic/args.rs
//!
//! ## Overview
//!
//! The command line has two halves:
//!
//! ```text
//! schematics [flags] [collection:]schematic [schematic options] [-- passthrough options]
//! ```
//!
//! Option order does not matter: `schematics --name=foo blank` and
//! `schematics blank --name=foo` are the same invocation. The tokens are
//! first sorted by [`split_primary`]. Bare runner flags and the first
//! positional (the schematic name) are parsed with `clap`. Every other option
//! belongs to the schematic and is parsed by [`parse_free_form`] into a JSON
//! option map (`--name=foo`, `--name foo`, `--flag`, `--no-flag`, `-abc`).
//! Runner flags written with a value (`--debug=false`, `--debug false`,
//! `--no-force`) take that route too and are lifted back onto the runner.
//! Tokens after the first `--` are parsed the same way and merged over the
//! schematic options.
//!
use crate::core::error::Result;
use crate::engine::collection::{is_local_collection, DEFAULT_COLLECTION};
use anyhow::anyhow;
use clap::Parser;
use serde_json::{Map, Number, Value};
use thiserror::Error;
use tracing::debug;

/// Runner flags. The only separate value token they accept is a bare
/// `true` or `false`.
pub const BOOLEAN_FLAGS: &[&str] = &[
    "allow-private",
    "debug",
    "dry-run",
    "force",
    "help",
    "list-schematics",
    "verbose",
];

#[derive(Parser, Debug, Default)]
#[command(
    name = "schematics",
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct SchematicsArgs {
    /// Debug mode; defaults to true for local collections.
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub debug: Option<bool>,

    /// Do not write anything to disk; defaults to the value of `--debug`.
    #[arg(long = "dry-run", num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub dry_run: Option<bool>,

    #[arg(long)]
    pub force: bool,

    #[arg(long)]
    pub help: bool,

    #[arg(long = "list-schematics")]
    pub list_schematics: bool,

    #[arg(long)]
    pub verbose: bool,

    #[arg(long = "allow-private")]
    pub allow_private: bool,

    /// `[collection:]schematic`
    pub schematic: Option<String>,
}

/// Fully parsed invocation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunOptions {
    pub debug: Option<bool>,
    pub dry_run: Option<bool>,
    pub force: bool,
    pub help: bool,
    pub list_schematics: bool,
    pub verbose: bool,
    pub allow_private: bool,
    pub schematic: Option<String>,
    pub options: Map<String, Value>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    #[error("No schematic specified.")]
    MissingSchematic,

    #[error("Empty schematic name in \"{0}\".")]
    EmptySchematic(String),

    #[error("Invalid value for --{flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },
}

impl UsageError {
    pub fn exit_code(&self) -> i32 {
        match self {
            UsageError::EmptySchematic(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchematicName {
    pub collection: String,
    pub schematic: String,
}

/// Tokens before `--`, sorted by who consumes them.
#[derive(Debug, Default, PartialEq)]
struct SplitArgs {
    /// Bare runner flags and the schematic name, handed to `clap`.
    runner: Vec<String>,
    /// Schematic options, each followed by its value token if it took one.
    schematic: Vec<String>,
}

fn is_bool_literal(token: &str) -> bool {
    token == "true" || token == "false"
}

/// Sorts `tokens` into runner and schematic tokens. An option that is not a
/// runner flag takes the next token as its value unless that token starts
/// with `-`, so `--name foo blank` names the schematic `blank`. Positionals
/// after the schematic name are dropped.
fn split_primary(tokens: &[String]) -> SplitArgs {
    let mut split = SplitArgs::default();
    let mut named = false;
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        let next_is_value = iter.peek().is_some_and(|n| !n.starts_with('-'));
        if let Some(long) = token.strip_prefix("--") {
            if BOOLEAN_FLAGS.contains(&long) {
                match iter.next_if(|n| is_bool_literal(n)) {
                    Some(value) => split.schematic.push(format!("--{}={}", long, value)),
                    None => split.runner.push(token.clone()),
                }
                continue;
            }
            split.schematic.push(token.clone());
            if !long.contains('=') && !long.starts_with("no-") && next_is_value {
                split.schematic.extend(iter.next().cloned());
            }
        } else if token.len() > 1 && token.starts_with('-') {
            split.schematic.push(token.clone());
            if next_is_value {
                split.schematic.extend(iter.next().cloned());
            }
        } else if !named {
            named = true;
            split.runner.push(token.clone());
        } else {
            debug!("Ignoring positional schematic argument '{}'", token);
        }
    }
    split
}

pub fn parse_args(args: &[String]) -> Result<RunOptions> {
    let (primary, passthrough) = match args.iter().position(|a| a == "--") {
        Some(i) => (&args[..i], &args[i + 1..]),
        None => (args, &args[args.len()..]),
    };

    let split = split_primary(primary);
    let parsed =
        SchematicsArgs::try_parse_from(&split.runner).map_err(|e| anyhow!(e.render().to_string()))?;
    let mut run = RunOptions {
        debug: parsed.debug,
        dry_run: parsed.dry_run,
        force: parsed.force,
        help: parsed.help,
        list_schematics: parsed.list_schematics,
        verbose: parsed.verbose,
        allow_private: parsed.allow_private,
        schematic: parsed.schematic,
        options: parse_free_form(&split.schematic, BOOLEAN_FLAGS),
    };
    lift_known_flags(&mut run)?;

    for (key, value) in parse_free_form(passthrough, &[]) {
        run.options.insert(key, value);
    }
    debug!("Parsed runner options: {:?}", run);
    Ok(run)
}

fn lift_known_flags(run: &mut RunOptions) -> Result<()> {
    for flag in BOOLEAN_FLAGS {
        let Some(value) = run.options.remove(*flag) else {
            continue;
        };
        let enabled = value.as_bool().ok_or_else(|| UsageError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })?;
        match *flag {
            "allow-private" => run.allow_private = enabled,
            "debug" => run.debug = Some(enabled),
            "dry-run" => run.dry_run = Some(enabled),
            "force" => run.force = enabled,
            "help" => run.help = enabled,
            "list-schematics" => run.list_schematics = enabled,
            _ => run.verbose = enabled,
        }
    }
    Ok(())
}

fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

fn set_option(options: &mut Map<String, Value>, key: &str, value: Value) {
    match options.get_mut(key) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            options.insert(key.to_string(), value);
        }
    }
}

fn takes_value(next: Option<&String>, key: &str, booleans: &[&str]) -> bool {
    !booleans.contains(&key) && next.is_some_and(|n| !n.starts_with('-'))
}

/// Parses `--key=value`, `--key value`, `--key`, `--no-key` and `-abc`
/// tokens into an option map. Keys listed in `booleans` never consume the
/// following token. Repeated keys collect into an array; bare tokens are
/// ignored.
pub fn parse_free_form(tokens: &[String], booleans: &[&str]) -> Map<String, Value> {
    let mut options = Map::new();
    let mut iter = tokens.iter().peekable();
    while let Some(token) = iter.next() {
        if let Some(long) = token.strip_prefix("--") {
            if let Some((key, value)) = long.split_once('=') {
                set_option(&mut options, key, coerce(value));
            } else if let Some(key) = long.strip_prefix("no-") {
                set_option(&mut options, key, Value::Bool(false));
            } else if takes_value(iter.peek().copied(), long, booleans) {
                let value = iter.next().map(|v| coerce(v)).unwrap_or(Value::Bool(true));
                set_option(&mut options, long, value);
            } else {
                set_option(&mut options, long, Value::Bool(true));
            }
        } else if let Some(shorts) = token.strip_prefix('-').filter(|s| !s.is_empty()) {
            let letters: Vec<String> = shorts.chars().map(String::from).collect();
            let (last, rest) = match letters.split_last() {
                Some(split) => split,
                None => continue,
            };
            for letter in rest {
                set_option(&mut options, letter, Value::Bool(true));
            }
            if takes_value(iter.peek().copied(), last, booleans) {
                let value = iter.next().map(|v| coerce(v)).unwrap_or(Value::Bool(true));
                set_option(&mut options, last, value);
            } else {
                set_option(&mut options, last, Value::Bool(true));
            }
        } else {
            debug!("Ignoring positional schematic argument '{}'", token);
        }
    }
    options
}

/// Splits `[collection:]schematic` on the first `:`.
pub fn parse_schematic_name(raw: Option<&str>) -> std::result::Result<SchematicName, UsageError> {
    let raw = raw.filter(|r| !r.is_empty()).ok_or(UsageError::MissingSchematic)?;
    let (collection, schematic) = match raw.split_once(':') {
        Some((collection, schematic)) => (collection, schematic),
        None => (DEFAULT_COLLECTION, raw),
    };
    if schematic.is_empty() {
        return Err(UsageError::EmptySchematic(raw.to_string()));
    }
    let collection = if collection.is_empty() {
        DEFAULT_COLLECTION
    } else {
        collection
    };
    Ok(SchematicName {
        collection: collection.to_string(),
        schematic: schematic.to_string(),
    })
}

/// Collection listed by `--list-schematics`; the schematic part may be empty or absent.
pub fn list_target(raw: Option<&str>) -> String {
    raw.and_then(|r| r.split_once(':'))
        .map(|(collection, _)| collection)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_COLLECTION)
        .to_string()
}

pub fn resolve_debug(explicit: Option<bool>, collection: &str) -> bool {
    explicit.unwrap_or_else(|| is_local_collection(collection))
}

pub fn resolve_dry_run(explicit: Option<bool>, debug: bool) -> bool {
    explicit.unwrap_or(debug)
}
