//! # Schematic Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! This module renders a schematic's template set into an in-memory
//! [`Tree`]. A template set is either embedded in the binary or, when the
//! user configured a templates directory, read from disk.
//!
//! ## Architecture
//!
//! For each file of the set:
//! 1. The relative path is expanded: `__var__` is replaced with the value of
//!    `var`, `__var@filter__` with `filter(var)`. `__dot__gitignore` therefore
//!    becomes `.gitignore` and `__name@dasherize__` becomes the dash-cased name.
//! 2. Files ending in `.template` are rendered with Tera and lose the suffix;
//!    every other file is copied verbatim.
//! 3. The result is created in the output tree.
//!
//! Templates see every variable passed in plus two filters, `dasherize` and
//! `camelize`:
//!
//! ```text
//! export function {{ name | camelize }}(_options: any): Rule { ... }
//! ```
//!
use crate::core::error::{Result, SchematicsError};
use crate::core::strings;
use crate::engine::tree::Tree;
use anyhow::{anyhow, bail, Context};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tera::Tera;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const TEMPLATE_EXTENSION: &str = ".template";

/// A template file compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFile {
    pub path: &'static str,
    pub contents: &'static str,
}

#[derive(Debug, Clone)]
pub enum TemplateSource {
    Embedded(&'static [EmbeddedFile]),
    Directory(PathBuf),
}

fn dasherize_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("dasherize", "value", String, value);
    Ok(Value::String(strings::dasherize(&s)))
}

fn camelize_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("camelize", "value", String, value);
    Ok(Value::String(strings::camelize(&s)))
}

fn build_engine() -> Tera {
    let mut tera = Tera::default();
    tera.autoescape_on(vec![]);
    tera.register_filter("dasherize", dasherize_filter);
    tera.register_filter("camelize", camelize_filter);
    tera
}

fn apply_path_filter(filter: &str, value: &str) -> Result<String> {
    match filter {
        "dasherize" => Ok(strings::dasherize(value)),
        "camelize" => Ok(strings::camelize(value)),
        other => bail!("Unknown path function \"{}\".", other),
    }
}

fn expand_path_token(token: &str, vars: &Map<String, Value>) -> Result<String> {
    let (key, filter) = match token.split_once('@') {
        Some((key, filter)) => (key, Some(filter)),
        None => (token, None),
    };
    let value = match vars.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => bail!("Path variable \"{}\" is not defined.", key),
        Some(other) => other.to_string(),
    };
    match filter {
        Some(filter) => apply_path_filter(filter, &value),
        None => Ok(value),
    }
}

fn is_path_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '@')
}

/// Expands `__var__` and `__var@filter__` tokens in a template path.
pub fn render_path(path: &str, vars: &Map<String, Value>) -> Result<String> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find("__") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("__") else {
            break;
        };
        let token = &after[..end];
        if !is_path_token(token) {
            out.push_str(&rest[..start + 2]);
            rest = after;
            continue;
        }
        out.push_str(&rest[..start]);
        out.push_str(&expand_path_token(token, vars)?);
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

fn render_file(
    tera: &mut Tera,
    context: &tera::Context,
    relative_path: &str,
    contents: Vec<u8>,
    vars: &Map<String, Value>,
    output: &mut Tree,
) -> Result<()> {
    let expanded = render_path(relative_path, vars)
        .with_context(|| format!("Failed to expand template path '{}'", relative_path))?;

    let is_template = expanded
        .to_lowercase()
        .ends_with(TEMPLATE_EXTENSION);
    if is_template {
        let target = &expanded[..expanded.len() - TEMPLATE_EXTENSION.len()];
        let source = String::from_utf8(contents)
            .with_context(|| format!("Template file '{}' is not valid UTF-8", relative_path))?;
        let rendered = tera.render_str(&source, context).map_err(|e| {
            anyhow!(SchematicsError::Template { source: e }).context(format!(
                "Tera rendering failed for template file '{}'",
                relative_path
            ))
        })?;
        debug!("Rendered template '{}' to '{}'", relative_path, target);
        output.create(target, rendered)
    } else {
        debug!("Copied file '{}' to '{}'", relative_path, expanded);
        output.create(&expanded, contents)
    }
}

/// Renders every file of `source` into a new in-memory tree.
pub fn render_source(source: &TemplateSource, vars: &Map<String, Value>) -> Result<Tree> {
    let mut tera = build_engine();
    let context = tera::Context::from_value(Value::Object(vars.clone())).map_err(|e| {
        anyhow!(SchematicsError::Template { source: e })
            .context("Failed to create Tera context from template variables")
    })?;
    let mut output = Tree::empty();

    match source {
        TemplateSource::Embedded(files) => {
            for file in files.iter() {
                render_file(
                    &mut tera,
                    &context,
                    file.path,
                    file.contents.as_bytes().to_vec(),
                    vars,
                    &mut output,
                )?;
            }
        }
        TemplateSource::Directory(dir) => {
            info!("Rendering templates from '{}'", dir.display());
            for entry_result in WalkDir::new(dir).sort_by_file_name() {
                let entry = match entry_result {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(
                            "Failed to access entry during walk in '{}': {}",
                            dir.display(),
                            e
                        );
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let src_path = entry.path();
                let Ok(relative) = src_path.strip_prefix(dir) else {
                    warn!(
                        "Could not determine relative path for '{}'",
                        src_path.display()
                    );
                    continue;
                };
                if relative
                    .components()
                    .any(|comp| comp.as_os_str().to_string_lossy().starts_with('.'))
                {
                    debug!("Skipping hidden path: {}", src_path.display());
                    continue;
                }
                let contents = fs::read(src_path).with_context(|| {
                    format!("Failed to read template file '{}'", src_path.display())
                })?;
                let relative = relative.to_string_lossy().replace('\\', "/");
                render_file(&mut tera, &context, &relative, contents, vars, &mut output)?;
            }
        }
    }
    Ok(output)
}
