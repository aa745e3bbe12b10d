//! # The `blank` Schematic
//!
//! File: cli/src/schematics/blank/mod.rs
//!
//! ## Overview
//!
//! Creates the skeleton of a new schematic. Which skeleton depends on where
//! it is run:
//!
//! - **Inside a schematics package** (the root `package.json` has a
//!   `schematics` field pointing at an existing manifest): the schematic
//!   sources are added under `src/<name>/` and the manifest gains an entry.
//! - **Anywhere else**: a complete package is scaffolded under
//!   `<name>/`, containing the new schematic, and a package install is
//!   scheduled for it.
//!
//! In both cases the manifest entry is:
//!
//! ```json
//! "my-thing": {
//!   "description": "A blank schematic.",
//!   "factory": "./my-thing/index#myThing"
//! }
//! ```
//!
//! ## Template Variables
//!
//! Every option passed to the schematic, plus `core_version`,
//! `schematics_version` and `dot`.
//!
use crate::core::error::{Result, SchematicsError};
use crate::core::strings;
use crate::core::templating;
use crate::engine::rules::{chain, merge_with, MergeStrategy, Rule, SchematicContext, Source};
use crate::engine::tasks::Task;
use crate::engine::tree::{normalize_path, Tree};
use anyhow::bail;
use serde_json::{json, Map, Value};
use tracing::debug;

mod files;

use files::{PROJECT_FILES, PROJECT_FILES_SET, SCHEMATIC_FILES, SCHEMATIC_FILES_SET};

pub const SCHEMATIC_DESCRIPTION: &str = "A blank schematic.";

/// Builds the rule of the `blank` schematic. Requires a non-empty string
/// option `name`.
pub fn factory(options: Map<String, Value>) -> Result<Rule> {
    let name = match options.get("name") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => bail!(SchematicsError::OptionIsNotDefined("name".to_string())),
    };

    Ok(Box::new(
        move |tree: &mut Tree, context: &mut SchematicContext| {
            let dashed = strings::dasherize(&name);
            let vars = template_vars(options, context);

            let (source, collection_path) = match find_collection_path(tree) {
                Some(path) => {
                    debug!("Adding schematic '{}' to collection {}", dashed, path);
                    (schematic_source(vars), path)
                }
                None => {
                    debug!("No collection found; creating project '{}'", dashed);
                    context.add_task(Task::node_package_install(dashed.as_str()));
                    let path = format!("/{}/src/collection.json", dashed);
                    (project_source(vars, dashed.clone()), path)
                }
            };

            let entry = json!({
                "description": SCHEMATIC_DESCRIPTION,
                "factory": format!("./{}/index#{}", dashed, strings::camelize(&name)),
            });
            chain(vec![
                merge_with(source),
                add_schematic_to_collection_json(collection_path, dashed, entry),
            ])(tree, context)
        },
    ))
}

fn template_vars(options: Map<String, Value>, context: &SchematicContext) -> Map<String, Value> {
    let mut vars = options;
    let versions = context.versions();
    vars.insert("core_version".into(), Value::String(versions.core.clone()));
    vars.insert(
        "schematics_version".into(),
        Value::String(versions.schematics.clone()),
    );
    vars.insert("dot".into(), Value::String(".".into()));
    vars
}

fn schematic_source(vars: Map<String, Value>) -> Source {
    Box::new(move |context| {
        let files = context.template_source(SCHEMATIC_FILES_SET, SCHEMATIC_FILES);
        templating::render_source(&files, &vars)
    })
}

fn project_source(vars: Map<String, Value>, dir: String) -> Source {
    Box::new(move |context| {
        let project_files = context.template_source(PROJECT_FILES_SET, PROJECT_FILES);
        let schematic_files = context.template_source(SCHEMATIC_FILES_SET, SCHEMATIC_FILES);
        let mut project = templating::render_source(&project_files, &vars)?;
        project.merge(
            templating::render_source(&schematic_files, &vars)?,
            MergeStrategy::Default,
        )?;
        project.move_to(&dir)?;
        Ok(project)
    })
}

/// Returns the manifest path named by `/package.json`, if it exists in the tree.
fn find_collection_path(tree: &Tree) -> Option<String> {
    match probe_collection_path(tree) {
        Ok(path) => path,
        Err(e) => {
            debug!("Ignoring /package.json: {:#}", e);
            None
        }
    }
}

fn probe_collection_path(tree: &Tree) -> Result<Option<String>> {
    let Some(content) = tree.read_to_string("/package.json")? else {
        return Ok(None);
    };
    let package: Value = serde_json::from_str(&content)?;
    let Some(field) = package.get("schematics").and_then(Value::as_str) else {
        return Ok(None);
    };
    let path = normalize_path(field)?;
    Ok(tree.exists(&path).then_some(path))
}

fn invalid(message: impl Into<String>) -> SchematicsError {
    SchematicsError::InvalidCollection(message.into())
}

/// Inserts `name => description` into the `schematics` object of the
/// manifest at `path`, replacing an existing entry of the same name.
fn add_schematic_to_collection_json(path: String, name: String, description: Value) -> Rule {
    Box::new(move |tree: &mut Tree, _: &mut SchematicContext| {
        let content = tree
            .read_to_string(&path)?
            .ok_or_else(|| invalid(format!("Invalid collection path: {}", path)))?;
        let mut manifest: Value =
            serde_json::from_str(&content).map_err(|_| invalid("Invalid collection content."))?;
        let schematics = manifest
            .as_object_mut()
            .ok_or_else(|| invalid("Invalid collection content."))?
            .get_mut("schematics")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| invalid("Invalid collection.json; schematics needs to be an object."))?;
        schematics.insert(name, description);

        let mut rendered = serde_json::to_string_pretty(&manifest)?;
        rendered.push('\n');
        tree.overwrite(&path, rendered)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn context() -> SchematicContext {
        SchematicContext::new("@schematics/schematics", "blank")
    }

    fn run(tree: &mut Tree, context: &mut SchematicContext, name: &str) -> Result<()> {
        factory(options(json!({ "name": name })))?(tree, context)
    }

    #[test]
    fn test_missing_name_fails_before_any_rule_runs() {
        for opts in [json!({}), json!({ "name": "" }), json!({ "name": 5 })] {
            let err = factory(options(opts)).err().unwrap();
            assert!(matches!(
                err.downcast_ref::<SchematicsError>(),
                Some(SchematicsError::OptionIsNotDefined(option)) if option == "name"
            ));
        }
    }

    #[test]
    fn test_new_project_when_no_collection_found() -> Result<()> {
        let root = tempdir()?;
        let mut tree = Tree::from_dir(root.path());
        let mut ctx = context();
        run(&mut tree, &mut ctx, "myThing")?;

        assert_eq!(ctx.tasks(), &[Task::node_package_install("my-thing")]);
        for file in [
            "my-thing/.gitignore",
            "my-thing/.npmignore",
            "my-thing/README.md",
            "my-thing/tsconfig.json",
            "my-thing/src/my-thing/index.ts",
            "my-thing/src/my-thing/index_spec.ts",
        ] {
            assert!(tree.exists(file), "missing {}", file);
        }
        assert!(!tree.exists("package.json"));

        let package: Value =
            serde_json::from_str(&tree.read_to_string("my-thing/package.json")?.unwrap())?;
        assert_eq!(package["name"], "my-thing");
        assert_eq!(package["schematics"], "./src/collection.json");
        assert_eq!(
            package["dependencies"]["@angular-devkit/schematics"],
            "^17.3.0"
        );

        let index = tree.read_to_string("my-thing/src/my-thing/index.ts")?.unwrap();
        assert!(index.contains("export function myThing(_options: any): Rule"));

        let manifest: Value =
            serde_json::from_str(&tree.read_to_string("my-thing/src/collection.json")?.unwrap())?;
        assert_eq!(
            manifest["schematics"]["my-thing"]["factory"],
            "./my-thing/index#myThing"
        );
        assert!(manifest["$schema"].is_string());
        Ok(())
    }

    #[test]
    fn test_augments_existing_collection() -> Result<()> {
        let root = tempdir()?;
        fs::create_dir_all(root.path().join("src"))?;
        fs::write(
            root.path().join("package.json"),
            r#"{ "name": "tools", "schematics": "src/collection.json" }"#,
        )?;
        fs::write(root.path().join("src/collection.json"), r#"{"schematics": {}}"#)?;

        let mut tree = Tree::from_dir(root.path());
        let mut ctx = context();
        run(&mut tree, &mut ctx, "myThing")?;

        assert!(ctx.tasks().is_empty());
        assert_eq!(
            tree.staged_files(),
            vec![
                "/src/collection.json",
                "/src/my-thing/index.ts",
                "/src/my-thing/index_spec.ts"
            ]
        );
        assert_eq!(
            tree.read_to_string("src/collection.json")?.unwrap(),
            concat!(
                "{\n",
                "  \"schematics\": {\n",
                "    \"my-thing\": {\n",
                "      \"description\": \"A blank schematic.\",\n",
                "      \"factory\": \"./my-thing/index#myThing\"\n",
                "    }\n",
                "  }\n",
                "}\n"
            )
        );
        Ok(())
    }

    #[test]
    fn test_unresolvable_schematics_field_creates_project() -> Result<()> {
        for package in [
            r#"{ "name": "app" }"#,
            r#"{ "schematics": "./missing/collection.json" }"#,
            r#"{ "schematics": 42 }"#,
            "not json",
        ] {
            let root = tempdir()?;
            fs::write(root.path().join("package.json"), package)?;
            let mut tree = Tree::from_dir(root.path());
            let mut ctx = context();
            run(&mut tree, &mut ctx, "thing")?;
            assert_eq!(ctx.tasks(), &[Task::node_package_install("thing")]);
            assert!(tree.exists("thing/package.json"));
        }
        Ok(())
    }

    #[test]
    fn test_manifest_mutation_errors() {
        let cases = [
            (None, "Invalid collection path: /collection.json"),
            (Some("[]"), "Invalid collection content."),
            (Some("{ broken"), "Invalid collection content."),
            (
                Some(r#"{"schematics": []}"#),
                "Invalid collection.json; schematics needs to be an object.",
            ),
        ];
        for (content, expected) in cases {
            let mut tree = Tree::empty();
            if let Some(content) = content {
                tree.create("/collection.json", content).unwrap();
            }
            let rule = add_schematic_to_collection_json(
                "/collection.json".into(),
                "x".into(),
                json!({}),
            );
            let err = rule(&mut tree, &mut context()).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_existing_entry_is_replaced_in_place() -> Result<()> {
        let mut tree = Tree::empty();
        tree.create(
            "/c.json",
            r#"{"schematics": {"a": {}, "my-thing": {"old": true}, "b": {}}}"#,
        )?;
        add_schematic_to_collection_json("/c.json".into(), "my-thing".into(), json!({"new": 1}))(
            &mut tree,
            &mut context(),
        )?;
        let manifest: Value = serde_json::from_str(&tree.read_to_string("/c.json")?.unwrap())?;
        let keys: Vec<&String> = manifest["schematics"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "my-thing", "b"]);
        assert_eq!(manifest["schematics"]["my-thing"], json!({"new": 1}));
        Ok(())
    }
}
