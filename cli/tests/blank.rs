//! # `blank` Schematic Integration Tests
//!
//! File: cli/tests/blank.rs
//!
//! Runs the built-in `blank` schematic end to end in temporary directories.
//!
mod common;
use common::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_blank_creates_new_project() {
    let dir = tempdir().unwrap();
    schematics_in(dir.path())
        .args(["blank", "--name=myThing"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("my-thing/package.json")
                .and(predicate::str::contains("my-thing/src/my-thing/index.ts")),
        );

    let project = dir.path().join("my-thing");
    assert!(project.join(".gitignore").is_file());
    assert!(project.join("tsconfig.json").is_file());
    assert_eq!(read_json(&project.join("package.json"))["name"], "my-thing");

    let manifest = read_json(&project.join("src/collection.json"));
    assert_eq!(
        manifest["schematics"]["my-thing"]["factory"],
        "./my-thing/index#myThing"
    );
    assert_eq!(
        manifest["schematics"]["my-thing"]["description"],
        "A blank schematic."
    );
    let index = fs::read_to_string(project.join("src/my-thing/index.ts")).unwrap();
    assert!(index.contains("export function myThing(_options: any): Rule"));
}

#[test]
fn test_blank_augments_existing_project() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{"name": "tools", "schematics": "./src/collection.json"}"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("src/collection.json"),
        r#"{"schematics": {"existing": {"description": "x", "factory": "./existing/index#existing"}}}"#,
    )
    .unwrap();

    schematics_in(dir.path())
        .args(["blank", "--name", "second-one"])
        .assert()
        .success()
        .stdout(predicate::str::contains("UPDATE").and(predicate::str::contains("src/collection.json")));

    assert!(dir.path().join("src/second-one/index_spec.ts").is_file());
    assert!(!dir.path().join("second-one").exists());
    let manifest = read_json(&dir.path().join("src/collection.json"));
    let keys: Vec<&String> = manifest["schematics"].as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["existing", "second-one"]);
    assert_eq!(
        manifest["schematics"]["second-one"]["factory"],
        "./second-one/index#secondOne"
    );
}

#[test]
fn test_blank_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    schematics_in(dir.path())
        .args(["blank", "--name=dry", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dry/package.json"))
        .stderr(predicate::str::contains("no changes were made"));
    assert!(!dir.path().join("dry").exists());
}

#[test]
fn test_blank_options_before_schematic_name() {
    let dir = tempdir().unwrap();
    schematics_in(dir.path())
        .args(["--name=early", "blank"])
        .assert()
        .success()
        .stdout(predicate::str::contains("early/package.json"));
    assert!(dir.path().join("early/src/early/index.ts").is_file());
}

#[test]
fn test_blank_dry_run_with_separate_bool_value() {
    let dir = tempdir().unwrap();
    schematics_in(dir.path())
        .args(["--dry-run", "true", "blank", "--name", "later"])
        .assert()
        .success()
        .stdout(predicate::str::contains("later/package.json"))
        .stderr(predicate::str::contains("no changes were made"));
    assert!(!dir.path().join("later").exists());
}

#[test]
fn test_blank_existing_directory_conflicts() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("taken")).unwrap();
    fs::write(dir.path().join("taken/README.md"), "mine").unwrap();

    schematics_in(dir.path())
        .args(["blank", "--name=taken"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("taken/README.md"));
    assert_eq!(
        fs::read_to_string(dir.path().join("taken/README.md")).unwrap(),
        "mine"
    );
    assert!(!dir.path().join("taken/package.json").exists());

    schematics_in(dir.path())
        .args(["blank", "--name=taken", "--force"])
        .assert()
        .success();
    assert!(dir.path().join("taken/package.json").is_file());
}

#[test]
fn test_blank_without_name_fails() {
    let dir = tempdir().unwrap();
    schematics_in(dir.path())
        .arg("blank")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Option (name) is not defined."));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}
