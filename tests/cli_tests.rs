//! CLI smoke tests for the paramgrid binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    write!(file, "{contents}").unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn run_prints_one_json_object_per_combination() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(
        &dir,
        "params.yaml",
        "a:\n  - 1\n  - 2\nb: \"$a * 10$\"\n",
    );

    Command::cargo_bin("paramgrid")
        .unwrap()
        .args(["run", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"a":1,"b":10}"#))
        .stdout(predicate::str::contains(r#"{"a":2,"b":20}"#));
}

#[test]
fn run_honors_limit() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "params.json", r#"{"a": [1, 2, 3, 4]}"#);

    Command::cargo_bin("paramgrid")
        .unwrap()
        .args(["run", &file, "--limit", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"a":1}"#))
        .stdout(predicate::str::contains(r#"{"a":2}"#))
        .stdout(predicate::str::contains(r#"{"a":3}"#).not());
}

#[test]
fn validate_accepts_a_good_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "params.json", r#"{"a": [1, 2], "b": "$a$"}"#);

    Command::cargo_bin("paramgrid")
        .unwrap()
        .args(["validate", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn validate_reports_undefined_variables() {
    let dir = tempfile::tempdir().unwrap();
    let file = write_file(&dir, "params.json", r#"{"a": "$ghost$"}"#);

    Command::cargo_bin("paramgrid")
        .unwrap()
        .args(["validate", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ghost' is not defined"));
}

#[test]
fn missing_file_fails_with_a_suggestion() {
    Command::cargo_bin("paramgrid")
        .unwrap()
        .args(["run", "/no/such/params.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fix:"));
}
