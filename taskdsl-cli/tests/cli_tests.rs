//! End-to-end tests for the `taskdsl` binary.
//! Every test points HOME at a fresh TempDir.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn taskdsl_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("taskdsl"));
    cmd.env("HOME", home).env("USERPROFILE", home).env_remove("RUST_LOG");
    cmd
}

fn write_manifest(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("tasks.yaml");
    fs::write(&path, contents).expect("write manifest");
    path
}

// ---------------------------------------------------------------------------
// 1. init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_manifest_under_home() {
    let home = TempDir::new().expect("home");
    taskdsl_cmd(home.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Wrote task manifest"));

    assert!(home.path().join(".taskdsl/tasks.yaml").exists());

    taskdsl_cmd(home.path())
        .arg("check")
        .assert()
        .success()
        .stdout(contains("1 flat task(s), 2 scope(s), 2 scoped task(s)"));
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let home = TempDir::new().expect("home");
    taskdsl_cmd(home.path()).arg("init").assert().success();
    taskdsl_cmd(home.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("--force"));
    taskdsl_cmd(home.path()).args(["init", "--force"]).assert().success();
}

// ---------------------------------------------------------------------------
// 2. list / check
// ---------------------------------------------------------------------------

#[test]
fn list_json_reports_both_namespaces() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(
        &home,
        "tasks:\n  - name: compile\n    scope: solidity\n  - name: test\n    subtask: true\n",
    );

    let output = taskdsl_cmd(home.path())
        .args(["list", "--json", "--manifest"])
        .arg(&manifest)
        .output()
        .expect("run list");
    assert!(output.status.success());

    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(payload["tasks"][0]["name"], "test");
    assert_eq!(payload["tasks"][0]["subtask"], true);
    assert_eq!(payload["tasks"][0]["action_set"], false);
    assert_eq!(payload["scopes"][0]["name"], "solidity");
    assert_eq!(payload["scopes"][0]["tasks"][0]["name"], "compile");
    assert_eq!(payload["scopes"][0]["tasks"][0]["scope"], "solidity");
}

#[test]
fn list_table_shows_scope_description() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(
        &home,
        "scopes:\n  - name: solidity\n    description: Solidity tasks\ntasks:\n  - name: compile\n    scope: solidity\n",
    );
    taskdsl_cmd(home.path())
        .arg("list")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(contains("Solidity tasks"))
        .stdout(contains("compile"));
}

#[test]
fn check_reports_clash() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(
        &home,
        "tasks:\n  - name: compile\n  - name: temp\n    scope: compile\n",
    );
    taskdsl_cmd(home.path())
        .arg("check")
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains(
            "A clash was found while creating task 'temp' with scope 'compile'",
        ));
}

#[test]
fn missing_manifest_is_reported() {
    let home = TempDir::new().expect("home");
    taskdsl_cmd(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(contains("task manifest not found"));
}

// ---------------------------------------------------------------------------
// 3. run
// ---------------------------------------------------------------------------

#[test]
fn run_prints_action_result() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(
        &home,
        "tasks:\n  - name: compile\n    scope: solidity\n    result: {compiled: 3}\n",
    );
    taskdsl_cmd(home.path())
        .args(["run", "compile", "--scope", "solidity", "--arg", "quiet=true", "--manifest"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(contains("\"compiled\": 3"));
}

#[test]
fn run_without_action_reports_action_not_set() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(&home, "tasks:\n  - name: compile\n    description: no action\n");
    taskdsl_cmd(home.path())
        .args(["run", "compile", "--manifest"])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("No action set for task compile."));
}

#[test]
fn run_unknown_task_fails() {
    let home = TempDir::new().expect("home");
    let manifest = write_manifest(&home, "tasks:\n  - name: compile\n");
    taskdsl_cmd(home.path())
        .args(["run", "compile", "--scope", "solidity", "--manifest"])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("'compile' in scope 'solidity' is not declared"));
}
