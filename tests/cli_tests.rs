//! Integration tests for the vcsbind CLI
//!
//! These tests run the actual CLI binary against workspace files in a
//! temporary directory and inspect stdout, stderr and the state file.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get the binary to test
fn vcsbind_cmd() -> Command {
    Command::cargo_bin("vcsbind").unwrap()
}

const WORKSPACE: &str = r#"
spaces:
  - id: team-a
    parent: root

integrations:
  - { id: ghe-root, kind: github_enterprise, space: root, default: true }
  - { id: ghe-team, kind: github_enterprise, space: team-a, default: true }
  - { id: gl-root, kind: gitlab, space: root, default: true }

lookups:
  gitlab:
    kind: gitlab

stacks:
  - id: api
    space: team-a
    github_enterprise:
      namespace: spacelift-ci-org
      id: ""
  - id: web
    gitlab:
      namespace: spacelift-ci
      id_from: gitlab

modules:
  - id: vpc
    github_enterprise:
      namespace: spacelift-ci-org
"#;

fn write_workspace(dir: &Path, yaml: &str) -> String {
    let file = dir.join("workspace.yaml");
    fs::write(&file, yaml).unwrap();
    file.to_str().unwrap().to_string()
}

fn state_serial(path: &Path) -> u64 {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    json["serial"].as_u64().unwrap()
}

#[test]
fn test_help_flag() {
    vcsbind_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve and reconcile VCS integration bindings"));
}

// ============================================================================
// VALIDATE
// ============================================================================

#[test]
fn test_validate_valid_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(temp_dir.path(), WORKSPACE);

    vcsbind_cmd()
        .args(["validate", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"))
        .stdout(predicate::str::contains("Stacks: 2"))
        .stdout(predicate::str::contains("Modules: 1"));
}

#[test]
fn test_validate_rejects_two_provider_blocks() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(
        temp_dir.path(),
        r#"
stacks:
  - id: api
    gitlab: { namespace: infra }
    azure_devops: { project: infra }
"#,
    );

    vcsbind_cmd()
        .args(["validate", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VCS-011"))
        .stderr(predicate::str::contains("Fix:"));
}

#[test]
fn test_validate_missing_file() {
    vcsbind_cmd()
        .args(["validate", "does-not-exist.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VCS-092"));
}

// ============================================================================
// PLAN / APPLY
// ============================================================================

#[test]
fn test_plan_does_not_write_state() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(temp_dir.path(), WORKSPACE);
    let state = temp_dir.path().join("state.json");

    vcsbind_cmd()
        .args(["plan", &file, "--state", state.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack.api github_enterprise = ghe-team"))
        .stdout(predicate::str::contains("3 to change"));

    assert!(!state.exists());
}

#[test]
fn test_apply_twice_keeps_serial() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(temp_dir.path(), WORKSPACE);
    let state = temp_dir.path().join("state.json");

    vcsbind_cmd()
        .args(["apply", &file, "--state", state.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("stack.api github_enterprise = ghe-team"))
        .stdout(predicate::str::contains("stack.web gitlab = gl-root"))
        .stdout(predicate::str::contains("module.vpc github_enterprise = ghe-root"))
        .stdout(predicate::str::contains("3 changed"));

    let serial = state_serial(&state);
    assert_eq!(serial, 3);
    let written = fs::read_to_string(&state).unwrap();

    vcsbind_cmd()
        .args(["apply", &file, "--state", state.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 changed, 3 unchanged"));

    assert_eq!(state_serial(&state), serial, "serials do not match");
    assert_eq!(fs::read_to_string(&state).unwrap(), written);
}

#[test]
fn test_apply_after_pinning_id_reports_change() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(temp_dir.path(), WORKSPACE);
    let state = temp_dir.path().join("state.json");

    vcsbind_cmd()
        .args(["apply", &file, "--state", state.to_str().unwrap()])
        .assert()
        .success();

    let pinned = WORKSPACE.replace("      id: \"\"", "      id: \"ghe-root\"");
    write_workspace(temp_dir.path(), &pinned);

    vcsbind_cmd()
        .args(["apply", &file, "--state", state.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("(was ghe-team)"))
        .stdout(predicate::str::contains("1 changed, 2 unchanged"));

    assert_eq!(state_serial(&state), 4);
}

#[test]
fn test_apply_without_default_fails() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_workspace(
        temp_dir.path(),
        r#"
stacks:
  - id: api
    bitbucket_datacenter:
      namespace: E2E
"#,
    );
    let state = temp_dir.path().join("state.json");

    vcsbind_cmd()
        .args(["apply", &file, "--state", state.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("VCS-040"))
        .stderr(predicate::str::contains("Bitbucket Datacenter"));

    assert!(!state.exists());
}
