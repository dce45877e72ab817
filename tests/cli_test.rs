//! Integration tests for the stepup-release binary
//!
//! Only paths that fail or finish before the Flutter toolchain is invoked
//! are exercised here; toolchain-driven flows are covered by
//! `pipeline_test.rs` with a fake runner.

mod common;

use common::{sample_pubspec, TestProject, SAMPLE_WEBSITE_SCRIPT};
use std::path::Path;
use std::process::{Command, Output};

/// Run stepup-release from `cwd` with a clean configuration environment
fn run(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stepup-release"))
        .current_dir(cwd)
        .env_remove("STEPUP_RELEASE_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute stepup-release")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_invalid_version_exits_with_error() {
    let project = TestProject::with_pubspec("1.0.0");
    let output = run(&project.path(), &["release", "1.2"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Invalid version '1.2'"));
    assert!(project.read_file("pubspec.yaml").contains("version: 1.0.0"));
    assert!(!project.file_exists("releases"));
}

#[test]
fn test_missing_manifest_exits_with_error() {
    let project = TestProject::new();
    let output = run(&project.path(), &["release", "1.2.0", "--targets", "android"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("pubspec.yaml"));
}

#[test]
fn test_conflicting_modes_rejected() {
    let project = TestProject::with_pubspec("1.0.0");
    let output = run(
        &project.path(),
        &["release", "1.2.0", "--build-only", "--package-only"],
    );

    assert!(!output.status.success());
    assert!(stderr(&output).contains("cannot be used with"));
}

#[test]
fn test_targets_json_respects_explicit_list() {
    let project = TestProject::new();
    let output = run(
        &project.path(),
        &["targets", "--targets", "Web, android,bogus,web", "--json"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = json["targets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["target"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["web", "android"]);
    assert_eq!(json["targets"][0]["runs_here"], true);
    assert_eq!(json["targets"][0]["required_host"], "any");
}

#[test]
fn test_targets_all_lists_every_target() {
    let project = TestProject::new();
    let output = run(&project.path(), &["targets", "--all", "--json"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["targets"].as_array().unwrap().len(), 7);
    assert_eq!(json["targets"][6]["target"], "installer");
}

#[test]
fn test_explicit_missing_config_is_error() {
    let project = TestProject::new();
    let output = run(
        &project.path(),
        &["targets", "--config", "missing-release.toml"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing-release.toml"));
}

#[test]
fn test_config_from_environment() {
    let project = TestProject::new();
    project.create_file("custom.toml", "[toolchain]\nprogram = \"/opt/flutter/bin/flutter\"\n");

    let output = Command::new(env!("CARGO_BIN_EXE_stepup-release"))
        .current_dir(project.path())
        .env("STEPUP_RELEASE_CONFIG", project.join("custom.toml"))
        .args(["targets", "--json"])
        .output()
        .expect("Failed to execute stepup-release");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["toolchain"], "/opt/flutter/bin/flutter");
}

#[test]
fn test_sync_web_updates_only_version_line() {
    let workspace = TestProject::new();
    workspace.create_file("stepup_app/pubspec.yaml", &sample_pubspec("1.4.2+7"));
    workspace.create_file("website/script.js", SAMPLE_WEBSITE_SCRIPT);

    let app_dir = workspace.join("stepup_app");
    let output = run(&app_dir, &["sync-web"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let updated = workspace.read_file("website/script.js");
    assert_eq!(
        updated,
        SAMPLE_WEBSITE_SCRIPT.replace("'1.0.0'", "'1.4.2'")
    );
}

#[test]
fn test_sync_web_with_explicit_script_and_project_dir() {
    let project = TestProject::with_pubspec("2.0.0");
    project.create_file("site/app.js", SAMPLE_WEBSITE_SCRIPT);
    let elsewhere = TestProject::new();

    let project_dir = project.path();
    let output = run(
        &elsewhere.path(),
        &[
            "sync-web",
            "--project-dir",
            project_dir.to_str().unwrap(),
            "--script",
            "site/app.js",
        ],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project
        .read_file("site/app.js")
        .contains("const APP_VERSION = '2.0.0';"));
}

#[test]
fn test_sync_web_missing_script_fails() {
    let project = TestProject::with_pubspec("2.0.0");
    let output = run(&project.path(), &["sync-web"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("script.js"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let project = TestProject::new();
    let output = run(&project.path(), &[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
}
