//! End-to-end tests for the envchain binary.
//!
//! Responsibilities:
//! - Prove declarations are applied in order against the loaded `.env`.
//! - Prove failures map to the documented exit codes.

mod common;

use common::{envchain_cmd, write_fixture};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_render_json() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    let output = envchain_cmd(temp_dir.path())
        .args(["render", "VARIABLE_1=test", "inherit:VARIABLE_2:VARIABLE_1"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let rendered: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        rendered,
        serde_json::json!({"VARIABLE_1": "variable_1", "VARIABLE_2": "variable_1"})
    );
}

#[test]
fn test_render_dotenv_format() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .args([
            "render",
            "-f",
            "dotenv",
            "alias:FIRST:VARIABLE_1",
            "UNSET=fallback",
        ])
        .assert()
        .success()
        .stdout("FIRST=variable_1\nUNSET=fallback\n");
}

#[test]
fn test_custom_path() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("custom.env"), "STAGE=custom\n").unwrap();

    envchain_cmd(temp_dir.path())
        .args(["--path", "custom.env", "get", "STAGE", "STAGE=default"])
        .assert()
        .success()
        .stdout("custom\n");
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();

    envchain_cmd(temp_dir.path())
        .args(["get", "STAGE", "STAGE=default"])
        .assert()
        .success()
        .stdout("default\n");
}

#[test]
fn test_removed_source_fails_with_evaluation_code() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .args([
            "render",
            "VARIABLE_1",
            "inherit:COPY:VARIABLE_1",
            "remove:VARIABLE_1",
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Missing inherited value"));
}

#[test]
fn test_quiet_inheritance_renders_null() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .args([
            "render",
            "VARIABLE_1",
            "inherit:COPY:VARIABLE_1:quiet",
            "remove:VARIABLE_1",
        ])
        .assert()
        .success()
        .stdout("{\"COPY\":null}\n");
}

#[test]
fn test_unknown_source_fails_with_declaration_code() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .args(["render", "inherit:COPY:MISSING"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no such field"));
}

#[test]
fn test_invalid_dotenv_fails_with_load_code() {
    let temp_dir = TempDir::new().unwrap();
    let secret = "supersecret_token_12345";
    fs::write(
        temp_dir.path().join(".env"),
        format!("TOKEN={}\nINVALID_LINE_WITHOUT_EQUALS", secret),
    )
    .unwrap();

    envchain_cmd(temp_dir.path())
        .args(["render", "TOKEN"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(secret).not());
}

#[test]
fn test_dotenv_disabled_ignores_file() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .env("DOTENV_DISABLED", "1")
        .args(["get", "VARIABLE_1", "VARIABLE_1=fallback"])
        .assert()
        .success()
        .stdout("fallback\n");
}

#[test]
fn test_process_env_wins_unless_override() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .env("VARIABLE_1", "from-process")
        .args(["get", "VARIABLE_1", "VARIABLE_1"])
        .assert()
        .success()
        .stdout("from-process\n");

    envchain_cmd(temp_dir.path())
        .env("VARIABLE_1", "from-process")
        .args(["--override", "get", "VARIABLE_1", "VARIABLE_1"])
        .assert()
        .success()
        .stdout("variable_1\n");
}

#[test]
fn test_inspect_lists_names_only() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path());

    envchain_cmd(temp_dir.path())
        .arg("inspect")
        .assert()
        .success()
        .stdout("VARIABLE_1\nVARIABLE_2\n");
}

#[test]
fn test_get_undeclared_field_fails() {
    let temp_dir = TempDir::new().unwrap();

    envchain_cmd(temp_dir.path())
        .args(["get", "NOPE"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not declared"));
}
