//! Integration tests for the `refcat` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run with
//! no service at all; the data commands run against wiremock.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `refcat` binary with env isolation.
///
/// Clears all `REFCAT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn refcat_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("refcat");
    cmd.env("HOME", "/tmp/refcat-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/refcat-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("REFCAT_PROFILE")
        .env_remove("REFCAT_API_BASE_URL")
        .env_remove("REFCAT_OUTPUT")
        .env_remove("REFCAT_INSECURE")
        .env_remove("REFCAT_TIMEOUT");
    cmd
}

const OFFLINE: &str = "http://127.0.0.1:9/api/v1";

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = refcat_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    refcat_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("reference-data catalogue")
            .and(predicate::str::contains("types"))
            .and(predicate::str::contains("points"))
            .and(predicate::str::contains("choices")),
    );
}

#[test]
fn test_version_flag() {
    refcat_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refcat"));
}

#[test]
fn test_completions_bash() {
    refcat_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_config_path() {
    refcat_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_set_and_show_roundtrip() {
    let home = tempfile::tempdir().unwrap();
    let run = |args: &[&str]| {
        let mut cmd = refcat_cmd();
        cmd.env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path().join(".config"))
            .args(args);
        cmd
    };

    run(&["config", "set", "api_base_url", "https://cases.example.org/api/v1"])
        .assert()
        .success();
    run(&["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://cases.example.org/api/v1"));
}

// ── Validation ──────────────────────────────────────────────────────

#[test]
fn test_update_without_fields_is_usage_error() {
    let output = refcat_cmd()
        .args(["--api-url", OFFLINE, "points", "update", "p-1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nothing to change"));
}

#[test]
fn test_unknown_profile() {
    let output = refcat_cmd()
        .args(["--profile", "nope", "types", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

// ── Offline behaviour ───────────────────────────────────────────────

#[test]
fn test_types_list_offline_is_connection_error() {
    let output = refcat_cmd()
        .args(["--api-url", OFFLINE, "types", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
}

#[test]
fn test_choices_offline_uses_fallback() {
    refcat_cmd()
        .args(["--api-url", OFFLINE, "-o", "plain", "choices", "urgency_levels"])
        .assert()
        .success()
        .stdout(predicate::eq("low\nmedium\nhigh\ncritical\n"))
        .stderr(predicate::str::contains("fallback"));
}

#[test]
fn test_choices_offline_with_other() {
    refcat_cmd()
        .args([
            "--api-url",
            OFFLINE,
            "-o",
            "plain",
            "choices",
            "risk_levels",
            "--style",
            "radio",
            "--other",
        ])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("other\n"));
}

// ── Against a mock service ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_types_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dynamic-data/data-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t-1", "name": "urgency_levels", "display_name": "Urgency Levels"}
        ])))
        .mount(&server)
        .await;

    let output = refcat_cmd()
        .args(["--api-url", &format!("{}/api/v1", server.uri())])
        .args(["-o", "json-compact", "types", "list"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed[0]["name"], "urgency_levels");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_choices_live_has_no_fallback_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dynamic-data/data-types/urgency_levels/points"))
        .and(query_param("active_only", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "p-1", "data_type_id": "t-1", "name": "low", "description": "Low", "sort_order": 1},
            {"id": "p-2", "data_type_id": "t-1", "name": "high", "description": "High", "sort_order": 2}
        ])))
        .mount(&server)
        .await;

    refcat_cmd()
        .args(["--api-url", &format!("{}/api/v1", server.uri())])
        .args(["-o", "plain", "choices", "urgency_levels"])
        .assert()
        .success()
        .stdout(predicate::eq("low\nhigh\n"))
        .stderr(predicate::str::contains("fallback").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_with_yes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/dynamic-data/data-points/p-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    refcat_cmd()
        .args(["--api-url", &format!("{}/api/v1", server.uri())])
        .args(["-y", "points", "delete", "p-9"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Data point deleted"));
}
