//! End-to-end CLI tests for the wiki-updater binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, query_param};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

/// Command with an isolated config directory and no inherited password.
fn wiki_updater(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wiki-updater").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("WIKI_UPDATER_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn write_pages(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("pages.json");
    std::fs::write(&path, body).unwrap();
    path
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let dir = TempDir::new().unwrap();
    wiki_updater(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish page updates"))
        .stdout(predicate::str::contains("--pages"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let dir = TempDir::new().unwrap();
    wiki_updater(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wiki-updater"));
}

/// Test that a missing --pages argument is a usage error.
#[test]
fn test_binary_requires_pages_argument() {
    let dir = TempDir::new().unwrap();
    wiki_updater(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pages"));
}

#[test]
fn test_binary_missing_host_fails_before_network() {
    let dir = TempDir::new().unwrap();
    let pages = write_pages(&dir, r#"{"A": "x"}"#);
    wiki_updater(&dir)
        .args(["-u", "Bot", "--password", "pw", "--pages"])
        .arg(&pages)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No wiki host given"));
}

#[test]
fn test_binary_missing_password_fails() {
    let dir = TempDir::new().unwrap();
    let pages = write_pages(&dir, r#"{"A": "x"}"#);
    wiki_updater(&dir)
        .args(["--host", "example.fandom.com", "-u", "Bot", "--pages"])
        .arg(&pages)
        .assert()
        .failure()
        .stderr(predicate::str::contains("WIKI_UPDATER_PASSWORD"));
}

#[test]
fn test_binary_malformed_pages_file_fails() {
    let dir = TempDir::new().unwrap();
    let pages = write_pages(&dir, r#"["not", "an", "object"]"#);
    wiki_updater(&dir)
        .args(["--host", "example.fandom.com", "-u", "Bot", "--password", "pw"])
        .arg("--pages")
        .arg(&pages)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse pages file"));
}

#[test]
fn test_binary_reads_host_and_username_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "host = \"bad host/\"\nusername = \"Bot\"\n").unwrap();
    let pages = write_pages(&dir, r#"{"A": "x"}"#);

    // The configured host is picked up and rejected before any request.
    wiki_updater(&dir)
        .env("WIKI_UPDATER_PASSWORD", "pw")
        .arg("--config")
        .arg(&config)
        .arg("--pages")
        .arg(&pages)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid API endpoint"));
}

#[test]
fn test_binary_rejects_unknown_config_key() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.toml");
    std::fs::write(&config, "password = \"pw\"\n").unwrap();
    let pages = write_pages(&dir, r#"{"A": "x"}"#);

    wiki_updater(&dir)
        .arg("--config")
        .arg(&config)
        .arg("--pages")
        .arg(&pages)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let dir = TempDir::new().unwrap();
    wiki_updater(&dir)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[tokio::test]
async fn test_binary_login_failure_exits_non_zero() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(query_param("action", "login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"login": {"result": "WrongPass", "token": "T"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let pages = write_pages(&dir, r#"{"A": "x"}"#);
    let assert = wiki_updater(&dir)
        .args(["--base-url", &mock_server.uri(), "-u", "Bot", "--password", "pw"])
        .arg("--pages")
        .arg(&pages)
        .assert()
        .failure();
    assert_eq!(assert.get_output().status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).into_owned();
    assert!(stdout.contains("login_failed"), "stdout: {stdout}");
}

#[tokio::test]
async fn test_binary_successful_run_exits_zero() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(query_param("action", "login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"login": {"result": "Success", "token": "T"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "query"))
        .and(query_param("titles", "Latest Chapter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {
                "pageids": ["3"],
                "pages": {"3": {"pageid": 3, "title": "Latest Chapter", "edittoken": "tok"}}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(query_param("action", "edit"))
        .and(body_string_contains("summary=Weekly%20bump"))
        .and(body_string_contains("assert=bot"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"edit": {"result": "Success"}})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let pages = write_pages(&dir, r#"{"Latest Chapter": "Chapter 1093"}"#);
    wiki_updater(&dir)
        .env("WIKI_UPDATER_PASSWORD", "pw")
        .args(["--base-url", &mock_server.uri(), "-u", "Bot", "--bot"])
        .args(["--summary", "Weekly bump", "-q"])
        .arg("--pages")
        .arg(&pages)
        .assert()
        .success();
}
