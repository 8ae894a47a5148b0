//! Smoke tests for the domscout CLI
//!
//! None of these launch a browser: every case fails or finishes before a
//! session is opened.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the domscout binary
fn domscout() -> Command {
    let mut cmd = Command::cargo_bin("domscout").expect("domscout binary should exist");
    cmd.env_remove("DOMSCOUT_USERNAME")
        .env_remove("DOMSCOUT_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    domscout()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    domscout()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_discover_help_lists_flags() {
    domscout()
        .args(["discover", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--env"))
        .stdout(predicate::str::contains("--cookies"))
        .stdout(predicate::str::contains("--smart"))
        .stdout(predicate::str::contains("DOMSCOUT_USERNAME"));
}

#[test]
fn test_unknown_subcommand() {
    domscout().arg("crawl").assert().failure();
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_prints_yaml() {
    domscout()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("hydration:"))
        .stdout(predicate::str::contains("simple_mode_cap: 10"))
        .stdout(predicate::str::contains("environments:"))
        .stdout(predicate::str::contains("https://qa.my.charitableimpact.com"));
}

#[test]
fn test_config_file_values_shown() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scout.yaml");
    fs::write(&path, "enumeration:\n  simple_mode_cap: 7\n").unwrap();

    domscout()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("simple_mode_cap: 7"));
}

#[test]
fn test_config_file_invalid_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scout.yaml");
    fs::write(&path, "hydration:\n  poll_interval_ms: 0\n").unwrap();

    domscout()
        .args(["config", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll intervals must be non-zero"));
}

#[test]
fn test_config_file_missing() {
    domscout()
        .args(["config", "--config", "/nonexistent/scout.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

// ============================================================================
// Discover Argument Tests
// ============================================================================

#[test]
fn test_discover_requires_target() {
    domscout()
        .arg("discover")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_discover_unknown_environment() {
    domscout()
        .args(["discover", "--env", "dev"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment 'dev'"));
}

#[test]
fn test_discover_password_requires_username() {
    domscout()
        .args(["discover", "--url", "https://app.test/", "--password", "pw"])
        .assert()
        .failure();
}

#[test]
fn test_discover_bad_format() {
    domscout()
        .args(["discover", "--url", "https://app.test/", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_discover_missing_cookie_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    domscout()
        .args(["discover", "--url", "https://app.test/", "--cookies"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read cookies"));
}

#[test]
fn test_discover_malformed_cookie_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cookies.json");
    fs::write(&path, "{ not json").unwrap();

    domscout()
        .args(["discover", "--url", "https://app.test/", "--cookies"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));
}

#[test]
fn test_discover_cookies_with_exported_credentials() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.json");

    domscout()
        .env("DOMSCOUT_USERNAME", "ada")
        .env("DOMSCOUT_PASSWORD", "pw")
        .args(["discover", "--url", "https://app.test/", "--cookies"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read cookies"));
}
