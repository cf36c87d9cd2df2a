//! CLI integration tests for the folioweb binary.
//!
//! These run the compiled binary; networked modes are covered only as far as
//! configuration validation, so no test touches a real API.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn folioweb_cmd() -> Command {
    let mut cmd = Command::cargo_bin("folioweb").expect("failed to find folioweb binary");
    // Isolate from the environment of whoever runs the tests.
    cmd.env_remove("FOLIO__API_URL")
        .env_remove("FOLIO__MESSAGE_API_URL")
        .env_remove("FOLIO__USE_MOCK_DATA")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Flag parsing
// ============================================================================

#[test]
fn test_help_flag() {
    folioweb_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("portfolio"))
        .stdout(predicate::str::contains("--mock"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn test_version_flag() {
    folioweb_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    folioweb_cmd().args(["-v", "--quiet"]).assert().failure();
}

// ============================================================================
// Configuration validation
// ============================================================================

#[test]
fn test_fails_without_urls_or_mock() {
    folioweb_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "api_url, message_api_url must be set",
        ));
}

#[test]
fn test_fails_with_api_url_but_no_message_api_url() {
    folioweb_cmd()
        .args(["--api-url", "https://api.example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("message_api_url must be set"));
}

#[test]
fn test_missing_config_file_fails() {
    folioweb_cmd()
        .args(["--config", "/nonexistent/folio.toml", "--mock"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn test_env_var_enables_mock_mode() {
    folioweb_cmd()
        .env("FOLIO__USE_MOCK_DATA", "true")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"));
}

// ============================================================================
// Mock mode end-to-end
// ============================================================================

#[test]
fn test_mock_mode_prints_every_section() {
    folioweb_cmd()
        .args(["--mock", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"))
        .stdout(predicate::str::contains("Experience"))
        .stdout(predicate::str::contains("Skills"))
        .stdout(predicate::str::contains("Certifications"))
        .stdout(predicate::str::contains("Projects"))
        .stdout(predicate::str::contains("Miniature themes"));
}

#[test]
fn test_mock_mode_sends_contact_message() {
    folioweb_cmd()
        .args([
            "--mock",
            "--quiet",
            "--message",
            "Nice portfolio",
            "--name",
            "Jane",
            "--email",
            "jane@example.com",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Message sent."));
}

#[test]
fn test_message_requires_sender_details() {
    folioweb_cmd()
        .args(["--mock", "--message", "Nice portfolio"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--name"));
}

#[test]
fn test_config_file_with_mock_mode() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("failed to create temp config");
    writeln!(file, "use_mock_data = true").expect("failed to write temp config");

    folioweb_cmd()
        .args(["--config"])
        .arg(file.path())
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("John Doe"));
}
