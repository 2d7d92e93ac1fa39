//! CLI error handling tests for gb-core.
//!
//! Invalid arguments, unreadable inputs and bad configuration must fail
//! with the documented exit code and a human diagnostic on stderr, before
//! any output directory is created.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn gb_core() -> Command {
    let mut cmd = Command::cargo_bin("gb-core").expect("gb-core binary should exist");
    cmd.env_remove("GB_CONFIG")
        .env_remove("GB_LOG")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn help_lists_overrides() {
    gb_core()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--seed"))
        .stdout(predicate::str::contains("--results-dir"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn unknown_flag_is_an_argument_error() {
    gb_core()
        .arg("--not-a-flag")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn non_numeric_seed_is_an_argument_error() {
    gb_core().args(["--seed", "abc"]).assert().code(2);
}

#[test]
fn unknown_log_format_is_an_argument_error() {
    gb_core().args(["--log-format", "xml"]).assert().code(2);
}

// ============================================================================
// Runtime failures
// ============================================================================

#[test]
fn missing_data_file_exits_with_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let results = dir.path().join("results");
    gb_core()
        .arg("--data")
        .arg(dir.path().join("absent.tsv"))
        .arg("--results-dir")
        .arg(&results)
        .arg("--no-color")
        .assert()
        .code(10)
        .stdout(predicate::str::contains("Preprocessing data..."))
        .stderr(predicate::str::contains("✗"))
        .stderr(predicate::str::contains("Fix:"));
    assert!(!results.exists());
}

#[test]
fn missing_column_exits_with_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("reviews.tsv");
    fs::write(&data, "rev_gender_updated\tgrades\nmale\t3\n").unwrap();
    gb_core()
        .arg("--data")
        .arg(&data)
        .arg("--no-color")
        .current_dir(dir.path())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("author_gender"));
}

#[test]
fn unknown_category_exits_with_model_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("reviews.tsv");
    fs::write(
        &data,
        "rev_gender_updated\tauthor_gender\tgrades\nmale\tunknown\t3\n",
    )
    .unwrap();
    gb_core()
        .arg("--data")
        .arg(&data)
        .arg("--no-color")
        .current_dir(dir.path())
        .assert()
        .code(11);
}

#[test]
fn quiet_suppresses_progress_text() {
    let dir = tempfile::tempdir().unwrap();
    gb_core()
        .arg("--data")
        .arg(dir.path().join("absent.tsv"))
        .arg("--quiet")
        .current_dir(dir.path())
        .assert()
        .code(10)
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Log filtering
// ============================================================================

#[test]
fn quiet_flag_overrides_rust_log() {
    let dir = tempfile::tempdir().unwrap();
    gb_core()
        .env("RUST_LOG", "info")
        .arg("--data")
        .arg(dir.path().join("absent.tsv"))
        .arg("--quiet")
        .current_dir(dir.path())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("INFO").not())
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn gb_log_overrides_rust_log() {
    let dir = tempfile::tempdir().unwrap();
    gb_core()
        .env("GB_LOG", "info")
        .env("RUST_LOG", "error")
        .arg("--data")
        .arg(dir.path().join("absent.tsv"))
        .current_dir(dir.path())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("INFO"));
}

#[test]
fn rust_log_applies_without_other_settings() {
    let dir = tempfile::tempdir().unwrap();
    gb_core()
        .env("RUST_LOG", "error")
        .arg("--data")
        .arg(dir.path().join("absent.tsv"))
        .current_dir(dir.path())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("INFO").not());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn invalid_override_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    gb_core()
        .args(["--chains", "0"])
        .current_dir(dir.path())
        .assert()
        .code(14)
        .stderr(predicate::str::contains("sampling.chains"));
}

#[test]
fn malformed_config_file_exits_with_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.json");
    fs::write(&config, "{not json").unwrap();
    gb_core()
        .arg("--config")
        .arg(&config)
        .current_dir(dir.path())
        .assert()
        .code(14);
}

#[test]
fn config_file_values_are_validated() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("run.json");
    fs::write(&config, r#"{"summary": {"hdi_prob": 1.5}}"#).unwrap();
    gb_core()
        .arg("--config")
        .arg(&config)
        .current_dir(dir.path())
        .assert()
        .code(14)
        .stderr(predicate::str::contains("summary.hdi_prob"));
}
