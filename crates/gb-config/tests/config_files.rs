//! File-backed configuration tests: loading, validation and snapshot output.

use gb_config::{validate_run_config, ConfigSnapshot, RunConfig, ValidationError};
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_partial_config_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{
            "data_path": "input/grades.tsv",
            "sampling": { "chains": 2, "draws": 500 },
            "plot": { "dpi": 150 }
        }"#,
    )
    .expect("write config");

    let cfg = RunConfig::from_file(&path).expect("load config");
    assert_eq!(cfg.data_path.to_str(), Some("input/grades.tsv"));
    assert_eq!(cfg.sampling.chains, 2);
    assert_eq!(cfg.sampling.draws, 500);
    assert_eq!(cfg.sampling.tune, 1000);
    assert_eq!(cfg.plot.dpi, 150);
    assert!(validate_run_config(&cfg).is_ok());
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = RunConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ValidationError::IoError(_)));
}

#[test]
fn invalid_values_in_file_fail_validation() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("run.json");
    fs::write(&path, r#"{"summary": {"hdi_prob": 0.0}}"#).expect("write config");

    let cfg = RunConfig::from_file(&path).expect("parse config");
    let err = validate_run_config(&cfg).unwrap_err();
    assert!(err.to_string().contains("summary.hdi_prob"));
}

#[test]
fn snapshot_written_and_reloaded() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("config_snapshot.json");

    let snapshot = ConfigSnapshot::new(&RunConfig::default(), 2024, Some("run-000000000001"));
    snapshot.write_to(&path).expect("write snapshot");

    let json = fs::read_to_string(&path).expect("read snapshot");
    let restored = ConfigSnapshot::from_json(&json).expect("parse snapshot");
    assert!(restored.matches(&snapshot));
    assert_eq!(restored.seed, 2024);
    assert_eq!(restored.config.sampling.seed, Some(2024));
}
