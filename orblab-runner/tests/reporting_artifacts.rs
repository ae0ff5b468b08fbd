//! Artifact round-trip: save a run to disk, load it back, reject newer schemas.
//! Runs are keyed by config and dataset together.

use chrono::NaiveDate;
use orblab_runner::config::BacktestConfig;
use orblab_runner::data_loader::{load_synthetic, LoadOptions};
use orblab_runner::export::{
    artifact_dir_name, import_summary_json, load_artifacts, save_artifacts,
};
use orblab_runner::runner::{run_backtest, BacktestResult, SCHEMA_VERSION};

fn synthetic_result() -> BacktestResult {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let data = load_synthetic("SPY", start, 30, &LoadOptions::default()).unwrap();
    let mut config = BacktestConfig::default();
    config.gates.base_tight_frac = 0.0;
    config.gates.base_near_vwap_atr = 0.0;
    run_backtest(&config, &data).unwrap()
}

#[test]
fn save_then_load_roundtrips() {
    let result = synthetic_result();
    let dir = tempfile::tempdir().unwrap();

    let run_dir = save_artifacts(&result, dir.path()).unwrap();
    assert_eq!(run_dir, dir.path().join(artifact_dir_name(&result)));
    for name in ["trades.csv", "trades.json", "summary.json"] {
        assert!(run_dir.join(name).is_file(), "missing {name}");
    }

    let csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(csv.lines().count(), result.trades.len() + 1);

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.trades.len(), result.trades.len());
    assert_eq!(loaded.rejections, result.rejections);
    assert_eq!(loaded.funnel, result.funnel);
    assert_eq!(loaded.config, result.config);
    assert_eq!(loaded.summary.trade_count, result.summary.trade_count);
    assert!((loaded.summary.total_pnl - result.summary.total_pnl).abs() < 1e-6);
    assert!(loaded.has_synthetic);
}

#[test]
fn rerun_overwrites_same_directory() {
    let result = synthetic_result();
    let dir = tempfile::tempdir().unwrap();
    let first = save_artifacts(&result, dir.path()).unwrap();
    let second = save_artifacts(&result, dir.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn same_config_on_different_data_keeps_both_runs() {
    let first = synthetic_result();
    let mut second = first.clone();
    second.dataset_hash = "f".repeat(64);
    assert_eq!(first.run_id, second.run_id);
    assert_ne!(first.dataset_hash, second.dataset_hash);

    let dir = tempfile::tempdir().unwrap();
    let a = save_artifacts(&first, dir.path()).unwrap();
    let b = save_artifacts(&second, dir.path()).unwrap();
    assert_ne!(a, b);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

    assert_eq!(load_artifacts(&a).unwrap().dataset_hash, first.dataset_hash);
    assert_eq!(load_artifacts(&b).unwrap().dataset_hash, second.dataset_hash);
}

#[test]
fn dir_name_joins_both_fingerprints() {
    let result = synthetic_result();
    let name = artifact_dir_name(&result);
    assert_eq!(name.len(), 33);
    assert!(name.starts_with(&result.run_id[..16]));
    assert!(name.ends_with(&result.dataset_hash[..16]));
}

#[test]
fn newer_schema_version_rejected() {
    let result = synthetic_result();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&result, dir.path()).unwrap();

    let text = std::fs::read_to_string(run_dir.join("summary.json")).unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&text).unwrap();
    json["schema_version"] = serde_json::json!(SCHEMA_VERSION + 1);

    let err = import_summary_json(&json.to_string()).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn missing_directory_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_artifacts(&dir.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("summary.json"));
}
