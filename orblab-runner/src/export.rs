//! Artifact export — trade tape as CSV and JSON, run summary as JSON.
//!
//! A run directory `<output_dir>/<run_id[..16]>_<dataset_hash[..16]>/` holds:
//! - `trades.csv`: one row per trade, every `TradeRecord` field
//! - `trades.json`: the same trades, full precision
//! - `summary.json`: everything in `BacktestResult` except the trades
//!
//! `summary.json` carries a `schema_version`. Newer versions are rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use orblab_core::domain::{Rejection, TradeRecord};

use crate::config::BacktestConfig;
use crate::metrics::{PerformanceSummary, SessionFunnel};
use crate::runner::{BacktestResult, SCHEMA_VERSION};

/// Persisted form of a run without its trade list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub symbol: String,
    pub run_id: String,
    pub dataset_hash: String,
    pub exit_rule: String,
    pub config: BacktestConfig,
    pub session_count: usize,
    pub bar_count: usize,
    pub rejections: BTreeMap<Rejection, usize>,
    pub funnel: SessionFunnel,
    pub summary: PerformanceSummary,
    pub has_synthetic: bool,
}

impl RunSummary {
    pub fn from_result(result: &BacktestResult) -> Self {
        Self {
            schema_version: result.schema_version,
            symbol: result.symbol.clone(),
            run_id: result.run_id.clone(),
            dataset_hash: result.dataset_hash.clone(),
            exit_rule: result.exit_rule.clone(),
            config: result.config.clone(),
            session_count: result.session_count,
            bar_count: result.bar_count,
            rejections: result.rejections.clone(),
            funnel: result.funnel.clone(),
            summary: result.summary.clone(),
            has_synthetic: result.has_synthetic,
        }
    }

    fn into_result(self, trades: Vec<TradeRecord>) -> BacktestResult {
        BacktestResult {
            schema_version: self.schema_version,
            symbol: self.symbol,
            run_id: self.run_id,
            dataset_hash: self.dataset_hash,
            exit_rule: self.exit_rule,
            config: self.config,
            session_count: self.session_count,
            bar_count: self.bar_count,
            trades,
            rejections: self.rejections,
            funnel: self.funnel,
            summary: self.summary,
            has_synthetic: self.has_synthetic,
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_summary_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(&RunSummary::from_result(result))
        .context("failed to serialize run summary to JSON")
}

/// Parse `summary.json`, rejecting unknown schema versions.
pub fn import_summary_json(json: &str) -> Result<RunSummary> {
    let summary: RunSummary =
        serde_json::from_str(json).context("failed to deserialize run summary from JSON")?;
    if summary.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            summary.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(summary)
}

pub fn export_trades_json(trades: &[TradeRecord]) -> Result<String> {
    serde_json::to_string_pretty(trades).context("failed to serialize trades to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV, one column per `TradeRecord` field.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    // Header
    wtr.write_record([
        "date",
        "symbol",
        "side",
        "entry_time",
        "entry_price",
        "stop_price",
        "vwap_at_entry",
        "shares",
        "or_high",
        "or_low",
        "or_width",
        "or_width_atr",
        "base_width",
        "atr",
        "stop_distance",
        "risk_amount",
        "target_r1",
        "target_r2",
        "exit_time",
        "exit_price",
        "exit_reason",
        "scaled_out",
        "pnl",
        "r_multiple",
        "exit_rule",
    ])?;

    for t in trades {
        wtr.write_record([
            t.date.to_string(),
            t.symbol.clone(),
            t.side.as_str().to_string(),
            t.entry_time.to_string(),
            format!("{:.4}", t.entry_price),
            format!("{:.4}", t.stop_price),
            format!("{:.4}", t.vwap_at_entry),
            t.shares.to_string(),
            format!("{:.4}", t.or_high),
            format!("{:.4}", t.or_low),
            format!("{:.4}", t.or_width),
            format!("{:.4}", t.or_width_atr),
            format!("{:.4}", t.base_width),
            format!("{:.4}", t.atr),
            format!("{:.4}", t.stop_distance),
            format!("{:.2}", t.risk_amount),
            format!("{:.4}", t.target_r1),
            format!("{:.4}", t.target_r2),
            t.exit_time.to_string(),
            format!("{:.4}", t.exit_price),
            t.exit_reason.as_str().to_string(),
            t.scaled_out.to_string(),
            format!("{:.2}", t.pnl),
            format!("{:.4}", t.r_multiple),
            t.exit_rule.clone(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a run: config fingerprint plus dataset fingerprint.
///
/// Only the same config over the same bars maps to the same directory.
pub fn artifact_dir_name(result: &BacktestResult) -> String {
    fn short(hash: &str) -> &str {
        hash.get(..16).unwrap_or(hash)
    }
    format!("{}_{}", short(&result.run_id), short(&result.dataset_hash))
}

/// Write the artifact set for one run into `<output_dir>/<artifact_dir_name>/`.
///
/// A rerun of the same config over the same data overwrites its directory.
/// Returns the path to the run directory.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    write_file(&run_dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write_file(&run_dir.join("trades.json"), &export_trades_json(&result.trades)?)?;
    write_file(&run_dir.join("summary.json"), &export_summary_json(result)?)?;

    Ok(run_dir)
}

/// Rebuild a `BacktestResult` from a run directory.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let summary = import_summary_json(&read_file(&dir.join("summary.json"))?)?;
    let trades: Vec<TradeRecord> = serde_json::from_str(&read_file(&dir.join("trades.json"))?)
        .context("failed to deserialize trades from JSON")?;
    Ok(summary.into_result(trades))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
