//! Backtest runner — wires together configuration, the engine and metrics.
//!
//! `run_backtest()` takes pre-loaded data so that the CLI, tests and
//! benchmarks all share one path; loading lives in `data_loader`.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use orblab_core::domain::{split_sessions, validate_history, BarError, Rejection, TradeRecord};
use orblab_core::{DayOutcome, OrbEngine, SessionRunner};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{LoadError, LoadedData};
use crate::metrics::{rejection_counts, PerformanceSummary, SessionFunnel};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid bar history: {0}")]
    Bars(#[from] BarError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub run_id: String,
    pub dataset_hash: String,
    pub exit_rule: String,
    pub config: BacktestConfig,
    pub session_count: usize,
    pub bar_count: usize,
    pub trades: Vec<TradeRecord>,
    pub rejections: BTreeMap<Rejection, usize>,
    pub funnel: SessionFunnel,
    pub summary: PerformanceSummary,
    pub has_synthetic: bool,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one backtest over already-loaded bars. No I/O.
///
/// Sessions are evaluated in date order, or on the rayon pool when
/// `config.backtest.parallel` is set; both modes return identical results.
pub fn run_backtest(config: &BacktestConfig, data: &LoadedData) -> Result<BacktestResult, RunError> {
    let params = config.to_params()?;
    let engine = OrbEngine::new(params, config.exit.rule.build()).map_err(ConfigError::from)?;
    let symbol = config.backtest.symbol.as_str();

    validate_history(&data.bars)?;
    let sessions = split_sessions(&data.bars);
    info!(
        symbol,
        sessions = sessions.len(),
        bars = data.bars.len(),
        exit_rule = engine.exit_rule_name(),
        parallel = config.backtest.parallel,
        "starting backtest"
    );

    let days: Vec<DayOutcome> = if config.backtest.parallel {
        // Indexed par_iter collects in input order.
        sessions
            .par_iter()
            .map(|session| DayOutcome {
                date: session.date,
                outcome: engine.evaluate(symbol, session),
            })
            .collect()
    } else {
        SessionRunner::new(engine).run_sessions(symbol, &sessions)
    };

    let trades: Vec<TradeRecord> = days
        .iter()
        .filter_map(|d| d.outcome.trade().cloned())
        .collect();
    let summary = PerformanceSummary::compute(&trades);
    info!(
        symbol,
        trades = summary.trade_count,
        win_rate = summary.win_rate,
        total_pnl = summary.total_pnl,
        "backtest finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        run_id: config.run_id(),
        dataset_hash: data.dataset_hash.clone(),
        exit_rule: config.exit.rule.as_str().to_string(),
        config: config.clone(),
        session_count: days.len(),
        bar_count: data.bars.len(),
        rejections: rejection_counts(&days),
        funnel: SessionFunnel::from_outcomes(&days),
        trades,
        summary,
        has_synthetic: data.has_synthetic,
    })
}
