//! Performance summary — pure functions over the trade list.
//!
//! Nothing here knows about sessions, bars or configuration. Trades in,
//! scalars out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use orblab_core::domain::{ExitReason, Rejection, Side, TradeRecord};
use orblab_core::{DayOutcome, SessionOutcome};

/// Aggregate statistics for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    pub profit_factor: f64,
    pub avg_r: f64,
    pub by_exit_reason: BTreeMap<ExitReason, usize>,
    pub long_count: usize,
    pub short_count: usize,
}

impl PerformanceSummary {
    pub fn compute(trades: &[TradeRecord]) -> Self {
        Self {
            trade_count: trades.len(),
            wins: win_count(trades),
            losses: loss_count(trades),
            win_rate: win_rate(trades),
            total_pnl: total_pnl(trades),
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            profit_factor: profit_factor(trades),
            avg_r: avg_r_multiple(trades),
            by_exit_reason: exit_reason_counts(trades),
            long_count: side_count(trades, Side::Long),
            short_count: side_count(trades, Side::Short),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Trades with pnl > 0.
pub fn win_count(trades: &[TradeRecord]) -> usize {
    trades.iter().filter(|t| t.is_winner()).count()
}

/// Trades with pnl < 0. Scratch trades are neither.
pub fn loss_count(trades: &[TradeRecord]) -> usize {
    trades.iter().filter(|t| t.is_loser()).count()
}

/// Fraction of trades that won. 0 with no trades.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    win_count(trades) as f64 / trades.len() as f64
}

pub fn total_pnl(trades: &[TradeRecord]) -> f64 {
    trades.iter().map(|t| t.pnl).sum()
}

/// Sum of positive P&L.
pub fn gross_profit(trades: &[TradeRecord]) -> f64 {
    trades.iter().filter(|t| t.pnl > 0.0).map(|t| t.pnl).sum()
}

/// Absolute sum of negative P&L.
pub fn gross_loss(trades: &[TradeRecord]) -> f64 {
    trades
        .iter()
        .filter(|t| t.pnl < 0.0)
        .map(|t| t.pnl.abs())
        .sum()
}

/// Gross profit / gross loss. Zero when there are no losing trades.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    let loss = gross_loss(trades);
    if loss == 0.0 {
        return 0.0;
    }
    gross_profit(trades) / loss
}

/// Mean R-multiple. 0 with no trades.
pub fn avg_r_multiple(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    trades.iter().map(|t| t.r_multiple).sum::<f64>() / trades.len() as f64
}

pub fn exit_reason_counts(trades: &[TradeRecord]) -> BTreeMap<ExitReason, usize> {
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(trade.exit_reason).or_insert(0) += 1;
    }
    counts
}

pub fn side_count(trades: &[TradeRecord], side: Side) -> usize {
    trades.iter().filter(|t| t.side == side).count()
}

// ─── Session diagnostics ────────────────────────────────────────────

/// How far each session got through the pipeline.
///
/// Every stage count is at most the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFunnel {
    pub days: usize,
    /// Opening-range, base and trade windows all had bars.
    pub has_windows: usize,
    pub has_atr: usize,
    pub passed_gates: usize,
    pub breakouts: usize,
    pub entries: usize,
}

impl SessionFunnel {
    pub fn from_outcomes(days: &[DayOutcome]) -> Self {
        let mut funnel = Self {
            days: days.len(),
            ..Self::default()
        };
        for day in days {
            let reached = match &day.outcome {
                SessionOutcome::Traded(_) => 5,
                SessionOutcome::NoTrade(r) => stage_reached(*r),
            };
            funnel.has_windows += usize::from(reached >= 1);
            funnel.has_atr += usize::from(reached >= 2);
            funnel.passed_gates += usize::from(reached >= 3);
            funnel.breakouts += usize::from(reached >= 4);
            funnel.entries += usize::from(reached >= 5);
        }
        funnel
    }
}

/// Number of funnel stages a session cleared before this rejection.
fn stage_reached(rejection: Rejection) -> u8 {
    match rejection {
        Rejection::MissingWindow => 0,
        Rejection::AtrUndefined => 1,
        r if r.is_gate() => 2,
        Rejection::NoBreakout => 3,
        _ => 4,
    }
}

/// Rejection tallies, with every reason present (zero when unseen).
pub fn rejection_counts(days: &[DayOutcome]) -> BTreeMap<Rejection, usize> {
    let mut counts: BTreeMap<Rejection, usize> = Rejection::ALL.iter().map(|r| (*r, 0)).collect();
    for rejection in days.iter().filter_map(|d| d.outcome.rejection()) {
        *counts.entry(rejection).or_insert(0) += 1;
    }
    counts
}
