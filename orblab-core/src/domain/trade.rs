//! TradeResult and TradeRecord — the outcome of one simulated session trade.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::plan::{EntryPlan, Side};

/// How the final shares of a trade were closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitReason {
    /// Initial or breakeven stop reached.
    StopLoss,
    /// Remainder closed at the second target.
    TargetR2,
    /// Remainder closed by a trailed stop (EMA trail rule only).
    TrailingStop,
    /// Forced close at the last bar before the flatten time.
    EodFlatten,
}

impl ExitReason {
    pub fn as_str(self) -> &'static str {
        match self {
            ExitReason::StopLoss => "STOP_LOSS",
            ExitReason::TargetR2 => "TARGET_R2",
            ExitReason::TrailingStop => "TRAILING_STOP",
            ExitReason::EodFlatten => "EOD_FLATTEN",
        }
    }
}

/// Output of an exit rule. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub exit_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_reason: ExitReason,
    /// Realized P&L summed over the partial and final fills.
    pub pnl: f64,
    /// `pnl / (shares × risk_per_share)`.
    pub r_multiple: f64,
    /// Whether the first-target scale-out happened.
    pub scaled_out: bool,
    /// Shares closed at the first target (0 when not scaled).
    pub scaled_shares: u64,
}

impl TradeResult {
    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }
}

/// A complete, flat trade row: plan measurements plus exit outcome.
///
/// This is the unit handed to trade export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    // ── Identification ──
    pub symbol: String,
    pub date: NaiveDate,
    pub side: Side,

    // ── Entry ──
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_price: f64,
    pub vwap_at_entry: f64,
    pub shares: u64,

    // ── Setup ──
    pub or_high: f64,
    pub or_low: f64,
    pub or_width: f64,
    pub or_width_atr: f64,
    pub base_width: f64,
    pub atr: f64,

    // ── Risk ──
    pub stop_distance: f64,
    pub risk_amount: f64,
    pub target_r1: f64,
    pub target_r2: f64,

    // ── Exit ──
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub exit_reason: ExitReason,
    pub scaled_out: bool,

    // ── PnL ──
    pub pnl: f64,
    pub r_multiple: f64,

    pub exit_rule: String,
}

impl TradeRecord {
    pub fn new(
        symbol: &str,
        date: NaiveDate,
        plan: &EntryPlan,
        result: &TradeResult,
        exit_rule: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            date,
            side: plan.side,
            entry_time: plan.entry_time,
            entry_price: plan.entry_price,
            stop_price: plan.stop_price,
            vwap_at_entry: plan.vwap_at_entry,
            shares: plan.shares,
            or_high: plan.opening_range.high,
            or_low: plan.opening_range.low,
            or_width: plan.opening_range.width(),
            or_width_atr: plan.or_width_atr(),
            base_width: plan.base.width(),
            atr: plan.atr,
            stop_distance: plan.risk_per_share,
            risk_amount: plan.risk_amount(),
            target_r1: plan.target_r1,
            target_r2: plan.target_r2,
            exit_time: result.exit_time,
            exit_price: result.exit_price,
            exit_reason: result.exit_reason,
            scaled_out: result.scaled_out,
            pnl: result.pnl,
            r_multiple: result.r_multiple,
            exit_rule: exit_rule.to_string(),
        }
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.pnl < 0.0
    }
}
