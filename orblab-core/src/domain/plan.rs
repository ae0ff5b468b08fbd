//! EntryPlan — the planned trade for a session that passed every gate.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::range::{ConsolidationBase, OpeningRange};

/// Direction of the breakout trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short. Multiplies a price move into P&L per share.
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    /// Per-share P&L of moving from `entry` to `exit`.
    pub fn pnl_per_share(self, entry: f64, exit: f64) -> f64 {
        self.sign() * (exit - entry)
    }

    /// The bar extreme that works against the position (low for long).
    pub fn adverse_extreme(self, high: f64, low: f64) -> f64 {
        match self {
            Side::Long => low,
            Side::Short => high,
        }
    }

    /// The bar extreme that works for the position (high for long).
    pub fn favorable_extreme(self, high: f64, low: f64) -> f64 {
        match self {
            Side::Long => high,
            Side::Short => low,
        }
    }

    /// True if `price` has reached `level` in the adverse direction.
    pub fn reached_adverse(self, price: f64, level: f64) -> bool {
        match self {
            Side::Long => price <= level,
            Side::Short => price >= level,
        }
    }

    /// True if `price` has reached `level` in the favorable direction.
    pub fn reached_favorable(self, price: f64, level: f64) -> bool {
        match self {
            Side::Long => price >= level,
            Side::Short => price <= level,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Long => "LONG",
            Side::Short => "SHORT",
        }
    }
}

/// Output of the entry planner.
///
/// # Invariants
/// - `shares > 0`
/// - `risk_per_share > 0` (the signed distance from entry to stop)
/// - `shares * risk_per_share <= risk budget`, and `shares` is the largest
///   integer satisfying it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPlan {
    pub side: Side,
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
    /// Index of the breakout bar within the session's bars.
    pub entry_index: usize,
    pub stop_price: f64,
    pub vwap_at_entry: f64,
    pub shares: u64,
    pub risk_per_share: f64,
    pub target_r1: f64,
    pub target_r2: f64,
    pub atr: f64,
    pub opening_range: OpeningRange,
    pub base: ConsolidationBase,
}

impl EntryPlan {
    /// Total planned risk: shares × per-share stop distance.
    pub fn risk_amount(&self) -> f64 {
        self.shares as f64 * self.risk_per_share
    }

    /// Opening-range width expressed in ATR units.
    pub fn or_width_atr(&self) -> f64 {
        self.opening_range.width() / self.atr
    }

    /// Shares closed at the first target. Floor of half the position.
    pub fn first_scale_shares(&self) -> u64 {
        self.shares / 2
    }

    /// Shares carried to the second target: the rest of the position.
    pub fn runner_shares(&self) -> u64 {
        self.shares - self.first_scale_shares()
    }
}
