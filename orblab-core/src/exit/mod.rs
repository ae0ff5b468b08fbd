//! Exit rules — walk the session from the entry bar to a deterministic exit.
//!
//! Both rules share one state machine:
//!
//! ```text
//! FULL ──stop──────────────▶ CLOSED (StopLoss)
//!  │
//!  └─R1: close half, stop → entry
//!        ▼
//! SCALED ──stop────────────▶ CLOSED (StopLoss / TrailingStop)
//!    └────R2───────────────▶ CLOSED (TargetR2)
//! last bar ≤ flatten ──────▶ CLOSED (EodFlatten)
//! ```
//!
//! Within one bar the stop is always checked before any target. Bars carry no
//! intrabar path, so this is a fixed pessimistic tie-break. After an R1
//! scale-out the R2 check still runs on that same bar; the breakeven stop is
//! first tested on the next bar. A bar after the entry bar that opens through
//! the stop fills at its open, never at a price outside the bar.

pub mod ema_trail;
pub mod scale_out;

pub use ema_trail::EmaTrailExit;
pub use scale_out::ScaleOutExit;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{Bar, EntryPlan, ExitReason, TradeResult};
use crate::indicators::IndicatorValues;

/// Trait for exit rules.
pub trait ExitRule: Send + Sync {
    /// Human-readable name (e.g., "scale_out").
    fn name(&self) -> &str;

    /// Simulate the trade over `bars[plan.entry_index..exit_end]`.
    ///
    /// `exit_end` is exclusive and must be greater than `plan.entry_index`.
    fn simulate(
        &self,
        plan: &EntryPlan,
        bars: &[Bar],
        indicators: &IndicatorValues,
        exit_end: usize,
    ) -> TradeResult;
}

/// Selectable exit rule, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitRuleKind {
    #[default]
    ScaleOut,
    EmaTrail,
}

impl ExitRuleKind {
    pub fn build(self) -> Box<dyn ExitRule> {
        match self {
            ExitRuleKind::ScaleOut => Box::new(ScaleOutExit),
            ExitRuleKind::EmaTrail => Box::new(EmaTrailExit),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExitRuleKind::ScaleOut => "scale_out",
            ExitRuleKind::EmaTrail => "ema_trail",
        }
    }
}

/// Fill bookkeeping for one open trade.
struct OpenTrade<'a> {
    plan: &'a EntryPlan,
    open_shares: u64,
    realized: f64,
    scaled_shares: u64,
    scaled: bool,
}

impl<'a> OpenTrade<'a> {
    fn new(plan: &'a EntryPlan) -> Self {
        Self {
            plan,
            open_shares: plan.shares,
            realized: 0.0,
            scaled_shares: 0,
            scaled: false,
        }
    }

    /// Close half the original size at R1.
    fn scale_out(&mut self) {
        self.scaled_shares = self.plan.first_scale_shares();
        self.realized += self.scaled_shares as f64
            * self
                .plan
                .side
                .pnl_per_share(self.plan.entry_price, self.plan.target_r1);
        self.open_shares = self.plan.runner_shares();
        self.scaled = true;
    }

    /// Close every remaining share at `price`.
    fn close(self, price: f64, time: NaiveDateTime, reason: ExitReason) -> TradeResult {
        let pnl = self.realized
            + self.open_shares as f64 * self.plan.side.pnl_per_share(self.plan.entry_price, price);
        TradeResult {
            exit_price: price,
            exit_time: time,
            exit_reason: reason,
            pnl,
            r_multiple: pnl / self.plan.risk_amount(),
            scaled_out: self.scaled,
            scaled_shares: self.scaled_shares,
        }
    }
}

/// Shared walk. `trail_level(i)` proposes a runner stop for bar `i` once the
/// position is scaled; proposals that would loosen the stop are ignored.
///
/// A stop fills at its level, or at the bar's open when a later bar opens
/// through it (a breakeven or trailed stop can sit past the previous close).
/// The entry bar opens before the entry, so it always fills at the level.
pub(crate) fn walk<F>(plan: &EntryPlan, bars: &[Bar], exit_end: usize, trail_level: F) -> TradeResult
where
    F: Fn(usize) -> Option<f64>,
{
    let side = plan.side;
    let exit_end = exit_end.min(bars.len()).max(plan.entry_index + 1);

    let mut trade = OpenTrade::new(plan);
    let mut stop = plan.stop_price;
    let mut stop_reason = ExitReason::StopLoss;

    for (i, bar) in bars
        .iter()
        .enumerate()
        .take(exit_end)
        .skip(plan.entry_index)
    {
        if trade.scaled {
            if let Some(level) = trail_level(i) {
                if side.reached_favorable(level, stop) && level != stop {
                    stop = level;
                    stop_reason = ExitReason::TrailingStop;
                }
            }
        }

        if side.reached_adverse(side.adverse_extreme(bar.high, bar.low), stop) {
            // Gap-through: a bar that opens past the stop fills at its open.
            let fill = if i > plan.entry_index && side.reached_adverse(bar.open, stop) {
                bar.open
            } else {
                stop
            };
            return trade.close(fill, bar.timestamp, stop_reason);
        }

        let favorable = side.favorable_extreme(bar.high, bar.low);
        if !trade.scaled && side.reached_favorable(favorable, plan.target_r1) {
            trade.scale_out();
            stop = plan.entry_price;
        }

        if trade.scaled && side.reached_favorable(favorable, plan.target_r2) {
            return trade.close(plan.target_r2, bar.timestamp, ExitReason::TargetR2);
        }
    }

    let last = &bars[exit_end - 1];
    trade.close(last.close, last.timestamp, ExitReason::EodFlatten)
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn kind_builds_named_rule() {
        assert_eq!(ExitRuleKind::ScaleOut.build().name(), "scale_out");
        assert_eq!(ExitRuleKind::EmaTrail.build().name(), "ema_trail");
        assert_eq!(ExitRuleKind::default(), ExitRuleKind::ScaleOut);
    }

    #[test]
    fn kind_parses_snake_case() {
        let kind: ExitRuleKind = serde_json::from_str("\"ema_trail\"").unwrap();
        assert_eq!(kind, ExitRuleKind::EmaTrail);
    }

    #[test]
    fn walk_without_trail_never_reports_trailing_stop() {
        let bars = vec![
            bar(0, 100.6, 100.4, 100.5),
            bar(1, 102.1, 100.6, 102.0), // R1
            bar(2, 101.0, 100.4, 100.6), // breakeven stop
        ];
        let r = walk(&long_plan(), &bars, bars.len(), |_| None);
        assert_eq!(r.exit_reason, ExitReason::StopLoss);
        assert_approx(r.exit_price, 100.5, 1e-12);
    }

    #[test]
    fn breakeven_gap_through_fills_at_open() {
        let bars = vec![
            bar(0, 100.6, 100.4, 100.5),
            bar(1, 102.1, 100.2, 100.3), // R1, closes below entry
            bar(2, 100.4, 100.0, 100.1), // opens under breakeven
        ];
        let r = walk(&long_plan(), &bars, bars.len(), |_| None);
        assert_eq!(r.exit_reason, ExitReason::StopLoss);
        assert_approx(r.exit_price, 100.1, 1e-12);
        assert_approx(r.pnl, 161.0 * 1.55 - 161.0 * 0.4, 1e-6);
    }

    #[test]
    fn entry_bar_stop_fills_at_level() {
        // Entry-bar open precedes the fill at the range boundary.
        let bars = vec![Bar::new(
            bar(0, 0.0, 0.0, 0.0).timestamp,
            99.5,
            100.6,
            99.4,
            100.0,
            1000.0,
        )];
        let r = walk(&long_plan(), &bars, bars.len(), |_| None);
        assert_eq!(r.exit_reason, ExitReason::StopLoss);
        assert_approx(r.exit_price, 99.725, 1e-12);
        assert_approx(r.r_multiple, -1.0, 1e-9);
    }

    #[test]
    fn walk_clamps_exit_end() {
        let bars = vec![bar(0, 100.6, 100.4, 100.55)];
        let r = walk(&long_plan(), &bars, 10, |_| None);
        assert_eq!(r.exit_reason, ExitReason::EodFlatten);
        assert_approx(r.exit_price, 100.55, 1e-12);
    }
}
