//! EMA trail exit — scale-out through R1, then trail the runner.
//!
//! Once scaled, the runner's stop ratchets to the fast EMA of the previous
//! bar whenever that is tighter than the current stop. The stop never
//! loosens and never moves back past breakeven. R2 still caps the runner.
//! A stop-out after the trail has moved the stop is `TrailingStop`.

use crate::domain::{Bar, EntryPlan, TradeResult};
use crate::indicators::{previous_bar, IndicatorValues, EMA_FAST};

use super::{walk, ExitRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct EmaTrailExit;

impl ExitRule for EmaTrailExit {
    fn name(&self) -> &str {
        "ema_trail"
    }

    fn simulate(
        &self,
        plan: &EntryPlan,
        bars: &[Bar],
        indicators: &IndicatorValues,
        exit_end: usize,
    ) -> TradeResult {
        walk(plan, bars, exit_end, |i| previous_bar(indicators, EMA_FAST, i))
    }
}
