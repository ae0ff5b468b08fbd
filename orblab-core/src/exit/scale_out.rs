//! Scale-out exit — half at R1 with the stop moved to breakeven, the rest at
//! R2, the initial or breakeven stop, or the end-of-day flatten.

use crate::domain::{Bar, EntryPlan, TradeResult};
use crate::indicators::IndicatorValues;

use super::{walk, ExitRule};

#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleOutExit;

impl ExitRule for ScaleOutExit {
    fn name(&self) -> &str {
        "scale_out"
    }

    fn simulate(
        &self,
        plan: &EntryPlan,
        bars: &[Bar],
        _indicators: &IndicatorValues,
        exit_end: usize,
    ) -> TradeResult {
        walk(plan, bars, exit_end, |_| None)
    }
}
