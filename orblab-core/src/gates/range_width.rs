//! Range-width gate — opening-range width measured in ATR must sit inside
//! `[min, max]`. Each bound is independently disabled.

use crate::domain::Rejection;

use super::{GateVerdict, SetupContext, SetupGate};

#[derive(Debug, Clone, Copy, Default)]
pub struct RangeWidthGate {
    pub min_atr: Option<f64>,
    pub max_atr: Option<f64>,
}

impl RangeWidthGate {
    pub fn new(min_atr: Option<f64>, max_atr: Option<f64>) -> Self {
        Self { min_atr, max_atr }
    }
}

impl SetupGate for RangeWidthGate {
    fn name(&self) -> &str {
        "range_width"
    }

    fn is_enabled(&self) -> bool {
        self.min_atr.is_some() || self.max_atr.is_some()
    }

    fn evaluate(&self, setup: &SetupContext<'_>) -> GateVerdict {
        if !self.is_enabled() {
            return GateVerdict::Passed;
        }
        let width_atr = setup.opening_range.width() / setup.atr;
        if self.min_atr.is_some_and(|min| width_atr < min) {
            return GateVerdict::Rejected(Rejection::OrWidthBelowMin);
        }
        if self.max_atr.is_some_and(|max| width_atr > max) {
            return GateVerdict::Rejected(Rejection::OrWidthAboveMax);
        }
        GateVerdict::Passed
    }
}
