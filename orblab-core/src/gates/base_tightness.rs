//! Base-tightness gate — the consolidation base must be narrow relative to
//! the opening range: `base_width / or_width <= max_frac`.

use crate::domain::Rejection;

use super::{GateVerdict, SetupContext, SetupGate};

#[derive(Debug, Clone, Copy, Default)]
pub struct BaseTightnessGate {
    pub max_frac: Option<f64>,
}

impl BaseTightnessGate {
    pub fn new(max_frac: Option<f64>) -> Self {
        Self { max_frac }
    }
}

impl SetupGate for BaseTightnessGate {
    fn name(&self) -> &str {
        "base_tightness"
    }

    fn is_enabled(&self) -> bool {
        self.max_frac.is_some()
    }

    fn evaluate(&self, setup: &SetupContext<'_>) -> GateVerdict {
        let Some(max_frac) = self.max_frac else {
            return GateVerdict::Passed;
        };
        let or_width = setup.opening_range.width();
        // A flat opening range makes the ratio unbounded.
        if or_width <= 0.0 {
            return GateVerdict::Rejected(Rejection::BaseTooWide);
        }
        if setup.base.width() / or_width > max_frac {
            GateVerdict::Rejected(Rejection::BaseTooWide)
        } else {
            GateVerdict::Passed
        }
    }
}
