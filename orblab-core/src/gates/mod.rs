//! Setup gates — reject a session before any entry is computed.
//!
//! Gates run in a fixed order (range width, base tightness, base proximity
//! to VWAP) and the first rejection short-circuits the rest. A gate built
//! with a `None` threshold returns `Passed` without inspecting the setup.

pub mod base_tightness;
pub mod range_width;
pub mod vwap_proximity;

pub use base_tightness::BaseTightnessGate;
pub use range_width::RangeWidthGate;
pub use vwap_proximity::VwapProximityGate;

use crate::domain::{ConsolidationBase, OpeningRange, Rejection};
use crate::params::OrbParams;

/// Everything a gate may look at.
#[derive(Debug, Clone, Copy)]
pub struct SetupContext<'a> {
    pub opening_range: &'a OpeningRange,
    pub base: &'a ConsolidationBase,
    /// Reference ATR, always positive.
    pub atr: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    Passed,
    Rejected(Rejection),
}

impl GateVerdict {
    pub fn is_passed(self) -> bool {
        matches!(self, GateVerdict::Passed)
    }
}

/// Trait for setup gates.
///
/// Gates judge setup quality only. They never see the trade window.
pub trait SetupGate: Send + Sync {
    /// Human-readable name (e.g., "range_width").
    fn name(&self) -> &str;

    /// False when the gate's threshold is disabled.
    fn is_enabled(&self) -> bool;

    fn evaluate(&self, setup: &SetupContext<'_>) -> GateVerdict;
}

/// The ordered gate sequence for a run.
pub struct GateChain {
    gates: Vec<Box<dyn SetupGate>>,
}

impl GateChain {
    pub fn new(gates: Vec<Box<dyn SetupGate>>) -> Self {
        Self { gates }
    }

    /// Build the standard three gates from the run parameters.
    pub fn from_params(params: &OrbParams) -> Self {
        Self::new(vec![
            Box::new(RangeWidthGate::new(
                params.or_width_min_atr,
                params.or_width_max_atr,
            )),
            Box::new(BaseTightnessGate::new(params.base_tight_frac)),
            Box::new(VwapProximityGate::new(params.base_near_vwap_atr)),
        ])
    }

    /// First rejection wins; later gates are not evaluated.
    pub fn evaluate(&self, setup: &SetupContext<'_>) -> GateVerdict {
        for gate in &self.gates {
            if !gate.is_enabled() {
                continue;
            }
            if let GateVerdict::Rejected(reason) = gate.evaluate(setup) {
                tracing::trace!(gate = gate.name(), %reason, "gate rejected setup");
                return GateVerdict::Rejected(reason);
            }
        }
        GateVerdict::Passed
    }

    pub fn names(&self) -> Vec<&str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl std::fmt::Debug for GateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateChain")
            .field("gates", &self.names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn sample_setup(
    or: (f64, f64),
    base: (f64, f64),
    vwap_distance: Option<f64>,
) -> (OpeningRange, ConsolidationBase) {
    (
        OpeningRange {
            high: or.0,
            low: or.1,
        },
        ConsolidationBase {
            high: base.0,
            low: base.1,
            mean_vwap_distance: vwap_distance,
        },
    )
}
