//! Base-proximity-to-VWAP gate — mean |close - VWAP| over the base window,
//! in ATR units, must not exceed `max_atr`.
//!
//! Base bars with undefined VWAP are skipped when the mean is measured. A
//! base with no defined VWAP at all cannot be judged and is rejected.

use crate::domain::Rejection;

use super::{GateVerdict, SetupContext, SetupGate};

#[derive(Debug, Clone, Copy, Default)]
pub struct VwapProximityGate {
    pub max_atr: Option<f64>,
}

impl VwapProximityGate {
    pub fn new(max_atr: Option<f64>) -> Self {
        Self { max_atr }
    }
}

impl SetupGate for VwapProximityGate {
    fn name(&self) -> &str {
        "vwap_proximity"
    }

    fn is_enabled(&self) -> bool {
        self.max_atr.is_some()
    }

    fn evaluate(&self, setup: &SetupContext<'_>) -> GateVerdict {
        let Some(max_atr) = self.max_atr else {
            return GateVerdict::Passed;
        };
        match setup.base.mean_vwap_distance {
            Some(distance) if distance / setup.atr <= max_atr => GateVerdict::Passed,
            _ => GateVerdict::Rejected(Rejection::BaseFarFromVwap),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::sample_setup;

    fn verdict(gate: VwapProximityGate, distance: Option<f64>, atr: f64) -> GateVerdict {
        let (or, base) = sample_setup((100.5, 100.0), (100.4, 100.1), distance);
        gate.evaluate(&SetupContext {
            opening_range: &or,
            base: &base,
            atr,
        })
    }

    #[test]
    fn near_vwap_passes() {
        let gate = VwapProximityGate::new(Some(2.0));
        assert_eq!(verdict(gate, Some(0.4), 0.25), GateVerdict::Passed); // 1.6 ATR
        assert_eq!(verdict(gate, Some(0.5), 0.25), GateVerdict::Passed); // 2.0 ATR
    }

    #[test]
    fn far_from_vwap_rejected() {
        let gate = VwapProximityGate::new(Some(2.0));
        assert_eq!(
            verdict(gate, Some(0.6), 0.25),
            GateVerdict::Rejected(Rejection::BaseFarFromVwap)
        );
    }

    #[test]
    fn undefined_vwap_rejected_when_enabled() {
        let gate = VwapProximityGate::new(Some(2.0));
        assert_eq!(
            verdict(gate, None, 0.25),
            GateVerdict::Rejected(Rejection::BaseFarFromVwap)
        );
    }

    #[test]
    fn disabled_passes_undefined_vwap() {
        let gate = VwapProximityGate::new(None);
        assert_eq!(verdict(gate, None, 0.25), GateVerdict::Passed);
    }
}
