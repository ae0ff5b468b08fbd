//! Indicators — pure functions of a session's bars.
//!
//! Each indicator produces a `Vec<f64>` the same length as its input, with
//! `f64::NAN` wherever the value is undefined (warmup, zero volume). They are
//! precomputed once per session into `IndicatorValues` and queried by bar
//! index; `IndicatorValues::defined` turns NaN into `None` at the point of use.

pub mod atr;
pub mod ema;
pub mod vwap;

pub use atr::{true_range, Atr};
pub use ema::{previous_bar, Ema};
pub use vwap::Vwap;

use std::collections::HashMap;

use crate::domain::Bar;
use crate::params::OrbParams;

/// Key of the ATR series in a session's `IndicatorValues`.
pub const ATR: &str = "atr";
/// Key of the session VWAP series.
pub const VWAP: &str = "vwap";
/// Key of the fast EMA series.
pub const EMA_FAST: &str = "ema_fast";
/// Key of the slow EMA series.
pub const EMA_SLOW: &str = "ema_slow";

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "atr_14").
    fn name(&self) -> &str;

    /// Number of leading bars with an undefined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Container for precomputed indicator values.
#[derive(Debug, Clone, Default)]
pub struct IndicatorValues {
    series: HashMap<String, Vec<f64>>,
}

impl IndicatorValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a named indicator series.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.series.insert(name.into(), values);
    }

    /// Raw value at a bar index, NaN included.
    pub fn get(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.series
            .get(name)
            .and_then(|v| v.get(bar_index).copied())
    }

    /// Value at a bar index, or `None` if missing, NaN or infinite.
    pub fn defined(&self, name: &str, bar_index: usize) -> Option<f64> {
        self.get(name, bar_index).filter(|v| v.is_finite())
    }

    /// Get the full series for a named indicator.
    pub fn get_series(&self, name: &str) -> Option<&[f64]> {
        self.series.get(name).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Compute every indicator the engine consumes for one session.
///
/// ATR and EMA are computed over the session's own bars; VWAP resets at the
/// session start by construction.
pub fn precompute(bars: &[Bar], params: &OrbParams) -> IndicatorValues {
    let mut iv = IndicatorValues::new();
    iv.insert(ATR, Atr::new(params.atr_length).compute(bars));
    iv.insert(VWAP, Vwap::new().compute(bars));
    iv.insert(EMA_FAST, Ema::new(params.ema_fast).compute(bars));
    iv.insert(EMA_SLOW, Ema::new(params.ema_slow).compute(bars));
    iv
}

/// Create synthetic minute bars from close prices for testing.
///
/// open = prev close (or close for the first bar), high/low = ±0.5 around
/// the body, volume = 1000, starting at 09:30 on 2024-01-02.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(
                start + chrono::Duration::minutes(i as i64),
                open,
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                close,
                1000.0,
            )
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_values_insert_and_get() {
        let mut iv = IndicatorValues::new();
        iv.insert(ATR, vec![f64::NAN, 0.5, 0.6]);
        assert!(iv.get(ATR, 0).unwrap().is_nan());
        assert_eq!(iv.defined(ATR, 0), None);
        assert_eq!(iv.defined(ATR, 1), Some(0.5));
        assert_eq!(iv.get(ATR, 3), None);
        assert_eq!(iv.defined("missing", 0), None);
    }

    #[test]
    fn defined_rejects_infinite() {
        let mut iv = IndicatorValues::new();
        iv.insert(VWAP, vec![f64::INFINITY]);
        assert_eq!(iv.defined(VWAP, 0), None);
    }

    #[test]
    fn precompute_inserts_all_series() {
        let bars = make_bars(&[10.0, 10.2, 10.1, 10.4]);
        let iv = precompute(&bars, &OrbParams::default());
        assert_eq!(iv.len(), 4);
        for key in [ATR, VWAP, EMA_FAST, EMA_SLOW] {
            assert_eq!(iv.get_series(key).unwrap().len(), bars.len());
        }
    }
}
