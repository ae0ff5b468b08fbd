//! Opening range and consolidation base measurements.

use serde::{Deserialize, Serialize};

use super::bar::Bar;

/// High/low extremes of the opening-range window. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningRange {
    pub high: f64,
    pub low: f64,
}

impl OpeningRange {
    /// Returns `None` for an empty window.
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let (high, low) = extremes(bars)?;
        Some(Self { high, low })
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// The window immediately after the opening range, used only to judge
/// setup quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationBase {
    pub high: f64,
    pub low: f64,
    /// Mean |close - VWAP| over base bars with a defined VWAP.
    pub mean_vwap_distance: Option<f64>,
}

impl ConsolidationBase {
    /// `vwap` is aligned with `bars`; `None` entries are skipped in the mean.
    pub fn from_bars(bars: &[Bar], vwap: &[Option<f64>]) -> Option<Self> {
        let (high, low) = extremes(bars)?;
        let distances: Vec<f64> = bars
            .iter()
            .zip(vwap)
            .filter_map(|(bar, v)| v.map(|v| (bar.close - v).abs()))
            .collect();
        let mean_vwap_distance = if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / distances.len() as f64)
        };
        Some(Self {
            high,
            low,
            mean_vwap_distance,
        })
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

fn extremes(bars: &[Bar]) -> Option<(f64, f64)> {
    if bars.is_empty() {
        return None;
    }
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    Some((high, low))
}
