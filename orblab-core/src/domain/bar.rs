//! Bar — the fundamental market data unit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One fixed-duration OHLCV observation for a single symbol.
///
/// Timestamps are exchange-local wall-clock time; session windows are
/// matched against `timestamp.time()` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Malformed bar history. Always a hard failure, never "no trade".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {index} at {timestamp}: non-finite OHLCV value")]
    NonFinite {
        index: usize,
        timestamp: NaiveDateTime,
    },
    #[error("bar {index} at {timestamp}: high {high} below low {low}")]
    Inverted {
        index: usize,
        timestamp: NaiveDateTime,
        high: f64,
        low: f64,
    },
    #[error("bar {index} at {timestamp}: negative volume {volume}")]
    NegativeVolume {
        index: usize,
        timestamp: NaiveDateTime,
        volume: f64,
    },
    #[error("bar {index} at {timestamp} is not after previous bar at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
}

impl Bar {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calendar date of the bar (session key).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Wall-clock time of day.
    pub fn time(&self) -> NaiveTime {
        self.timestamp.time()
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// (high + low + close) / 3, the VWAP input price.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns true if any OHLCV field is NaN or infinite.
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite())
    }
}

/// Validate a full bar history before any evaluation.
///
/// Bars must be finite, have `high >= low`, non-negative volume, and strictly
/// increasing timestamps. Gaps are allowed; they simply shrink windows.
pub fn validate_history(bars: &[Bar]) -> Result<(), BarError> {
    for (index, bar) in bars.iter().enumerate() {
        if bar.is_void() {
            return Err(BarError::NonFinite {
                index,
                timestamp: bar.timestamp,
            });
        }
        if bar.high < bar.low {
            return Err(BarError::Inverted {
                index,
                timestamp: bar.timestamp,
                high: bar.high,
                low: bar.low,
            });
        }
        if bar.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                index,
                timestamp: bar.timestamp,
                volume: bar.volume,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].timestamp;
            if bar.timestamp <= previous {
                return Err(BarError::OutOfOrder {
                    index,
                    timestamp: bar.timestamp,
                    previous,
                });
            }
        }
    }
    Ok(())
}
