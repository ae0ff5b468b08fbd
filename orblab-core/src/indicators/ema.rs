//! EMA of closes, seeded with the mean of the first `length` closes.
//!
//! The fast EMA drives the runner trail in `EmaTrailExit`, which only reads
//! the value of the bar before the one being walked (`previous_bar`).

use super::{Indicator, IndicatorValues};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    length: usize,
    name: String,
}

impl Ema {
    /// `length` is validated upstream; 0 is read as 1.
    pub fn new(length: usize) -> Self {
        let length = length.max(1);
        Self {
            length,
            name: format!("ema_{length}"),
        }
    }

    /// Smoothing factor, 2 / (length + 1).
    pub fn alpha(&self) -> f64 {
        2.0 / (self.length as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.length - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut out = vec![f64::NAN; bars.len()];
        let Some(seed_bars) = bars.get(..self.length) else {
            return out;
        };

        let alpha = self.alpha();
        let mut ema = seed_bars.iter().map(|b| b.close).sum::<f64>() / self.length as f64;
        out[self.length - 1] = ema;
        for (slot, bar) in out.iter_mut().zip(bars).skip(self.length) {
            ema += alpha * (bar.close - ema);
            *slot = ema;
        }
        out
    }
}

/// Series `key` at the bar before `i`. `None` on the first bar or in warmup.
pub fn previous_bar(indicators: &IndicatorValues, key: &str, i: usize) -> Option<f64> {
    i.checked_sub(1)
        .and_then(|prev| indicators.defined(key, prev))
}
