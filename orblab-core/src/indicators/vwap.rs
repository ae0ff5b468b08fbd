//! Session Volume-Weighted Average Price (VWAP).
//!
//! VWAP[t] = Σ typical_price × volume / Σ volume over bars 0..=t, where
//! typical_price = (high + low + close) / 3. Cumulative sums restart
//! whenever the calendar date changes, so a multi-day slice never leaks
//! volume across a day boundary. Zero cumulative volume yields NaN.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct Vwap;

impl Vwap {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for Vwap {
    fn name(&self) -> &str {
        "vwap"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;
        let mut day = None;

        for bar in bars {
            if day != Some(bar.date()) {
                day = Some(bar.date());
                cum_pv = 0.0;
                cum_vol = 0.0;
            }
            cum_pv += bar.typical_price() * bar.volume;
            cum_vol += bar.volume;
            result.push(if cum_vol > 0.0 {
                cum_pv / cum_vol
            } else {
                f64::NAN
            });
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};
    use chrono::NaiveDate;

    fn bar(day: u32, m: u32, high: f64, low: f64, close: f64, volume: f64) -> Bar {
        let ts = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(9, m, 0)
            .unwrap();
        Bar::new(ts, close, high, low, close, volume)
    }

    #[test]
    fn cumulative_weighted_typical_price() {
        let bars = vec![
            bar(2, 30, 11.0, 9.0, 10.0, 100.0),  // tp 10
            bar(2, 31, 13.0, 11.0, 12.0, 300.0), // tp 12
        ];
        let v = Vwap::new().compute(&bars);
        assert_approx(v[0], 10.0, DEFAULT_EPSILON);
        assert_approx(v[1], (10.0 * 100.0 + 12.0 * 300.0) / 400.0, DEFAULT_EPSILON);
    }

    #[test]
    fn resets_at_day_boundary() {
        let bars = vec![
            bar(2, 30, 11.0, 9.0, 10.0, 100.0),
            bar(3, 30, 21.0, 19.0, 20.0, 100.0),
        ];
        let v = Vwap::new().compute(&bars);
        assert_approx(v[1], 20.0, DEFAULT_EPSILON);
    }

    #[test]
    fn zero_volume_is_undefined_until_volume_arrives() {
        let bars = vec![
            bar(2, 30, 11.0, 9.0, 10.0, 0.0),
            bar(2, 31, 13.0, 11.0, 12.0, 50.0),
        ];
        let v = Vwap::new().compute(&bars);
        assert!(v[0].is_nan());
        assert_approx(v[1], 12.0, DEFAULT_EPSILON);
    }
}
