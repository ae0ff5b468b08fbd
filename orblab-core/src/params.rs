//! OrbParams — the immutable parameter set for one run.
//!
//! The configuration surface uses "zero disables the gate". Internally every
//! gate threshold is an `Option<f64>`: `None` is disabled, `Some(x)` is
//! enforced. `threshold_from_surface` is the only place the zero convention
//! is interpreted.

use chrono::NaiveTime;
use thiserror::Error;

/// Inclusive wall-clock window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Inclusive at both ends.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Map a surface threshold to its internal form. Zero disables.
pub fn threshold_from_surface(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// Inverse of `threshold_from_surface`.
pub fn threshold_to_surface(threshold: Option<f64>) -> f64 {
    threshold.unwrap_or(0.0)
}

/// Invalid parameter set. Always aborts the run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("{window} window starts at {start} after it ends at {end}")]
    InvertedWindow {
        window: &'static str,
        start: NaiveTime,
        end: NaiveTime,
    },
    #[error("trade window ends at {trade_end}, after the flatten time {flatten}")]
    TradeEndsAfterFlatten {
        trade_end: NaiveTime,
        flatten: NaiveTime,
    },
    #[error("{name} length must be >= 1")]
    ZeroLength { name: &'static str },
    #[error("{name} must be a positive finite number when enabled, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("or_width_min_atr {min} exceeds or_width_max_atr {max}")]
    WidthBandInverted { min: f64, max: f64 },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("target_r2 {r2} is below target_r1 {r1}")]
    TargetsInverted { r1: f64, r2: f64 },
    #[error("stop_buffer_atr must be >= 0 and finite, got {0}")]
    NegativeStopBuffer(f64),
}

/// Every knob the engine reads. Passed by reference, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbParams {
    // ── Windows ──
    pub or_window: TimeWindow,
    pub base_window: TimeWindow,
    pub trade_window: TimeWindow,
    /// No bar after this time participates in the exit walk.
    pub flatten: NaiveTime,

    // ── Indicators ──
    pub atr_length: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,

    // ── Gates (None = disabled) ──
    pub or_width_min_atr: Option<f64>,
    pub or_width_max_atr: Option<f64>,
    pub base_tight_frac: Option<f64>,
    pub base_near_vwap_atr: Option<f64>,
    pub breakout_vol_mult: Option<f64>,

    // ── Risk ──
    pub risk_dollars: f64,
    pub target_r1: f64,
    pub target_r2: f64,
    pub stop_buffer_atr: f64,
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            or_window: TimeWindow::new(hm(9, 30), hm(9, 35)),
            base_window: TimeWindow::new(hm(9, 35), hm(9, 45)),
            trade_window: TimeWindow::new(hm(9, 45), hm(15, 30)),
            flatten: hm(15, 55),
            atr_length: 14,
            ema_fast: 9,
            ema_slow: 20,
            or_width_min_atr: None,
            or_width_max_atr: None,
            base_tight_frac: Some(1.5),
            base_near_vwap_atr: Some(2.0),
            breakout_vol_mult: None,
            risk_dollars: 250.0,
            target_r1: 2.0,
            target_r2: 3.0,
            stop_buffer_atr: 1.0,
        }
    }
}

impl OrbParams {
    /// Same parameters with every gate disabled.
    pub fn without_gates(mut self) -> Self {
        self.or_width_min_atr = None;
        self.or_width_max_atr = None;
        self.base_tight_frac = None;
        self.base_near_vwap_atr = None;
        self.breakout_vol_mult = None;
        self
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        for (window, w) in [
            ("opening range", self.or_window),
            ("base", self.base_window),
            ("trade", self.trade_window),
        ] {
            if w.start > w.end {
                return Err(ParamsError::InvertedWindow {
                    window,
                    start: w.start,
                    end: w.end,
                });
            }
        }
        if self.trade_window.end > self.flatten {
            return Err(ParamsError::TradeEndsAfterFlatten {
                trade_end: self.trade_window.end,
                flatten: self.flatten,
            });
        }

        for (name, len) in [
            ("atr", self.atr_length),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
        ] {
            if len == 0 {
                return Err(ParamsError::ZeroLength { name });
            }
        }

        for (name, threshold) in [
            ("or_width_min_atr", self.or_width_min_atr),
            ("or_width_max_atr", self.or_width_max_atr),
            ("base_tight_frac", self.base_tight_frac),
            ("base_near_vwap_atr", self.base_near_vwap_atr),
            ("breakout_vol_mult", self.breakout_vol_mult),
        ] {
            if let Some(value) = threshold {
                if !(value.is_finite() && value > 0.0) {
                    return Err(ParamsError::InvalidThreshold { name, value });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.or_width_min_atr, self.or_width_max_atr) {
            if min > max {
                return Err(ParamsError::WidthBandInverted { min, max });
            }
        }

        for (name, value) in [
            ("risk_dollars", self.risk_dollars),
            ("target_r1", self.target_r1),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ParamsError::NonPositive { name, value });
            }
        }
        if !self.target_r2.is_finite() || self.target_r2 < self.target_r1 {
            return Err(ParamsError::TargetsInverted {
                r1: self.target_r1,
                r2: self.target_r2,
            });
        }
        if !(self.stop_buffer_atr.is_finite() && self.stop_buffer_atr >= 0.0) {
            return Err(ParamsError::NegativeStopBuffer(self.stop_buffer_atr));
        }
        Ok(())
    }
}
