//! Rejection — why a session produced no trade.
//!
//! A rejection is setup absence, not an error. The session contributes
//! nothing and evaluation moves on to the next day.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Opening-range, base or trade window has no bars.
    MissingWindow,
    /// No positive ATR in or after the opening-range window.
    AtrUndefined,
    OrWidthBelowMin,
    OrWidthAboveMax,
    /// Base width too large relative to the opening range.
    BaseTooWide,
    /// Base closes drift too far from VWAP.
    BaseFarFromVwap,
    /// Price never left the opening range during the trade window.
    NoBreakout,
    BreakoutVolumeTooLow,
    /// VWAP undefined at the breakout bar.
    VwapUndefined,
    /// Stop on the wrong side of (or at) the entry price.
    NonPositiveStopDistance,
    /// Risk budget smaller than one share's stop distance.
    ZeroShares,
}

impl Rejection {
    pub const ALL: [Rejection; 11] = [
        Rejection::MissingWindow,
        Rejection::AtrUndefined,
        Rejection::OrWidthBelowMin,
        Rejection::OrWidthAboveMax,
        Rejection::BaseTooWide,
        Rejection::BaseFarFromVwap,
        Rejection::NoBreakout,
        Rejection::BreakoutVolumeTooLow,
        Rejection::VwapUndefined,
        Rejection::NonPositiveStopDistance,
        Rejection::ZeroShares,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::MissingWindow => "missing_window",
            Rejection::AtrUndefined => "atr_undefined",
            Rejection::OrWidthBelowMin => "or_width_below_min",
            Rejection::OrWidthAboveMax => "or_width_above_max",
            Rejection::BaseTooWide => "base_too_wide",
            Rejection::BaseFarFromVwap => "base_far_from_vwap",
            Rejection::NoBreakout => "no_breakout",
            Rejection::BreakoutVolumeTooLow => "breakout_volume_too_low",
            Rejection::VwapUndefined => "vwap_undefined",
            Rejection::NonPositiveStopDistance => "non_positive_stop_distance",
            Rejection::ZeroShares => "zero_shares",
        }
    }

    /// True for rejections raised by a setup gate (as opposed to missing
    /// data or an unbuildable entry).
    pub fn is_gate(self) -> bool {
        matches!(
            self,
            Rejection::OrWidthBelowMin
                | Rejection::OrWidthAboveMax
                | Rejection::BaseTooWide
                | Rejection::BaseFarFromVwap
        )
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
