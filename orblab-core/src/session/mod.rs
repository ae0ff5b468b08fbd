//! Session windowing — partition one day's bars by wall-clock time.
//!
//! Bars are time-ordered, so each window's members form a contiguous index
//! span. Spans are half-open `Range<usize>` into the session's bar slice.

use std::ops::Range;

use crate::domain::Bar;
use crate::params::{OrbParams, TimeWindow};

/// Index spans of the three named windows plus the exit horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindows {
    pub opening_range: Range<usize>,
    pub base: Range<usize>,
    pub trade: Range<usize>,
    /// Exclusive end of the exit walk: one past the last bar at or before
    /// the flatten time.
    pub exit_end: usize,
}

impl SessionWindows {
    /// Returns `None` when any of the three windows is empty.
    pub fn partition(bars: &[Bar], params: &OrbParams) -> Option<Self> {
        let opening_range = span(bars, &params.or_window)?;
        let base = span(bars, &params.base_window)?;
        let trade = span(bars, &params.trade_window)?;
        let exit_end = bars
            .iter()
            .rposition(|b| b.time() <= params.flatten)
            .map_or(0, |i| i + 1);
        Some(Self {
            opening_range,
            base,
            trade,
            exit_end,
        })
    }
}

/// Contiguous span of bars whose time-of-day falls in `window`.
fn span(bars: &[Bar], window: &TimeWindow) -> Option<Range<usize>> {
    let start = bars.iter().position(|b| window.contains(b.time()))?;
    let len = bars[start..]
        .iter()
        .take_while(|b| window.contains(b.time()))
        .count();
    Some(start..start + len)
}
