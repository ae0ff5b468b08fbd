//! Entry planning — first breakout of the opening range, stop, size, targets.
//!
//! The entry fills exactly at the broken range boundary (a stop-market order
//! resting at the boundary). The stop sits `stop_buffer_atr × ATR` beyond
//! VWAP at the breakout bar. Size is the largest whole share count whose
//! total stop risk fits the risk budget.

use std::ops::Range;

use crate::domain::{Bar, ConsolidationBase, EntryPlan, OpeningRange, Rejection, Side};
use crate::indicators::{IndicatorValues, VWAP};
use crate::params::OrbParams;

/// Inputs the planner needs beyond the bars themselves.
#[derive(Debug, Clone, Copy)]
pub struct EntrySetup<'a> {
    pub opening_range: &'a OpeningRange,
    pub base: &'a ConsolidationBase,
    pub base_span: &'a Range<usize>,
    pub trade_span: &'a Range<usize>,
    /// Reference ATR, always positive.
    pub atr: f64,
}

/// First bar in `span` that trades outside the opening range.
///
/// A bar that exceeds both boundaries is taken as a long breakout.
pub fn find_breakout(
    bars: &[Bar],
    span: &Range<usize>,
    opening_range: &OpeningRange,
) -> Option<(usize, Side)> {
    bars[span.clone()].iter().enumerate().find_map(|(offset, bar)| {
        if bar.high > opening_range.high {
            Some((span.start + offset, Side::Long))
        } else if bar.low < opening_range.low {
            Some((span.start + offset, Side::Short))
        } else {
            None
        }
    })
}

/// Largest whole share count `n` with `n × risk_per_share <= risk_budget`.
pub fn position_size(risk_budget: f64, risk_per_share: f64) -> u64 {
    if !(risk_per_share > 0.0 && risk_budget > 0.0) {
        return 0;
    }
    let mut n = (risk_budget / risk_per_share).floor();
    // Correct the floored quotient for rounding in the division.
    if n * risk_per_share > risk_budget {
        n -= 1.0;
    } else if (n + 1.0) * risk_per_share <= risk_budget {
        n += 1.0;
    }
    if n.is_finite() && n > 0.0 {
        n as u64
    } else {
        0
    }
}

/// Build the entry plan, or name the reason none exists.
pub fn plan_entry(
    bars: &[Bar],
    indicators: &IndicatorValues,
    setup: &EntrySetup<'_>,
    params: &OrbParams,
) -> Result<EntryPlan, Rejection> {
    let (entry_index, side) = find_breakout(bars, setup.trade_span, setup.opening_range)
        .ok_or(Rejection::NoBreakout)?;
    let breakout = &bars[entry_index];

    if let Some(mult) = params.breakout_vol_mult {
        let base_bars = &bars[setup.base_span.clone()];
        let mean_volume =
            base_bars.iter().map(|b| b.volume).sum::<f64>() / base_bars.len() as f64;
        if breakout.volume < mult * mean_volume {
            return Err(Rejection::BreakoutVolumeTooLow);
        }
    }

    let entry_price = match side {
        Side::Long => setup.opening_range.high,
        Side::Short => setup.opening_range.low,
    };

    let vwap = indicators
        .defined(VWAP, entry_index)
        .ok_or(Rejection::VwapUndefined)?;
    let stop_price = vwap - side.sign() * params.stop_buffer_atr * setup.atr;
    let risk_per_share = side.pnl_per_share(stop_price, entry_price);
    if !(risk_per_share > 0.0) {
        return Err(Rejection::NonPositiveStopDistance);
    }

    let shares = position_size(params.risk_dollars, risk_per_share);
    if shares == 0 {
        return Err(Rejection::ZeroShares);
    }

    Ok(EntryPlan {
        side,
        entry_price,
        entry_time: breakout.timestamp,
        entry_index,
        stop_price,
        vwap_at_entry: vwap,
        shares,
        risk_per_share,
        target_r1: entry_price + side.sign() * params.target_r1 * risk_per_share,
        target_r2: entry_price + side.sign() * params.target_r2 * risk_per_share,
        atr: setup.atr,
        opening_range: *setup.opening_range,
        base: *setup.base,
    })
}
