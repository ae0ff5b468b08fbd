//! Session engine — evaluate one trading day end to end.
//!
//! The pipeline for a session runs strictly downward:
//!
//! 1. Windows: split the day into opening-range, base and trade spans
//! 2. Indicators: ATR, VWAP and EMAs over the day's bars
//! 3. Reference ATR: last defined ATR in the opening range, else the first
//!    one after it; it must be positive
//! 4. Gates: range width, base tightness, base proximity to VWAP
//! 5. Entry: first breakout, stop, size, targets
//! 6. Exit: the configured exit rule walks to a deterministic close
//!
//! Any step that cannot produce its output ends the session with a
//! `Rejection`. Sessions share no state, so evaluation order never changes
//! the outcome of a day.

pub mod runner;

pub use runner::{DayOutcome, SessionRunner};

use std::ops::Range;

use crate::domain::{ConsolidationBase, OpeningRange, Rejection, Session, TradeRecord};
use crate::entry::{plan_entry, EntrySetup};
use crate::exit::ExitRule;
use crate::gates::{GateChain, GateVerdict, SetupContext};
use crate::indicators::{precompute, IndicatorValues, ATR, VWAP};
use crate::params::{OrbParams, ParamsError};
use crate::session::SessionWindows;

/// What one session produced.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Traded(Box<TradeRecord>),
    NoTrade(Rejection),
}

impl SessionOutcome {
    pub fn trade(&self) -> Option<&TradeRecord> {
        match self {
            SessionOutcome::Traded(record) => Some(&**record),
            SessionOutcome::NoTrade(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            SessionOutcome::Traded(_) => None,
            SessionOutcome::NoTrade(reason) => Some(*reason),
        }
    }
}

/// Reference ATR for a session: the last defined ATR inside the opening
/// range, else the first defined ATR after it.
///
/// The chosen value must be positive. A zero ATR is not skipped in favor of
/// another bar; it leaves the session without a reference.
pub fn reference_atr(indicators: &IndicatorValues, or_span: &Range<usize>) -> Option<f64> {
    let defined = |i: usize| indicators.defined(ATR, i);
    let len = indicators.get_series(ATR).map_or(0, |s| s.len());
    or_span
        .clone()
        .rev()
        .find_map(defined)
        .or_else(|| (or_span.end..len).find_map(defined))
        .filter(|atr| *atr > 0.0)
}

/// Validated parameters, gate chain and exit rule for a run.
pub struct OrbEngine {
    params: OrbParams,
    gates: GateChain,
    exit_rule: Box<dyn ExitRule>,
}

impl OrbEngine {
    /// Build an engine with the standard gate chain for `params`.
    pub fn new(params: OrbParams, exit_rule: Box<dyn ExitRule>) -> Result<Self, ParamsError> {
        let gates = GateChain::from_params(&params);
        Self::with_gates(params, gates, exit_rule)
    }

    /// Build an engine with a caller-supplied gate chain.
    pub fn with_gates(
        params: OrbParams,
        gates: GateChain,
        exit_rule: Box<dyn ExitRule>,
    ) -> Result<Self, ParamsError> {
        params.validate()?;
        Ok(Self {
            params,
            gates,
            exit_rule,
        })
    }

    pub fn params(&self) -> &OrbParams {
        &self.params
    }

    pub fn exit_rule_name(&self) -> &str {
        self.exit_rule.name()
    }

    /// Evaluate one session. Never fails: setup absence is a `NoTrade`.
    pub fn evaluate(&self, symbol: &str, session: &Session) -> SessionOutcome {
        match self.try_trade(symbol, session) {
            Ok(record) => {
                tracing::debug!(
                    %symbol,
                    date = %session.date,
                    side = record.side.as_str(),
                    shares = record.shares,
                    exit = record.exit_reason.as_str(),
                    pnl = record.pnl,
                    "session traded"
                );
                SessionOutcome::Traded(Box::new(record))
            }
            Err(reason) => {
                tracing::debug!(%symbol, date = %session.date, %reason, "no trade");
                SessionOutcome::NoTrade(reason)
            }
        }
    }

    fn try_trade(&self, symbol: &str, session: &Session) -> Result<TradeRecord, Rejection> {
        let bars = &session.bars;
        let params = &self.params;

        let windows = SessionWindows::partition(bars, params).ok_or(Rejection::MissingWindow)?;
        let indicators = precompute(bars, params);
        let atr = reference_atr(&indicators, &windows.opening_range)
            .ok_or(Rejection::AtrUndefined)?;

        let opening_range = OpeningRange::from_bars(&bars[windows.opening_range.clone()])
            .ok_or(Rejection::MissingWindow)?;
        let base_vwap: Vec<Option<f64>> = windows
            .base
            .clone()
            .map(|i| indicators.defined(VWAP, i))
            .collect();
        let base = ConsolidationBase::from_bars(&bars[windows.base.clone()], &base_vwap)
            .ok_or(Rejection::MissingWindow)?;

        let setup = SetupContext {
            opening_range: &opening_range,
            base: &base,
            atr,
        };
        if let GateVerdict::Rejected(reason) = self.gates.evaluate(&setup) {
            return Err(reason);
        }

        let plan = plan_entry(
            bars,
            &indicators,
            &EntrySetup {
                opening_range: &opening_range,
                base: &base,
                base_span: &windows.base,
                trade_span: &windows.trade,
                atr,
            },
            params,
        )?;

        let result = self
            .exit_rule
            .simulate(&plan, bars, &indicators, windows.exit_end);
        Ok(TradeRecord::new(
            symbol,
            session.date,
            &plan,
            &result,
            self.exit_rule.name(),
        ))
    }
}

impl std::fmt::Debug for OrbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrbEngine")
            .field("params", &self.params)
            .field("gates", &self.gates)
            .field("exit_rule", &self.exit_rule.name())
            .finish()
    }
}
