//! Session — one calendar day of bars.

use chrono::NaiveDate;

use super::bar::Bar;

/// A single trading day's time-ordered bars, keyed by calendar date.
///
/// Owned transiently for one evaluation. Sessions never share state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub date: NaiveDate,
    pub bars: Vec<Bar>,
}

impl Session {
    pub fn new(date: NaiveDate, bars: Vec<Bar>) -> Self {
        Self { date, bars }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Partition a time-ordered history into per-day sessions, chronologically.
///
/// Assumes the history has passed `validate_history`; bars are grouped by
/// consecutive runs of the same calendar date.
pub fn split_sessions(bars: &[Bar]) -> Vec<Session> {
    let mut sessions: Vec<Session> = Vec::new();
    for bar in bars {
        match sessions.last_mut() {
            Some(current) if current.date == bar.date() => current.bars.push(bar.clone()),
            _ => sessions.push(Session::new(bar.date(), vec![bar.clone()])),
        }
    }
    sessions
}
