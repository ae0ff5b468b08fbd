//! SessionRunner — chronological, sequential evaluation of a bar history.

use chrono::NaiveDate;

use crate::domain::{split_sessions, validate_history, Bar, BarError, Session};

use super::{OrbEngine, SessionOutcome};

/// One calendar day's outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub outcome: SessionOutcome,
}

/// Drives an `OrbEngine` over every day of a history, oldest first.
#[derive(Debug)]
pub struct SessionRunner {
    engine: OrbEngine,
}

impl SessionRunner {
    pub fn new(engine: OrbEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &OrbEngine {
        &self.engine
    }

    /// Validate the history, split it into days and evaluate each day.
    ///
    /// Malformed bars abort the run; days without a setup do not.
    pub fn run(&self, symbol: &str, bars: &[Bar]) -> Result<Vec<DayOutcome>, BarError> {
        validate_history(bars)?;
        let sessions = split_sessions(bars);
        Ok(self.run_sessions(symbol, &sessions))
    }

    /// Evaluate already-split sessions in the order given.
    pub fn run_sessions(&self, symbol: &str, sessions: &[Session]) -> Vec<DayOutcome> {
        sessions
            .iter()
            .map(|session| DayOutcome {
                date: session.date,
                outcome: self.engine.evaluate(symbol, session),
            })
            .collect()
    }
}
