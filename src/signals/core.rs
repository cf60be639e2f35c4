//! Core signal data shared by the detector, the scanner and the notifier

use crate::errors::EvaluationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Buy signal: the instrument's trend flipped from bearish to bullish on its
/// latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub instrument: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn new(instrument: impl Into<String>, price: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            instrument: instrument.into(),
            price,
            timestamp,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BUY Signal: {} at ${:.2} - {}",
            self.instrument, self.price, self.timestamp
        )
    }
}

/// Result of evaluating one instrument during a scan
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentOutcome {
    Signal(Signal),
    NoSignal,
    /// History could not be fetched or could not be evaluated
    Unavailable(String),
}

impl InstrumentOutcome {
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            InstrumentOutcome::Signal(signal) => Some(signal),
            _ => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, InstrumentOutcome::Unavailable(_))
    }
}

impl From<Result<Option<Signal>, EvaluationError>> for InstrumentOutcome {
    fn from(result: Result<Option<Signal>, EvaluationError>) -> Self {
        match result {
            Ok(Some(signal)) => InstrumentOutcome::Signal(signal),
            Ok(None) => InstrumentOutcome::NoSignal,
            Err(e) => InstrumentOutcome::Unavailable(e.to_string()),
        }
    }
}
