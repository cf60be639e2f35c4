use crate::config::InstrumentConfig;
use crate::errors::EvaluationError;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One period's price sample (one trading day for the scanner).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: DateTime<Utc>, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            high,
            low,
            close,
        }
    }

    /// Midpoint of the bar's range, (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Ordered daily history for one instrument, oldest bar first.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn validate(&self) -> Result<(), EvaluationError> {
        validate_bars(&self.bars)
    }
}

/// Check that every price is finite and timestamps strictly increase.
///
/// Reports the first offending bar.
pub fn validate_bars(bars: &[Bar]) -> Result<(), EvaluationError> {
    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [("high", bar.high), ("low", bar.low), ("close", bar.close)] {
            if !value.is_finite() {
                return Err(EvaluationError::MalformedBar {
                    index,
                    field,
                    value,
                });
            }
        }

        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(EvaluationError::OutOfOrder { index });
        }
    }
    Ok(())
}

/// Supplier of daily price history, e.g. a TWS connection
pub trait BarSource {
    /// Fetch roughly `days` calendar days of daily bars, oldest first.
    fn fetch_daily_bars(&self, instrument: &InstrumentConfig, days: i32) -> Result<BarSeries>;
}

/// Convert a TWS bar date (time::OffsetDateTime) to chrono UTC.
///
/// Returns None for dates chrono cannot represent.
pub fn to_utc(timestamp: time::OffsetDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(offset: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(offset)
    }

    #[test]
    fn test_midpoint() {
        let bar = Bar::new(day(0), 110.0, 90.0, 95.0);
        assert_eq!(bar.midpoint(), 100.0);
    }

    #[test]
    fn test_validate_accepts_ordered_finite_bars() {
        let series = BarSeries::new(
            "SPY",
            vec![
                Bar::new(day(0), 101.0, 99.0, 100.0),
                Bar::new(day(1), 102.0, 100.0, 101.0),
            ],
        );
        assert!(series.validate().is_ok());
        assert!(!series.is_empty());
        assert_eq!(series.len(), 2);
        assert_eq!(series.last().map(|b| b.close), Some(101.0));
    }

    #[test]
    fn test_validate_rejects_nan_close() {
        let bars = vec![
            Bar::new(day(0), 101.0, 99.0, 100.0),
            Bar::new(day(1), 102.0, 100.0, f64::NAN),
        ];
        match validate_bars(&bars) {
            Err(EvaluationError::MalformedBar { index, field, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "close");
            }
            other => panic!("expected malformed bar, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_infinite_high() {
        let bars = vec![Bar::new(day(0), f64::INFINITY, 99.0, 100.0)];
        assert!(matches!(
            validate_bars(&bars),
            Err(EvaluationError::MalformedBar { index: 0, field: "high", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_timestamp() {
        let bars = vec![
            Bar::new(day(0), 101.0, 99.0, 100.0),
            Bar::new(day(0), 102.0, 100.0, 101.0),
        ];
        assert_eq!(
            validate_bars(&bars),
            Err(EvaluationError::OutOfOrder { index: 1 })
        );
    }

    #[test]
    fn test_to_utc_conversion() {
        let odt = time::OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(to_utc(odt), Some(day(0)));
    }
}
