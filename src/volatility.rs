use crate::errors::EvaluationError;
use crate::market_data::Bar;
use log::debug;
use statrs::statistics::Statistics;

/// Per-bar volatility, aligned with the bar series.
///
/// `None` marks warm-up entries that have no meaningful value yet.
pub type VolatilitySeries = Vec<Option<f64>>;

/// Average True Range over a simple moving window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityEstimator {
    atr_length: usize,
}

impl VolatilityEstimator {
    pub fn new(atr_length: usize) -> Result<Self, EvaluationError> {
        if atr_length < 2 {
            return Err(EvaluationError::InvalidConfig(format!(
                "atr_length must be at least 2, got {}",
                atr_length
            )));
        }
        Ok(Self { atr_length })
    }

    pub fn atr_length(&self) -> usize {
        self.atr_length
    }

    /// True range of every bar that has a previous close.
    ///
    /// Entry `k` belongs to bar `k + 1`; bar 0 has no true range.
    pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
        bars.windows(2)
            .map(|w| {
                let prev_close = w[0].close;
                let bar = &w[1];
                (bar.high - bar.low)
                    .max((bar.high - prev_close).abs())
                    .max((bar.low - prev_close).abs())
            })
            .collect()
    }

    /// Mean true range over the trailing `atr_length` bars.
    ///
    /// Index `i` is defined once `atr_length` true ranges end at `i`,
    /// which first happens at `i == atr_length`.
    pub fn estimate(&self, bars: &[Bar]) -> VolatilitySeries {
        let true_ranges = Self::true_ranges(bars);

        let series: VolatilitySeries = (0..bars.len())
            .map(|i| {
                if i < self.atr_length {
                    None
                } else {
                    let window = &true_ranges[i - self.atr_length..i];
                    Some(window.mean())
                }
            })
            .collect();

        debug!(
            "ATR({}) over {} bars: {} defined values",
            self.atr_length,
            bars.len(),
            series.iter().filter(|v| v.is_some()).count()
        );

        series
    }
}
