use thiserror::Error;

/// Failures that make an instrument's price history unusable for evaluation.
///
/// None of these abort a scan: the scanner records the instrument as
/// unavailable and moves on to the next one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// A price field is NaN or infinite.
    #[error("bar {index} has a non-finite {field} ({value})")]
    MalformedBar {
        index: usize,
        field: &'static str,
        value: f64,
    },

    /// Timestamps must be strictly increasing.
    #[error("bar {index} is not later than the bar before it")]
    OutOfOrder { index: usize },

    /// The volatility series was not computed from the same bars.
    #[error("volatility series has {volatility} entries for {bars} bars")]
    MisalignedSeries { bars: usize, volatility: usize },

    #[error("invalid SuperTrend configuration: {0}")]
    InvalidConfig(String),
}
