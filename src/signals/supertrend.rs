//! SuperTrend Signal Generator
//!
//! Chains the ATR estimator, the trend classifier and the flip detector for one
//! instrument's history.

use super::core::Signal;
use super::detector::SignalDetector;
use crate::config::SuperTrendConfig;
use crate::errors::EvaluationError;
use crate::market_data::{BarSeries, validate_bars};
use crate::supertrend::{DirectionalState, TrendClassifier};
use crate::volatility::{VolatilityEstimator, VolatilitySeries};
use log::debug;

/// Full per-bar output of one evaluation, for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct SuperTrendAnalysis {
    pub volatility: VolatilitySeries,
    pub states: Vec<DirectionalState>,
    pub signal: Option<Signal>,
}

#[derive(Debug, Clone, Copy)]
pub struct SuperTrendSignalGenerator {
    estimator: VolatilityEstimator,
    classifier: TrendClassifier,
    detector: SignalDetector,
}

impl SuperTrendSignalGenerator {
    pub fn new(config: SuperTrendConfig) -> Result<Self, EvaluationError> {
        Ok(Self {
            estimator: VolatilityEstimator::new(config.atr_length)?,
            classifier: TrendClassifier::new(config.factor, config.polarity)?,
            detector: SignalDetector::new(),
        })
    }

    pub fn atr_length(&self) -> usize {
        self.estimator.atr_length()
    }

    /// Shortest history that can end on a flip: `atr_length` warm-up bars,
    /// the always-bullish first defined bar, then one more to compare.
    pub fn min_bars_for_signal(&self) -> usize {
        self.atr_length() + 2
    }

    /// Evaluate the latest bar of `series` for a buy signal.
    ///
    /// Short histories are `Ok(None)`; malformed or unordered bars are errors.
    pub fn evaluate(&self, series: &BarSeries) -> Result<Option<Signal>, EvaluationError> {
        Ok(self.analyze(series)?.signal)
    }

    pub fn analyze(&self, series: &BarSeries) -> Result<SuperTrendAnalysis, EvaluationError> {
        validate_bars(&series.bars)?;

        let volatility = self.estimator.estimate(&series.bars);
        let states = self.classifier.classify(&series.bars, &volatility)?;
        let signal = self.detector.detect(&series.symbol, &states, &series.bars);

        if states.len() >= 2 {
            debug!(
                "{}: last pair {:?} -> {:?}",
                series.symbol,
                states[states.len() - 2].direction,
                states[states.len() - 1].direction
            );
        } else {
            debug!("{}: only {} bars", series.symbol, series.len());
        }

        Ok(SuperTrendAnalysis {
            volatility,
            states,
            signal,
        })
    }
}
