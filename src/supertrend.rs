//! SuperTrend direction classifier
//!
//! Walks the bar series once, carrying the previous bar's direction forward,
//! and emits one immutable [`DirectionalState`] per bar.

use crate::errors::EvaluationError;
use crate::market_data::Bar;
use crate::volatility::VolatilitySeries;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
    /// Not enough history for a volatility estimate yet
    Undefined,
}

/// Which side of the band flips the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// Bearish stays bearish only while close breaks above the upper band;
    /// bullish stays bullish only while close breaks below the lower band.
    /// The trend line rides the lower band when bearish.
    #[default]
    Inherited,
    /// Textbook SuperTrend: bearish turns bullish on a close above the upper
    /// band, bullish turns bearish on a close below the lower band. The trend
    /// line rides the lower band when bullish.
    Conventional,
}

/// Volatility-scaled envelope around the bar midpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub lower: f64,
    pub midpoint: f64,
    pub upper: f64,
}

impl Bands {
    pub fn new(bar: &Bar, volatility: f64, factor: f64) -> Self {
        let midpoint = bar.midpoint();
        let offset = factor * volatility;
        Self {
            lower: midpoint - offset,
            midpoint,
            upper: midpoint + offset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalState {
    pub direction: Direction,
    pub trend_line: Option<f64>,
}

impl DirectionalState {
    pub const UNDEFINED: DirectionalState = DirectionalState {
        direction: Direction::Undefined,
        trend_line: None,
    };

    pub fn is_defined(&self) -> bool {
        self.direction != Direction::Undefined
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendClassifier {
    factor: f64,
    polarity: Polarity,
}

impl TrendClassifier {
    pub fn new(factor: f64, polarity: Polarity) -> Result<Self, EvaluationError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(EvaluationError::InvalidConfig(format!(
                "factor must be a positive number, got {}",
                factor
            )));
        }
        Ok(Self { factor, polarity })
    }

    /// Classify every bar. The output is aligned 1:1 with `bars`.
    ///
    /// Bars without a volatility value are `Undefined`. The first bar with one
    /// always starts `Bullish`.
    pub fn classify(
        &self,
        bars: &[Bar],
        volatility: &VolatilitySeries,
    ) -> Result<Vec<DirectionalState>, EvaluationError> {
        if bars.len() != volatility.len() {
            return Err(EvaluationError::MisalignedSeries {
                bars: bars.len(),
                volatility: volatility.len(),
            });
        }

        let states: Vec<DirectionalState> = bars
            .iter()
            .zip(volatility.iter())
            .scan(Direction::Undefined, |previous, (bar, vol)| {
                let state = match vol {
                    Some(vol) => self.step(*previous, bar, *vol),
                    None => DirectionalState::UNDEFINED,
                };
                *previous = state.direction;
                Some(state)
            })
            .collect();

        if let Some(last) = states.last() {
            debug!(
                "Classified {} bars, last direction {:?} trend line {:?}",
                states.len(),
                last.direction,
                last.trend_line
            );
        }

        Ok(states)
    }

    /// One step of the recurrence from the previous bar's direction.
    pub fn step(&self, previous: Direction, bar: &Bar, volatility: f64) -> DirectionalState {
        let bands = Bands::new(bar, volatility, self.factor);

        let direction = match (self.polarity, previous) {
            (_, Direction::Undefined) => Direction::Bullish,
            (Polarity::Inherited, Direction::Bearish) => {
                if bar.close > bands.upper {
                    Direction::Bearish
                } else {
                    Direction::Bullish
                }
            }
            (Polarity::Inherited, Direction::Bullish) => {
                if bar.close < bands.lower {
                    Direction::Bullish
                } else {
                    Direction::Bearish
                }
            }
            (Polarity::Conventional, Direction::Bearish) => {
                if bar.close > bands.upper {
                    Direction::Bullish
                } else {
                    Direction::Bearish
                }
            }
            (Polarity::Conventional, Direction::Bullish) => {
                if bar.close < bands.lower {
                    Direction::Bearish
                } else {
                    Direction::Bullish
                }
            }
        };

        let trend_line = match (self.polarity, direction) {
            (Polarity::Inherited, Direction::Bearish) => bands.lower,
            (Polarity::Inherited, _) => bands.upper,
            (Polarity::Conventional, Direction::Bullish) => bands.lower,
            (Polarity::Conventional, _) => bands.upper,
        };

        DirectionalState {
            direction,
            trend_line: Some(trend_line),
        }
    }
}
