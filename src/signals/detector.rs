use super::core::Signal;
use crate::market_data::Bar;
use crate::supertrend::{Direction, DirectionalState};

/// Bearish-to-bullish edge detector over a classified bar series
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalDetector;

impl SignalDetector {
    pub fn new() -> Self {
        Self
    }

    /// Check the two most recent bars for a flip.
    pub fn detect(
        &self,
        instrument: &str,
        states: &[DirectionalState],
        bars: &[Bar],
    ) -> Option<Signal> {
        let last = states.len().checked_sub(1)?;
        self.detect_at(instrument, states, bars, last)
    }

    /// Check the pair (`index - 1`, `index`) for a flip.
    ///
    /// Returns the close and timestamp of bar `index` when the earlier state is
    /// `Bearish` and the later one `Bullish`. Out-of-range indices, index 0 and
    /// warm-up states all yield `None`.
    pub fn detect_at(
        &self,
        instrument: &str,
        states: &[DirectionalState],
        bars: &[Bar],
        index: usize,
    ) -> Option<Signal> {
        if index == 0 || index >= states.len() || index >= bars.len() {
            return None;
        }

        match (states[index - 1].direction, states[index].direction) {
            (Direction::Bearish, Direction::Bullish) => {
                let bar = &bars[index];
                Some(Signal::new(instrument, bar.close, bar.timestamp))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn state(direction: Direction) -> DirectionalState {
        match direction {
            Direction::Undefined => DirectionalState::UNDEFINED,
            _ => DirectionalState {
                direction,
                trend_line: Some(100.0),
            },
        }
    }

    fn bars(n: usize) -> Vec<Bar> {
        let start = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        (0..n)
            .map(|i| {
                let close = 100.0 + i as f64;
                Bar::new(start + Duration::days(i as i64), close + 1.0, close - 1.0, close)
            })
            .collect()
    }

    #[test]
    fn test_detects_flip_on_last_pair() {
        let states = vec![
            state(Direction::Bullish),
            state(Direction::Bearish),
            state(Direction::Bullish),
        ];
        let bars = bars(3);
        let signal = SignalDetector::new().detect("GLD", &states, &bars).unwrap();
        assert_eq!(signal.instrument, "GLD");
        assert_eq!(signal.price, 102.0);
        assert_eq!(signal.timestamp, bars[2].timestamp);
    }

    #[test]
    fn test_other_transitions_are_not_signals() {
        let detector = SignalDetector::new();
        let bars = bars(2);
        for (a, b) in [
            (Direction::Bullish, Direction::Bullish),
            (Direction::Bullish, Direction::Bearish),
            (Direction::Bearish, Direction::Bearish),
            (Direction::Undefined, Direction::Bullish),
            (Direction::Undefined, Direction::Undefined),
        ] {
            let states = vec![state(a), state(b)];
            assert!(detector.detect("SLV", &states, &bars).is_none(), "{:?} -> {:?}", a, b);
        }
    }

    #[test]
    fn test_short_series_yields_nothing() {
        let detector = SignalDetector::new();
        assert!(detector.detect("SPY", &[], &[]).is_none());
        assert!(detector.detect("SPY", &[state(Direction::Bullish)], &bars(1)).is_none());
    }

    #[test]
    fn test_detect_at_out_of_range() {
        let states = vec![state(Direction::Bearish), state(Direction::Bullish)];
        let detector = SignalDetector::new();
        assert!(detector.detect_at("QQQ", &states, &bars(2), 0).is_none());
        assert!(detector.detect_at("QQQ", &states, &bars(2), 2).is_none());
        assert!(detector.detect_at("QQQ", &states, &bars(1), 1).is_none());
        assert!(detector.detect_at("QQQ", &states, &bars(2), 1).is_some());
    }
}
