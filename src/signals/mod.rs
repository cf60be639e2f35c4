//! Signal Generation Module
//!
//! Turns an instrument's daily bars into at most one buy signal: ATR volatility,
//! SuperTrend direction, then bearish-to-bullish flip detection on the latest bar.

pub mod core;
pub mod detector;
pub mod supertrend;

pub use self::core::{InstrumentOutcome, Signal};
pub use detector::SignalDetector;
pub use supertrend::SuperTrendSignalGenerator;
