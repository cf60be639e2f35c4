use crate::config::{InstrumentConfig, SuperTrendConfig};
use crate::market_data::BarSource;
use crate::notifier::Notifier;
use crate::signals::{InstrumentOutcome, Signal, SuperTrendSignalGenerator};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    pub symbol: String,
    pub outcome: InstrumentOutcome,
    /// Some(true) once the notifier accepted the signal; None without a signal
    pub notified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanReport {
    pub started_at: DateTime<Utc>,
    pub instruments: Vec<InstrumentReport>,
}

impl ScanReport {
    pub fn signals(&self) -> Vec<&Signal> {
        self.instruments
            .iter()
            .filter_map(|r| r.outcome.signal())
            .collect()
    }

    pub fn unavailable(&self) -> Vec<&InstrumentReport> {
        self.instruments
            .iter()
            .filter(|r| r.outcome.is_unavailable())
            .collect()
    }

    pub fn failed_notifications(&self) -> usize {
        self.instruments
            .iter()
            .filter(|r| r.notified == Some(false))
            .count()
    }
}

/// Runs the SuperTrend check over a watchlist, one instrument at a time
pub struct Scanner<S, N> {
    source: S,
    notifier: N,
    generator: SuperTrendSignalGenerator,
    instruments: Vec<InstrumentConfig>,
    history_days: i32,
}

impl<S: BarSource, N: Notifier> Scanner<S, N> {
    pub fn new(
        source: S,
        notifier: N,
        supertrend_config: SuperTrendConfig,
        instruments: Vec<InstrumentConfig>,
        history_days: i32,
    ) -> Result<Self> {
        let generator = SuperTrendSignalGenerator::new(supertrend_config)?;
        Ok(Self {
            source,
            notifier,
            generator,
            instruments,
            history_days,
        })
    }

    /// Fetch and evaluate a single instrument. Never fails: problems become
    /// `InstrumentOutcome::Unavailable`.
    pub fn check_instrument(&self, instrument: &InstrumentConfig) -> InstrumentOutcome {
        let series = match self.source.fetch_daily_bars(instrument, self.history_days) {
            Ok(series) => series,
            Err(e) => return InstrumentOutcome::Unavailable(format!("fetch failed: {:#}", e)),
        };

        if series.len() < self.generator.min_bars_for_signal() {
            info!(
                "{}: {} bars, need at least {} for a SuperTrend flip",
                instrument.symbol,
                series.len(),
                self.generator.min_bars_for_signal()
            );
        }

        self.generator.evaluate(&series).into()
    }

    pub fn run_check(&self) -> ScanReport {
        let started_at = Utc::now();
        info!("Checking {} ETFs at {}", self.instruments.len(), started_at);

        let instruments = self
            .instruments
            .iter()
            .map(|instrument| {
                let outcome = self.check_instrument(instrument);
                let notified = match &outcome {
                    InstrumentOutcome::Signal(signal) => {
                        info!("BUY: {} at ${:.2}", signal.instrument, signal.price);
                        match self.notifier.notify(signal) {
                            Ok(()) => Some(true),
                            Err(e) => {
                                error!("Notification for {} failed: {:#}", signal.instrument, e);
                                Some(false)
                            }
                        }
                    }
                    InstrumentOutcome::NoSignal => {
                        info!("No signal: {}", instrument.symbol);
                        None
                    }
                    InstrumentOutcome::Unavailable(reason) => {
                        warn!("{} unavailable: {}", instrument.symbol, reason);
                        None
                    }
                };

                InstrumentReport {
                    symbol: instrument.symbol.clone(),
                    outcome,
                    notified,
                }
            })
            .collect();

        ScanReport {
            started_at,
            instruments,
        }
    }
}
