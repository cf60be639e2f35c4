use crate::config::{InstrumentConfig, TwsConfig};
use crate::market_data::{Bar, BarSeries, BarSource, to_utc};
use anyhow::{Result, anyhow};
use ibapi::Client;
use ibapi::market_data::historical::{BarSize as HistoricalBarSize, WhatToShow as HistoricalWhatToShow};
use ibapi::prelude::*;
use log::{debug, info};

/// Daily history from a TWS / IB Gateway session
pub struct TwsClient {
    client: Client,
}

impl TwsClient {
    pub fn connect(config: TwsConfig) -> Result<Self> {
        let client = Client::connect(
            &format!("{}:{}", config.host, config.port),
            config.client_id,
        )?;

        info!("Connected to TWS at {}:{}", config.host, config.port);

        Ok(Self { client })
    }
}

pub(crate) fn create_contract(instrument: &InstrumentConfig) -> Contract {
    let mut contract = Contract::stock(&instrument.symbol);
    contract.exchange = instrument.exchange.clone();
    contract.currency = instrument.currency.clone();
    contract
}

impl BarSource for TwsClient {
    fn fetch_daily_bars(&self, instrument: &InstrumentConfig, days: i32) -> Result<BarSeries> {
        let contract = create_contract(instrument);

        let historical = self.client.historical_data(
            &contract,
            None, // end time (None = now)
            days.days(),
            HistoricalBarSize::Day,
            HistoricalWhatToShow::Trades,
            true, // use RTH
        )?;

        let bars = historical
            .bars
            .iter()
            .map(|bar| -> Result<Bar> {
                let timestamp = to_utc(bar.date).ok_or_else(|| {
                    anyhow!("{}: unrepresentable bar date {}", instrument.symbol, bar.date)
                })?;
                Ok(Bar::new(timestamp, bar.high, bar.low, bar.close))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Loaded {} daily bars for {}", bars.len(), instrument.symbol);

        Ok(BarSeries::new(instrument.symbol.clone(), bars))
    }
}
