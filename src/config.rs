use crate::supertrend::Polarity;
use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;

pub const EMAIL_ENV: &str = "EMAIL";
pub const EMAIL_PASSWORD_ENV: &str = "EMAIL_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub tws_config: TwsConfig,
    #[serde(default)]
    pub supertrend_config: SuperTrendConfig,
    pub watchlist_config: WatchlistConfig,
    #[serde(default)]
    pub email_config: EmailConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwsConfig {
    pub host: String,
    pub port: u16,
    pub client_id: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuperTrendConfig {
    #[serde(default = "default_atr_length")]
    pub atr_length: usize,
    #[serde(default = "default_factor")]
    pub factor: f64,
    #[serde(default)]
    pub polarity: Polarity,
}

impl Default for SuperTrendConfig {
    fn default() -> Self {
        Self {
            atr_length: default_atr_length(),
            factor: default_factor(),
            polarity: Polarity::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistConfig {
    pub instruments: Vec<InstrumentConfig>,
    #[serde(default = "default_history_days")]
    pub history_days: i32,
    /// Run a single pass when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_minutes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub symbol: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl InstrumentConfig {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            exchange: default_exchange(),
            currency: default_currency(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Sender and recipient
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            address: None,
            password: None,
        }
    }
}

impl EmailConfig {
    /// Take the address and password from `EMAIL` / `EMAIL_PASSWORD` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(address) = env::var(EMAIL_ENV) {
            self.address = Some(address);
        }
        if let Ok(password) = env::var(EMAIL_PASSWORD_ENV) {
            self.password = Some(password);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.address.is_some() && self.password.is_some()
    }
}

fn default_atr_length() -> usize {
    10
}

fn default_factor() -> f64 {
    3.0
}

fn default_history_days() -> i32 {
    90 // ~3 months of daily bars
}

fn default_exchange() -> String {
    "SMART".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

const DEFAULT_SYMBOLS: [&str; 13] = [
    "XLI", "XLK", "XLY", "XLP", "XLF", "XLV", "XLC", "XLE", "XLB", "SPY", "QQQ", "SLV", "GLD",
];

impl ScannerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let mut config: ScannerConfig = match fs::read_to_string(path) {
            Ok(config_str) => serde_json::from_str(&config_str)?,
            Err(e) => {
                warn!("Could not read {}: {}. Using built-in defaults.", path, e);
                Self::default()
            }
        };

        config.email_config.apply_env_overrides();
        config.validate()?;

        info!(
            "Watching {} instruments with SuperTrend({}, {}) {:?}",
            config.watchlist_config.instruments.len(),
            config.supertrend_config.atr_length,
            config.supertrend_config.factor,
            config.supertrend_config.polarity
        );

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let st = &self.supertrend_config;
        if st.atr_length < 2 {
            return Err(anyhow!("atr_length must be at least 2, got {}", st.atr_length));
        }
        if !st.factor.is_finite() || st.factor <= 0.0 {
            return Err(anyhow!("factor must be positive, got {}", st.factor));
        }
        if self.watchlist_config.instruments.is_empty() {
            return Err(anyhow!("watchlist has no instruments"));
        }
        if self.watchlist_config.history_days <= 0 {
            return Err(anyhow!(
                "history_days must be positive, got {}",
                self.watchlist_config.history_days
            ));
        }
        if let Some(minutes) = self.watchlist_config.check_interval_minutes {
            if minutes == 0 {
                return Err(anyhow!("check_interval_minutes must be at least 1"));
            }
            if minutes.checked_mul(60).is_none() {
                return Err(anyhow!("check_interval_minutes is too large: {}", minutes));
            }
        }
        Ok(())
    }

    /// Scan period, or None for a single pass. Only meaningful after `validate`.
    pub fn check_interval_secs(&self) -> Option<u64> {
        self.watchlist_config
            .check_interval_minutes
            .and_then(|minutes| minutes.checked_mul(60))
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            tws_config: TwsConfig {
                host: "127.0.0.1".to_string(),
                port: 7497,
                client_id: 1,
            },
            supertrend_config: SuperTrendConfig::default(),
            watchlist_config: WatchlistConfig {
                instruments: DEFAULT_SYMBOLS.iter().map(|s| InstrumentConfig::new(s)).collect(),
                history_days: default_history_days(),
                check_interval_minutes: None,
            },
            email_config: EmailConfig::default(),
        }
    }
}
