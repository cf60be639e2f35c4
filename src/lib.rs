pub mod config;
pub mod connection;
pub mod errors;
pub mod market_data;
pub mod notifier;
pub mod scanner;
pub mod signals;
pub mod supertrend;
pub mod volatility;
