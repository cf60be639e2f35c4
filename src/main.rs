use etf_supertrend::config::ScannerConfig;
use etf_supertrend::connection::TwsClient;
use etf_supertrend::market_data::BarSource;
use etf_supertrend::notifier::{EmailNotifier, LogNotifier, Notifier};
use etf_supertrend::scanner::{ScanReport, Scanner};

use anyhow::Result;
use log::{error, info, warn};
use std::env;
use std::sync::Arc;
use tokio::time::{Duration, interval};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger with default info level if RUST_LOG not set
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info"); }
    }
    env_logger::init();
    info!("Starting ETF SuperTrend scanner");

    // Get config file from command line argument or use default
    let args: Vec<String> = env::args().collect();
    let config_file = if args.len() > 1 {
        args[1].as_str()
    } else {
        "config.json"
    };

    info!("Loading configuration from: {}", config_file);
    let config = ScannerConfig::load_from_file(config_file)?;

    let notifier: Box<dyn Notifier + Send + Sync> = if config.email_config.is_complete() {
        Box::new(EmailNotifier::new(&config.email_config)?)
    } else {
        warn!("EMAIL / EMAIL_PASSWORD not set, buy signals will only be logged");
        Box::new(LogNotifier)
    };

    let tws_config = config.tws_config.clone();
    let source = tokio::task::spawn_blocking(move || TwsClient::connect(tws_config)).await??;

    let scanner = Arc::new(Scanner::new(
        source,
        notifier,
        config.supertrend_config,
        config.watchlist_config.instruments.clone(),
        config.watchlist_config.history_days,
    )?);

    let Some(period_secs) = config.check_interval_secs() else {
        let report = run_scan(scanner).await?;
        log_summary(&report);
        return Ok(());
    };

    info!("Checking every {} minutes", period_secs / 60);
    let mut check_interval = interval(Duration::from_secs(period_secs));

    loop {
        tokio::select! {
            _ = check_interval.tick() => {
                match run_scan(scanner.clone()).await {
                    Ok(report) => log_summary(&report),
                    Err(e) => error!("Scan aborted: {:#}", e),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// TWS and SMTP calls block, so each scan runs on the blocking pool
async fn run_scan<S, N>(scanner: Arc<Scanner<S, N>>) -> Result<ScanReport>
where
    S: BarSource + Send + Sync + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let report = tokio::task::spawn_blocking(move || scanner.run_check()).await?;
    Ok(report)
}

fn log_summary(report: &ScanReport) {
    let signals = report.signals();
    info!(
        "Scan finished: {} instruments, {} buy signals, {} unavailable",
        report.instruments.len(),
        signals.len(),
        report.unavailable().len()
    );
    for signal in signals {
        info!("  {}", signal);
    }
    if report.failed_notifications() > 0 {
        warn!("{} buy notifications were not delivered", report.failed_notifications());
    }
}
