use etf_supertrend::config::{InstrumentConfig, ScannerConfig};
use etf_supertrend::connection::TwsClient;
use etf_supertrend::market_data::BarSource;
use etf_supertrend::signals::SuperTrendSignalGenerator;

const ROWS: usize = 15;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let Some(symbol) = args.get(1) else {
        println!("usage: check_symbol <SYMBOL> [config.json]");
        return Ok(());
    };
    let config_file = args.get(2).map(String::as_str).unwrap_or("config.json");

    let config = ScannerConfig::load_from_file(config_file)?;
    let instrument = config
        .watchlist_config
        .instruments
        .iter()
        .find(|i| &i.symbol == symbol)
        .cloned()
        .unwrap_or_else(|| InstrumentConfig::new(symbol));

    let client = TwsClient::connect(config.tws_config.clone())?;
    let series = client.fetch_daily_bars(&instrument, config.watchlist_config.history_days)?;
    let generator = SuperTrendSignalGenerator::new(config.supertrend_config)?;
    let analysis = generator.analyze(&series)?;

    println!("{} - last {} of {} daily bars:", symbol, ROWS.min(series.len()), series.len());
    let start = series.len().saturating_sub(ROWS);
    for i in start..series.len() {
        let bar = &series.bars[i];
        let state = &analysis.states[i];
        println!(
            "{}  close={:>10.2}  atr={:>8}  {:<9}  line={}",
            bar.timestamp.format("%Y-%m-%d"),
            bar.close,
            analysis.volatility[i].map_or("-".to_string(), |v| format!("{:.3}", v)),
            format!("{:?}", state.direction),
            state.trend_line.map_or("-".to_string(), |v| format!("{:.2}", v)),
        );
    }

    match analysis.signal {
        Some(signal) => println!("{}", signal),
        None => println!("No signal"),
    }

    Ok(())
}
