use anyhow::{Context, Result};
use clap::Parser;

use pattern_scanner::config::ConfluenceConfig;
use pattern_scanner::utils::time_utils::epoch_ms_to_utc;
use pattern_scanner::{Cli, MarketDataProvider, load_config, load_scan_request, scan_markets};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Load inputs
    let request = load_scan_request(&args.request)?;
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConfluenceConfig::default(),
    };

    let symbols = request.symbol_names();
    if let Some(first_tf) = request.timeframes.first() {
        for symbol in &symbols {
            let last = request
                .candles(symbol, first_tf, 1)
                .ok()
                .and_then(|c| c.last().copied());
            if let Some(last) = last {
                log::info!(
                    "{}: price {} (last {} bar at {} UTC)",
                    symbol,
                    request.price(symbol).unwrap_or_default(),
                    first_tf,
                    epoch_ms_to_utc(last.timestamp_ms)
                );
            }
        }
    }

    // D. Scan
    let opportunities = scan_markets(
        &request,
        &symbols,
        &args.filters(),
        &request.timeframes,
        &config,
    );
    log::info!(
        "{} of {} symbols passed the filters",
        opportunities.len(),
        symbols.len()
    );

    // E. Report
    let report = if args.pretty {
        serde_json::to_string_pretty(&opportunities)
    } else {
        serde_json::to_string(&opportunities)
    }
    .context("Failed to serialize opportunities")?;
    println!("{}", report);

    Ok(())
}
