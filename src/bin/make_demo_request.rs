use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use pattern_scanner::config::{ANALYSIS, DEFAULT_TIMEFRAMES};
use pattern_scanner::data::{ScanRequest, SymbolInput, TimeframeInput, save_scan_request};
use pattern_scanner::domain::Candle;
use pattern_scanner::models::IndicatorScores;
use pattern_scanner::utils::TimeUtils;

const DEFAULT_OUTPUT: &str = "demo/scan_request.json";
// 2024-01-01 00:00 UTC
const SERIES_END_MS: i64 = 1_704_067_200_000;

/// (symbol, anchor price, drift per bar as a fraction of price, long/short snapshot)
const DEMO_SYMBOLS: &[(&str, f64, f64, (f64, f64))] = &[
    ("EURUSD", 1.0950, 0.00004, (64.0, 38.0)),
    ("GBPUSD", 1.2700, -0.00005, (36.0, 66.0)),
    ("USDJPY", 148.50, 0.0, (50.0, 50.0)),
    ("XAUUSD", 2050.0, 0.00008, (58.0, 44.0)),
];

fn main() -> Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let request = build_demo_request()?;
    save_scan_request(&request, &output)
        .with_context(|| format!("Failed to write demo request {:?}", output))?;

    println!(
        "Demo scan request written to {:?} with {} symbols.",
        output,
        request.symbols.len()
    );
    Ok(())
}

fn build_demo_request() -> Result<ScanRequest> {
    let count = ANALYSIS.scanner.candles_per_timeframe;
    let mut symbols = BTreeMap::new();

    for (seed, &(symbol, anchor, drift, (long, short))) in DEMO_SYMBOLS.iter().enumerate() {
        let mut timeframes = BTreeMap::new();
        for tf in DEFAULT_TIMEFRAMES {
            let interval_ms = TimeUtils::timeframe_to_ms(tf)
                .with_context(|| format!("No duration known for timeframe {}", tf))?;
            let candles = synthetic_candles(anchor, drift, seed as f64, interval_ms, count);
            timeframes.insert(
                tf.to_string(),
                TimeframeInput {
                    candles,
                    scores: Some(demo_scores(long, short)),
                },
            );
        }

        let current_price = timeframes
            .get("M15")
            .and_then(|tf| tf.candles.last())
            .map(|c| c.close_price)
            .unwrap_or(anchor);

        symbols.insert(
            symbol.to_string(),
            SymbolInput {
                current_price,
                base_scores: None,
                timeframes,
            },
        );
    }

    Ok(ScanRequest {
        timeframes: DEFAULT_TIMEFRAMES.iter().map(|tf| tf.to_string()).collect(),
        symbols,
    })
}

fn demo_scores(long: f64, short: f64) -> IndicatorScores {
    let trend = match long.partial_cmp(&short) {
        Some(std::cmp::Ordering::Greater) => "bullish",
        Some(std::cmp::Ordering::Less) => "bearish",
        _ => "neutral",
    };
    IndicatorScores {
        trend_bias: Some(trend.to_string()),
        volatility_regime: Some("normal".to_string()),
        ..IndicatorScores::modern(long, short)
    }
}

/// Drifting sine wave with a faster ripple on top; no randomness so reruns are identical
fn synthetic_candles(
    anchor: f64,
    drift: f64,
    phase: f64,
    interval_ms: i64,
    count: usize,
) -> Vec<Candle> {
    let amplitude = anchor * 0.004;
    let price_at = |i: f64| {
        anchor * (1.0 + drift * i)
            + amplitude * (i / 9.0 + phase).sin()
            + amplitude * 0.3 * (i / 2.3 + phase * 2.0).sin()
    };

    (0..count)
        .map(|i| {
            let open = price_at(i as f64);
            let close = price_at(i as f64 + 1.0);
            let wick = amplitude * (0.15 + 0.1 * (i as f64 * 0.7 + phase).cos().abs());
            let timestamp_ms = SERIES_END_MS - (count - 1 - i) as i64 * interval_ms;
            Candle::new(
                timestamp_ms,
                open,
                open.max(close) + wick,
                open.min(close) - wick * 0.8,
                close,
            )
        })
        .collect()
}
