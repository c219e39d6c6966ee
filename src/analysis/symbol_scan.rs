use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::pattern_detector::detect_patterns_by_timeframe;
use crate::analysis::support_resistance::locate_levels;
use crate::config::{ConfluenceConfig, PRINT_SCAN_FOR_SYMBOL};
use crate::domain::PatternOccurrence;
use crate::models::{Bias, CandleSeries, LevelSet, PatternCounts, TimeframeStatus};

/// Everything detected for one symbol across its requested timeframes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolScan {
    pub symbol: String,
    pub current_price: f64,
    pub timeframes: Vec<String>,
    pub patterns: BTreeMap<String, Vec<PatternOccurrence>>,
    /// Only timeframes with usable data get an entry
    pub levels: BTreeMap<String, LevelSet>,
    pub timeframe_status: BTreeMap<String, TimeframeStatus>,
    pub pattern_counts: PatternCounts,
    pub overall_bias: Bias,
}

impl SymbolScan {
    /// Timeframes whose data was usable
    pub fn ok_timeframes(&self) -> impl Iterator<Item = &str> {
        self.timeframe_status
            .iter()
            .filter(|(_, status)| status.is_ok())
            .map(|(tf, _)| tf.as_str())
    }
}

/// Detect patterns and levels per requested timeframe.
///
/// A timeframe that is missing or shorter than `config.min_candles_required` is marked with a
/// status and contributes an empty pattern list and no levels; it never fails the scan.
pub fn scan_symbol(
    symbol: &str,
    frames: &BTreeMap<String, CandleSeries>,
    timeframes: &[String],
    current_price: f64,
    config: &ConfluenceConfig,
) -> SymbolScan {
    let mut levels = BTreeMap::new();
    let mut timeframe_status = BTreeMap::new();
    let mut usable = BTreeMap::new();

    for tf in timeframes {
        let status = frames
            .get(tf)
            .map(|series| series.status(config.min_candles_required))
            .unwrap_or(TimeframeStatus::MissingData);

        match frames.get(tf) {
            Some(series) if status.is_ok() => {
                if !series.is_clean() {
                    log::warn!("{} {}: unordered or malformed candles", symbol, tf);
                }
                levels.insert(
                    tf.clone(),
                    locate_levels(
                        &series.candles,
                        config.level_window,
                        config.max_levels,
                        current_price,
                    ),
                );
                usable.insert(tf.clone(), series.clone());
            }
            _ => log::warn!("{} {}: skipped ({})", symbol, tf, status.detail()),
        }

        timeframe_status.insert(tf.clone(), status);
    }

    // Skipped timeframes are absent from `usable` and come back with an empty list
    let patterns = detect_patterns_by_timeframe(&usable, timeframes, config.lookback);

    let pattern_counts = PatternCounts::from_occurrences(patterns.values().flatten());
    let overall_bias = pattern_counts.overall_bias();

    if !PRINT_SCAN_FOR_SYMBOL.is_empty() && PRINT_SCAN_FOR_SYMBOL == symbol {
        for (tf, found) in &patterns {
            log::info!(
                "{} {}: {} patterns [{}]",
                symbol,
                tf,
                found.len(),
                found
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        log::info!("{}: overall bias {}", symbol, overall_bias);
    }

    SymbolScan {
        symbol: symbol.to_string(),
        current_price,
        timeframes: timeframes.to_vec(),
        patterns,
        levels,
        timeframe_status,
        pattern_counts,
        overall_bias,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, PatternKind};

    /// Alternating up/down bars; the final bar is a bullish engulfing of the one before
    fn frame(tf: &str, len: usize) -> CandleSeries {
        let mut candles: Vec<Candle> = (0..len)
            .map(|i| {
                let base = 1.1000 + (i % 5) as f64 * 0.0010;
                if i % 2 == 0 {
                    Candle::new(i as i64 * 60_000, base, base + 0.0008, base - 0.0012, base - 0.0004)
                } else {
                    Candle::new(i as i64 * 60_000, base - 0.0004, base + 0.0008, base - 0.0012, base)
                }
            })
            .collect();
        if len >= 2 {
            let ts = candles[len - 1].timestamp_ms;
            candles[len - 2] = Candle::new(ts - 60_000, 1.1000, 1.1005, 1.0945, 1.0950);
            candles[len - 1] = Candle::new(ts, 1.0940, 1.1015, 1.0935, 1.1010);
        }
        CandleSeries::new(tf, candles)
    }

    #[test]
    fn test_statuses_and_empty_frames() {
        let config = ConfluenceConfig::default();
        let mut frames = BTreeMap::new();
        frames.insert("H1".to_string(), frame("H1", 60));
        frames.insert("H4".to_string(), frame("H4", 20));
        let timeframes: Vec<String> = ["M15", "H1", "H4"].iter().map(|s| s.to_string()).collect();

        let scan = scan_symbol("EURUSD", &frames, &timeframes, 1.1010, &config);

        assert_eq!(scan.timeframe_status["M15"], TimeframeStatus::MissingData);
        assert_eq!(scan.timeframe_status["H1"], TimeframeStatus::Ok { candles: 60 });
        assert_eq!(
            scan.timeframe_status["H4"],
            TimeframeStatus::InsufficientData {
                received: 20,
                required: 50
            }
        );
        assert!(scan.patterns["M15"].is_empty());
        assert!(scan.patterns["H4"].is_empty());
        assert!(
            scan.patterns["H1"]
                .iter()
                .any(|p| p.kind == PatternKind::BullishEngulfing && p.index == 59)
        );
        assert_eq!(scan.levels.keys().collect::<Vec<_>>(), vec!["H1"]);
        assert_eq!(scan.ok_timeframes().collect::<Vec<_>>(), vec!["H1"]);
    }

    #[test]
    fn test_counts_and_overall_bias() {
        let config = ConfluenceConfig::default();
        let mut frames = BTreeMap::new();
        frames.insert("H1".to_string(), frame("H1", 60));
        let timeframes = vec!["H1".to_string()];
        let scan = scan_symbol("EURUSD", &frames, &timeframes, 1.1010, &config);

        let flattened: Vec<&PatternOccurrence> = scan.patterns.values().flatten().collect();
        assert_eq!(scan.pattern_counts.total, flattened.len());
        assert_eq!(scan.overall_bias, scan.pattern_counts.overall_bias());
    }

    #[test]
    fn test_no_data_is_neutral() {
        let config = ConfluenceConfig::default();
        let timeframes = vec!["D1".to_string()];
        let scan = scan_symbol("XAUUSD", &BTreeMap::new(), &timeframes, 2000.0, &config);
        assert_eq!(scan.overall_bias, Bias::Neutral);
        assert_eq!(scan.pattern_counts.total, 0);
        assert!(scan.levels.is_empty());
    }
}
