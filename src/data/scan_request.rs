use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::analysis::MarketDataProvider;
#[cfg(debug_assertions)]
use crate::config::PRINT_SERDE;
use crate::config::{ConfluenceConfig, DEFAULT_TIMEFRAMES};
use crate::domain::Candle;
use crate::models::IndicatorScores;

fn default_timeframes() -> Vec<String> {
    DEFAULT_TIMEFRAMES.iter().map(|tf| tf.to_string()).collect()
}

/// One timeframe of one symbol: raw candles plus an optional indicator snapshot
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TimeframeInput {
    #[serde(default)]
    pub candles: Vec<Candle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<IndicatorScores>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SymbolInput {
    pub current_price: f64,
    /// Used for any timeframe that has no snapshot of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_scores: Option<IndicatorScores>,
    #[serde(default)]
    pub timeframes: BTreeMap<String, TimeframeInput>,
}

/// Everything a batch scan needs, as a single JSON document
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanRequest {
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<String>,
    pub symbols: BTreeMap<String, SymbolInput>,
}

impl Default for ScanRequest {
    fn default() -> Self {
        Self {
            timeframes: default_timeframes(),
            symbols: BTreeMap::new(),
        }
    }
}

impl ScanRequest {
    pub fn symbol_names(&self) -> Vec<String> {
        self.symbols.keys().cloned().collect()
    }

    fn symbol(&self, symbol: &str) -> Result<&SymbolInput> {
        self.symbols
            .get(symbol)
            .ok_or_else(|| anyhow!("Symbol {} not in scan request", symbol))
    }
}

impl MarketDataProvider for ScanRequest {
    fn candles(&self, symbol: &str, timeframe: &str, count: usize) -> Result<Vec<Candle>> {
        let candles = match self.symbol(symbol)?.timeframes.get(timeframe) {
            Some(input) => &input.candles,
            None => return Ok(Vec::new()),
        };
        let start = candles.len().saturating_sub(count);
        Ok(candles[start..].to_vec())
    }

    fn price(&self, symbol: &str) -> Result<f64> {
        Ok(self.symbol(symbol)?.current_price)
    }

    fn indicator_scores(&self, symbol: &str, timeframe: &str) -> Option<IndicatorScores> {
        let input = self.symbols.get(symbol)?;
        input
            .timeframes
            .get(timeframe)
            .and_then(|tf| tf.scores.clone())
            .or_else(|| input.base_scores.clone())
    }

    fn signature(&self) -> &'static str {
        "Scan Request"
    }
}

pub fn load_scan_request(path: &Path) -> Result<ScanRequest> {
    #[cfg(debug_assertions)]
    let start_time = PRINT_SERDE.then(|| {
        log::info!("Reading scan request from: {:?}...", path);
        std::time::Instant::now()
    });

    let file = File::open(path).context(format!("Failed to open scan request: {:?}", path))?;
    let request: ScanRequest = serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse scan request: {:?}", path))?;

    if request.symbols.is_empty() {
        bail!("Scan request {:?} contains no symbols", path);
    }

    #[cfg(debug_assertions)]
    if let Some(start) = start_time {
        log::info!(
            "Scan request loaded: {} symbols in {:.2}s",
            request.symbols.len(),
            start.elapsed().as_secs_f64()
        );
    }

    Ok(request)
}

pub fn save_scan_request(request: &ScanRequest, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), request)
        .context(format!("Failed to serialize scan request to: {}", path.display()))
}

/// Read a (possibly partial) confluence config; unnamed keys keep their defaults
pub fn load_config(path: &Path) -> Result<ConfluenceConfig> {
    let file = File::open(path).context(format!("Failed to open config file: {:?}", path))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .context(format!("Failed to parse config file: {:?}", path))?;

    #[cfg(debug_assertions)]
    if PRINT_SERDE {
        log::info!("Loaded config overrides from {:?}", path);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUEST_JSON: &str = r#"{
        "timeframes": ["H1", "H4"],
        "symbols": {
            "EURUSD": {
                "current_price": 1.1010,
                "base_scores": {"bullish_score": 55.0, "bearish_score": 45.0},
                "timeframes": {
                    "H1": {
                        "candles": [
                            {"time": 1, "open": 1.1000, "high": 1.1005, "low": 1.0945, "close": 1.0950},
                            {"time": 2, "open": 1.0940, "high": 1.1015, "low": 1.0935, "close": 1.1010}
                        ],
                        "scores": {"long_probability": 61.0, "short_probability": 39.0}
                    }
                }
            }
        }
    }"#;

    #[test]
    fn test_request_as_provider() {
        let request: ScanRequest = serde_json::from_str(REQUEST_JSON).unwrap();
        assert_eq!(request.symbol_names(), vec!["EURUSD".to_string()]);
        assert_eq!(request.price("EURUSD").unwrap(), 1.1010);

        let candles = request.candles("EURUSD", "H1", 1).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].timestamp_ms, 2);
        assert!(request.candles("EURUSD", "D1", 10).unwrap().is_empty());
        assert!(request.candles("GBPUSD", "H1", 10).is_err());
        assert!(request.price("GBPUSD").is_err());

        let h1 = request.indicator_scores("EURUSD", "H1").unwrap();
        assert_eq!(h1.long_probability, Some(61.0));
        // H4 has no snapshot of its own and borrows the symbol's base scores
        let h4 = request.indicator_scores("EURUSD", "H4").unwrap();
        assert_eq!(h4.bullish_score, Some(55.0));
        assert_eq!(request.indicator_scores("GBPUSD", "H1"), None);
    }

    #[test]
    fn test_timeframes_default_when_omitted() {
        let request: ScanRequest =
            serde_json::from_str(r#"{"symbols": {"X": {"current_price": 2.0}}}"#).unwrap();
        assert_eq!(request.timeframes, vec!["M15", "H1", "H4", "D1"]);
        assert!(request.symbols["X"].timeframes.is_empty());
    }

    #[test]
    fn test_save_and_load_from_disk() {
        let request: ScanRequest = serde_json::from_str(REQUEST_JSON).unwrap();
        let path = std::env::temp_dir()
            .join(format!("pattern_scanner_request_{}.json", std::process::id()));
        save_scan_request(&request, &path).unwrap();
        let loaded = load_scan_request(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, request);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_scan_request(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("here.json"));
    }

    #[test]
    fn test_partial_config_file() {
        let path = std::env::temp_dir()
            .join(format!("pattern_scanner_config_{}.json", std::process::id()));
        std::fs::write(&path, r#"{"signal_threshold": 60.0}"#).unwrap();
        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.signal_threshold, 60.0);
        assert_eq!(config.probability_min, 25.0);
    }
}
