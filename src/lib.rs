#![allow(clippy::collapsible_if)]
#![allow(clippy::type_complexity)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod models;
pub mod utils;

use std::path::PathBuf;

// Re-export commonly used types
pub use analysis::{
    Direction, DirectionFilter, MarketDataProvider, Opportunity, ScannerFilters, aggregate,
    detect_patterns, scan_markets, score_timeframe,
};
pub use config::ConfluenceConfig;
pub use data::{ScanRequest, load_config, load_scan_request};
pub use domain::{Candle, PatternOccurrence};
pub use models::{ConfluenceResult, LevelSet, Signal};

// CLI argument parsing
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scan request JSON (symbols, candles and optional indicator scores)
    #[arg(long)]
    pub request: PathBuf,

    /// Partial ConfluenceConfig JSON; unnamed keys keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Drop opportunities below this probability
    #[arg(long, default_value_t = config::ANALYSIS.scanner.min_probability)]
    pub min_probability: f64,

    /// LONG, SHORT or BOTH
    #[arg(long, default_value_t = DirectionFilter::Both)]
    pub direction: DirectionFilter,

    #[arg(long, default_value_t = config::ANALYSIS.scanner.max_results)]
    pub max_results: usize,

    /// Minimum structure-based reward/risk (opportunities without one count as 0)
    #[arg(long)]
    pub risk_reward_min: Option<f64>,

    /// Only scan these symbols (default: every symbol in the request)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Pretty-print the JSON report
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

impl Cli {
    pub fn filters(&self) -> ScannerFilters {
        ScannerFilters {
            min_probability: self.min_probability,
            direction: self.direction,
            risk_reward_min: self.risk_reward_min,
            symbols: (!self.symbols.is_empty()).then(|| self.symbols.clone()),
            max_results: self.max_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds_filters() {
        let cli = Cli::parse_from([
            "pattern-scanner",
            "--request",
            "req.json",
            "--direction",
            "short",
            "--min-probability",
            "55",
            "--symbols",
            "EURUSD,GBPUSD",
        ]);
        let filters = cli.filters();
        assert_eq!(filters.direction, DirectionFilter::Short);
        assert_eq!(filters.min_probability, 55.0);
        assert_eq!(filters.max_results, 5);
        assert_eq!(
            filters.symbols,
            Some(vec!["EURUSD".to_string(), "GBPUSD".to_string()])
        );
        assert_eq!(filters.risk_reward_min, None);
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["pattern-scanner", "--request", "req.json"]);
        assert_eq!(cli.filters(), ScannerFilters::default());
        assert!(!cli.pretty);
    }
}
