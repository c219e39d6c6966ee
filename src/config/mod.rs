//! Configuration module for the pattern scanner.

pub mod analysis;
pub mod confluence;

mod debug; // Private: use crate::config::PRINT_* rather than crate::config::debug::PRINT_*
pub use debug::{
    PRINT_PATTERN_MATCHES, PRINT_RANKER_FILTERS, PRINT_SCAN_FOR_SYMBOL, PRINT_SERDE,
    PRINT_TIMEFRAME_BREAKDOWN,
};

// Re-export commonly used items
pub use analysis::{ANALYSIS, DEFAULT_TIMEFRAMES, RANGE_EPSILON};
pub use confluence::{ConfluenceConfig, TierBoost, TimeframeWeight};
