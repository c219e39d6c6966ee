// Pattern detection, confluence scoring and opportunity ranking
pub mod confluence_scorer;
pub mod multi_timeframe;
pub mod opportunity_ranker;
pub mod pattern_detector;
pub mod support_resistance;
pub mod symbol_scan;

// Re-export commonly used types
pub use confluence_scorer::score_timeframe;
pub use multi_timeframe::aggregate;
pub use opportunity_ranker::{
    Direction, DirectionFilter, MarketDataProvider, Opportunity, ScannerFilters, analyze_symbol,
    apply_filters, rank_opportunities, scan_markets,
};
pub use pattern_detector::{detect_patterns, detect_patterns_by_timeframe};
pub use support_resistance::locate_levels;
pub use symbol_scan::{SymbolScan, scan_symbol};
