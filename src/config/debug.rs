//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so normal
//! runs remain quiet.

/// Emit one line per detected pattern occurrence.
pub const PRINT_PATTERN_MATCHES: bool = false;

/// Emit the per-timeframe breakdown after each multi-timeframe aggregation.
pub const PRINT_TIMEFRAME_BREAKDOWN: bool = false;

/// If non-empty, emit detailed scan output only for this symbol.
/// Example: "EURUSD". Use "" to disable.
pub const PRINT_SCAN_FOR_SYMBOL: &str = "";

/// Emit filter decisions made by the opportunity ranker.
pub const PRINT_RANKER_FILTERS: bool = false;

/// Emit file paths and timings when reading/writing scan request and config files.
pub const PRINT_SERDE: bool = false;
