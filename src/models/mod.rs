// Domain models for pattern confluence analysis
// These modules contain pure data, independent of I/O and rendering

pub mod confluence;
pub mod levels;
pub mod scores;
pub mod timeseries;

// Re-export key types for convenience
pub use confluence::{
    Bias, ConfluenceResult, PatternCounts, Signal, SignalDecision, StrengthCounts,
    TimeframeBreakdown, decide_signal,
};
pub use levels::LevelSet;
pub use scores::{IndicatorScores, TimeframeScore, resolve_score};
pub use timeseries::{CandleSeries, TimeframeStatus};
