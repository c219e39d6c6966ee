//! Analysis and scoring configuration (compile-time defaults)

/// Settings for the candlestick pattern detector
pub struct DetectionSettings {
    // Number of most-recent candles examined per timeframe
    pub lookback: usize,
    // Below this many candles a timeframe is marked insufficient and skipped
    pub min_candles_required: usize,
    // Floor for high - low so ratio tests never divide by zero
    pub range_epsilon: f64,
}

/// Settings for the support/resistance locator
pub struct LevelSettings {
    // Trailing window (in candles) searched for swing highs/lows
    pub window: usize,
    // Maximum number of resistance and support levels kept
    pub max_levels: usize,
    // Fractional distance counted as "at" a level (0.002 = 0.2%)
    pub proximity_threshold: f64,
}

/// Probability bounds and the signal decision threshold
pub struct ProbabilitySettings {
    pub min: f64,
    pub max: f64,
    // A side must be strictly above this to produce LONG/SHORT
    pub signal_threshold: f64,
    // Used when an indicator score carries neither modern nor legacy keys
    pub neutral_score: f64,
}

/// Cap and per-pattern boost for one strength tier
#[derive(Debug, Clone, Copy)]
pub struct TierBoostSettings {
    pub cap: f64,
    pub per_pattern: f64,
}

pub struct BoostSettings {
    pub very_strong: TierBoostSettings,
    pub strong: TierBoostSettings,
    pub medium: TierBoostSettings,
    // Added once per timeframe when a strong pattern sits at a support/resistance level
    pub support_resistance_bonus: f64,
}

/// Defaults for the opportunity ranker filters
pub struct ScannerSettings {
    pub min_probability: f64,
    pub max_results: usize,
    pub candles_per_timeframe: usize,
}

/// The Master Analysis Configuration
pub struct AnalysisConfig {
    // Priority order matters: longer frames first. Anything not listed gets `default_timeframe_weight`
    pub timeframe_weights: &'static [(&'static str, f64)],
    pub default_timeframe_weight: f64,
    // Timeframes whose levels are borrowed when a timeframe has none of its own
    pub level_fallback_timeframes: &'static [&'static str],

    // Sub-groups
    pub detection: DetectionSettings,
    pub levels: LevelSettings,
    pub probability: ProbabilitySettings,
    pub boosts: BoostSettings,
    pub scanner: ScannerSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    timeframe_weights: &[("D1", 0.40), ("H4", 0.30), ("H1", 0.20), ("M15", 0.10)],
    default_timeframe_weight: 0.08,
    level_fallback_timeframes: &["H4", "H1"],

    detection: DetectionSettings {
        lookback: 10,
        min_candles_required: 50,
        range_epsilon: 0.00001,
    },

    levels: LevelSettings {
        window: 50,
        max_levels: 3,
        proximity_threshold: 0.002,
    },

    probability: ProbabilitySettings {
        min: 25.0,
        max: 90.0,
        signal_threshold: 55.0,
        neutral_score: 50.0,
    },

    boosts: BoostSettings {
        very_strong: TierBoostSettings {
            cap: 15.0,
            per_pattern: 15.0,
        },
        strong: TierBoostSettings {
            cap: 12.0,
            per_pattern: 12.0,
        },
        medium: TierBoostSettings {
            cap: 10.0,
            per_pattern: 10.0,
        },
        support_resistance_bonus: 10.0,
    },

    scanner: ScannerSettings {
        min_probability: 60.0,
        max_results: 5,
        candles_per_timeframe: 200,
    },
};

/// Timeframes scanned when the caller does not name any
pub const DEFAULT_TIMEFRAMES: &[&str] = &["M15", "H1", "H4", "D1"];

pub const RANGE_EPSILON: f64 = ANALYSIS.detection.range_epsilon;
