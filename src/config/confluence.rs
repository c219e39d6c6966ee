//! Runtime confluence configuration.
//!
//! Built once (from [`ANALYSIS`] or a JSON override file) and handed by reference to the
//! detector, scorer and aggregator. Nothing in the pipeline reads mutable globals.

use serde::{Deserialize, Serialize};

use crate::config::ANALYSIS;

/// One row of the timeframe weight table. Table order is the evaluation priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeWeight {
    pub timeframe: String,
    pub weight: f64,
}

/// Cap and per-pattern increment for a strength tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBoost {
    pub cap: f64,
    pub per_pattern: f64,
}

impl TierBoost {
    /// `min(cap, count * per_pattern) * weight`
    pub fn boost(&self, count: usize, weight: f64) -> f64 {
        (count as f64 * self.per_pattern).min(self.cap) * weight
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    pub timeframe_weights: Vec<TimeframeWeight>,
    pub default_timeframe_weight: f64,
    pub level_fallback_timeframes: Vec<String>,

    pub very_strong_boost: TierBoost,
    pub strong_boost: TierBoost,
    pub medium_boost: TierBoost,
    pub support_resistance_bonus: f64,
    pub proximity_threshold: f64,

    pub probability_min: f64,
    pub probability_max: f64,
    pub signal_threshold: f64,
    pub neutral_score: f64,

    pub lookback: usize,
    pub min_candles_required: usize,
    /// Candles requested from the provider per symbol and timeframe
    pub candles_per_timeframe: usize,
    pub level_window: usize,
    pub max_levels: usize,
}

impl Default for ConfluenceConfig {
    fn default() -> Self {
        let tier = |t: crate::config::analysis::TierBoostSettings| TierBoost {
            cap: t.cap,
            per_pattern: t.per_pattern,
        };

        Self {
            timeframe_weights: ANALYSIS
                .timeframe_weights
                .iter()
                .map(|(timeframe, weight)| TimeframeWeight {
                    timeframe: timeframe.to_string(),
                    weight: *weight,
                })
                .collect(),
            default_timeframe_weight: ANALYSIS.default_timeframe_weight,
            level_fallback_timeframes: ANALYSIS
                .level_fallback_timeframes
                .iter()
                .map(|tf| tf.to_string())
                .collect(),

            very_strong_boost: tier(ANALYSIS.boosts.very_strong),
            strong_boost: tier(ANALYSIS.boosts.strong),
            medium_boost: tier(ANALYSIS.boosts.medium),
            support_resistance_bonus: ANALYSIS.boosts.support_resistance_bonus,
            proximity_threshold: ANALYSIS.levels.proximity_threshold,

            probability_min: ANALYSIS.probability.min,
            probability_max: ANALYSIS.probability.max,
            signal_threshold: ANALYSIS.probability.signal_threshold,
            neutral_score: ANALYSIS.probability.neutral_score,

            lookback: ANALYSIS.detection.lookback,
            min_candles_required: ANALYSIS.detection.min_candles_required,
            candles_per_timeframe: ANALYSIS.scanner.candles_per_timeframe,
            level_window: ANALYSIS.levels.window,
            max_levels: ANALYSIS.levels.max_levels,
        }
    }
}

impl ConfluenceConfig {
    /// Weight from the table, or the default weight for unrecognised frames
    pub fn weight_for(&self, timeframe: &str) -> f64 {
        self.timeframe_weights
            .iter()
            .find(|row| row.timeframe == timeframe)
            .map(|row| row.weight)
            .unwrap_or(self.default_timeframe_weight)
    }

    /// Timeframe labels in priority order
    pub fn priority_order(&self) -> impl Iterator<Item = &str> {
        self.timeframe_weights.iter().map(|row| row.timeframe.as_str())
    }

    pub fn clamp_probability(&self, value: f64) -> f64 {
        value.max(self.probability_min).min(self.probability_max)
    }

    /// Replace (or append) the weight for one timeframe
    pub fn with_weight(mut self, timeframe: &str, weight: f64) -> Self {
        match self
            .timeframe_weights
            .iter_mut()
            .find(|row| row.timeframe == timeframe)
        {
            Some(row) => row.weight = weight,
            None => self.timeframe_weights.push(TimeframeWeight {
                timeframe: timeframe.to_string(),
                weight,
            }),
        }
        self
    }
}
