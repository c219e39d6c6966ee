use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::domain::{PatternCategory, PatternOccurrence, PatternStrength};
use crate::models::scores::TimeframeScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    #[strum(to_string = "LONG (BUY)")]
    Long,
    #[strum(to_string = "SHORT (SELL)")]
    Short,
    #[strum(to_string = "NEUTRAL (WAIT)")]
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

/// Signal, bias and headline probability derived from a clamped long/short pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalDecision {
    pub signal: Signal,
    pub bias: Bias,
    pub primary_probability: f64,
}

/// Strict comparisons throughout: equal probabilities are always NEUTRAL.
pub fn decide_signal(long_probability: f64, short_probability: f64, threshold: f64) -> SignalDecision {
    if long_probability > short_probability && long_probability > threshold {
        SignalDecision {
            signal: Signal::Long,
            bias: Bias::Bullish,
            primary_probability: long_probability,
        }
    } else if short_probability > long_probability && short_probability > threshold {
        SignalDecision {
            signal: Signal::Short,
            bias: Bias::Bearish,
            primary_probability: short_probability,
        }
    } else {
        SignalDecision {
            signal: Signal::Neutral,
            bias: Bias::Neutral,
            primary_probability: long_probability.max(short_probability),
        }
    }
}

/// Directional occurrences bucketed by strength tier. Weak and neutral patterns are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthCounts {
    pub very_strong_bullish: usize,
    pub strong_bullish: usize,
    pub medium_bullish: usize,
    pub very_strong_bearish: usize,
    pub strong_bearish: usize,
    pub medium_bearish: usize,
}

impl StrengthCounts {
    pub fn from_occurrences<'a>(patterns: impl IntoIterator<Item = &'a PatternOccurrence>) -> Self {
        let mut counts = Self::default();
        for pattern in patterns {
            let slot = match (pattern.strength, pattern.category) {
                (PatternStrength::VeryStrong, PatternCategory::Bullish) => {
                    &mut counts.very_strong_bullish
                }
                (PatternStrength::Strong, PatternCategory::Bullish) => &mut counts.strong_bullish,
                (PatternStrength::Medium, PatternCategory::Bullish) => &mut counts.medium_bullish,
                (PatternStrength::VeryStrong, PatternCategory::Bearish) => {
                    &mut counts.very_strong_bearish
                }
                (PatternStrength::Strong, PatternCategory::Bearish) => &mut counts.strong_bearish,
                (PatternStrength::Medium, PatternCategory::Bearish) => &mut counts.medium_bearish,
                _ => continue,
            };
            *slot += 1;
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.very_strong_bullish
            + self.strong_bullish
            + self.medium_bullish
            + self.very_strong_bearish
            + self.strong_bearish
            + self.medium_bearish
    }

    pub fn has_strong_bullish(&self) -> bool {
        self.very_strong_bullish > 0 || self.strong_bullish > 0
    }

    pub fn has_strong_bearish(&self) -> bool {
        self.very_strong_bearish > 0 || self.strong_bearish > 0
    }
}

/// Raw occurrence counts for reporting. Never fed back into scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCounts {
    pub bullish: usize,
    pub bearish: usize,
    pub neutral: usize,
    pub total: usize,
    pub by_strength: StrengthCounts,
}

impl PatternCounts {
    pub fn from_occurrences<'a>(
        patterns: impl IntoIterator<Item = &'a PatternOccurrence> + Clone,
    ) -> Self {
        let mut counts = Self {
            by_strength: StrengthCounts::from_occurrences(patterns.clone()),
            ..Default::default()
        };
        for pattern in patterns {
            match pattern.category {
                PatternCategory::Bullish => counts.bullish += 1,
                PatternCategory::Bearish => counts.bearish += 1,
                PatternCategory::Neutral => counts.neutral += 1,
            }
        }
        counts.total = counts.bullish + counts.bearish + counts.neutral;
        counts
    }

    /// Majority vote of bullish vs bearish occurrences
    pub fn overall_bias(&self) -> Bias {
        match self.bullish.cmp(&self.bearish) {
            std::cmp::Ordering::Greater => Bias::Bullish,
            std::cmp::Ordering::Less => Bias::Bearish,
            std::cmp::Ordering::Equal => Bias::Neutral,
        }
    }
}

/// Per-timeframe slice of an aggregated result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeBreakdown {
    pub timeframe: String,
    pub weight: f64,
    pub long_adjustment: f64,
    pub short_adjustment: f64,
    pub long_probability: f64,
    pub short_probability: f64,
    pub signal: Signal,
    pub patterns_detected: usize,
    pub confluence_factors: Vec<String>,
}

/// Output of the confluence scorer (one timeframe) or the aggregator (all timeframes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceResult {
    pub signal: Signal,
    pub bias: Bias,
    pub primary_probability: f64,
    pub long_probability: f64,
    pub short_probability: f64,
    pub long_adjustment: f64,
    pub short_adjustment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe_weight: Option<f64>,
    pub base_scores: TimeframeScore,
    pub confluence_factors: Vec<String>,
    pub pattern_counts: PatternCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub timeframe_breakdown: Vec<TimeframeBreakdown>,
}
