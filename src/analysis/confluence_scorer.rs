//! Single-timeframe confluence scoring.
//!
//! Combines the detected patterns, the indicator snapshot and proximity to support/resistance
//! into a clamped long/short probability pair plus an ordered list of human readable factors.

use crate::config::{ConfluenceConfig, TierBoost};
use crate::domain::{PatternOccurrence, PatternStrength};
use crate::models::{
    ConfluenceResult, IndicatorScores, LevelSet, PatternCounts, StrengthCounts, TimeframeScore,
    decide_signal,
};

/// Raw (unclamped) adjustments produced by one timeframe's evidence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Adjustments {
    pub long: f64,
    pub short: f64,
    pub factors: Vec<String>,
}

fn prefix(timeframe: Option<&str>) -> String {
    match timeframe {
        Some(tf) if !tf.is_empty() => format!("[{}] ", tf),
        _ => String::new(),
    }
}

/// Pattern boosts and the support/resistance bonus. Factor order is fixed:
/// very strong, strong, medium (bullish first, then bearish), then support, then resistance.
pub fn pattern_adjustments(
    counts: &StrengthCounts,
    levels: &LevelSet,
    current_price: f64,
    timeframe: Option<&str>,
    weight: f64,
    config: &ConfluenceConfig,
) -> Adjustments {
    let weight = weight.max(0.0);
    let prefix = prefix(timeframe);
    let mut adj = Adjustments::default();

    let tiers: [(PatternStrength, &TierBoost, usize, usize); 3] = [
        (
            PatternStrength::VeryStrong,
            &config.very_strong_boost,
            counts.very_strong_bullish,
            counts.very_strong_bearish,
        ),
        (
            PatternStrength::Strong,
            &config.strong_boost,
            counts.strong_bullish,
            counts.strong_bearish,
        ),
        (
            PatternStrength::Medium,
            &config.medium_boost,
            counts.medium_bullish,
            counts.medium_bearish,
        ),
    ];

    for (strength, tier, bullish, _) in &tiers {
        if *bullish > 0 {
            let boost = tier.boost(*bullish, weight);
            adj.long += boost;
            adj.factors
                .push(format!("{}{} Bullish Pattern(s): +{:.1}%", prefix, strength, boost));
        }
    }

    for (strength, tier, _, bearish) in &tiers {
        if *bearish > 0 {
            let boost = tier.boost(*bearish, weight);
            adj.short += boost;
            adj.factors
                .push(format!("{}{} Bearish Pattern(s): +{:.1}%", prefix, strength, boost));
        }
    }

    // Flat bonus: applied once however many levels qualify
    let bonus = config.support_resistance_bonus * weight;

    if counts.has_strong_bullish() && levels.near_support(current_price, config.proximity_threshold)
    {
        adj.long += bonus;
        adj.factors
            .push(format!("{}Pattern at Support Level: +{:.1}%", prefix, bonus));
    }

    if counts.has_strong_bearish()
        && levels.near_resistance(current_price, config.proximity_threshold)
    {
        adj.short += bonus;
        adj.factors
            .push(format!("{}Pattern at Resistance Level: +{:.1}%", prefix, bonus));
    }

    adj
}

/// Score one timeframe. Pure: identical inputs always give an identical result.
pub fn score_timeframe(
    patterns: &[PatternOccurrence],
    scores: &IndicatorScores,
    levels: &LevelSet,
    current_price: f64,
    timeframe: Option<&str>,
    weight: f64,
    config: &ConfluenceConfig,
) -> ConfluenceResult {
    let weight = weight.max(0.0);
    let base = TimeframeScore::resolve(scores, config.neutral_score);
    let pattern_counts = PatternCounts::from_occurrences(patterns);

    let adj = pattern_adjustments(
        &pattern_counts.by_strength,
        levels,
        current_price,
        timeframe,
        weight,
        config,
    );

    let long_probability = config.clamp_probability(base.long_probability + adj.long);
    let short_probability = config.clamp_probability(base.short_probability + adj.short);
    let decision = decide_signal(long_probability, short_probability, config.signal_threshold);

    ConfluenceResult {
        signal: decision.signal,
        bias: decision.bias,
        primary_probability: decision.primary_probability,
        long_probability,
        short_probability,
        long_adjustment: adj.long,
        short_adjustment: adj.short,
        timeframe: timeframe.map(str::to_string),
        timeframe_weight: Some(weight),
        base_scores: base,
        confluence_factors: adj.factors,
        pattern_counts,
        timeframe_breakdown: Vec::new(),
    }
}
