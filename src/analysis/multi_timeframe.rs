//! Weighted multi-timeframe aggregation.
//!
//! Each retained timeframe is scored on its own (see [`score_timeframe`]); the raw adjustments
//! are summed on top of the global base scores and the totals are clamped exactly once.

use std::collections::BTreeMap;

use crate::analysis::confluence_scorer::score_timeframe;
use crate::config::{ConfluenceConfig, PRINT_TIMEFRAME_BREAKDOWN};
use crate::domain::PatternOccurrence;
use crate::models::{
    ConfluenceResult, IndicatorScores, LevelSet, PatternCounts, TimeframeBreakdown, TimeframeScore,
    decide_signal,
};

/// Evaluation order: weight-table order for the timeframes present, then any others in
/// lexical order. With no timeframes at all the full weight table is used.
pub fn prioritised_timeframes<'a>(
    patterns_by_timeframe: &'a BTreeMap<String, Vec<PatternOccurrence>>,
    config: &'a ConfluenceConfig,
) -> Vec<&'a str> {
    let mut ordered: Vec<&str> = config
        .priority_order()
        .filter(|tf| patterns_by_timeframe.contains_key(*tf))
        .collect();

    // BTreeMap keys are already sorted
    let extras: Vec<&str> = patterns_by_timeframe
        .keys()
        .map(String::as_str)
        .filter(|tf| !ordered.contains(tf))
        .collect();
    ordered.extend(extras);

    if ordered.is_empty() {
        config.priority_order().collect()
    } else {
        ordered
    }
}

/// A timeframe's own levels, else the first fallback timeframe that has an entry,
/// else an empty set pivoting on the current price.
pub fn resolve_levels(
    timeframe: &str,
    levels_by_timeframe: &BTreeMap<String, LevelSet>,
    current_price: f64,
    config: &ConfluenceConfig,
) -> LevelSet {
    levels_by_timeframe
        .get(timeframe)
        .or_else(|| {
            config
                .level_fallback_timeframes
                .iter()
                .find_map(|tf| levels_by_timeframe.get(tf))
        })
        .cloned()
        .unwrap_or_else(|| LevelSet::empty(current_price))
}

/// Blend per-timeframe evidence into one signal.
///
/// Timeframes with no patterns and no level entry are skipped outright. A timeframe without
/// its own indicator scores is scored against `base_scores`. Pattern counts cover every input
/// timeframe, skipped or not, and are for reporting only.
pub fn aggregate(
    patterns_by_timeframe: &BTreeMap<String, Vec<PatternOccurrence>>,
    levels_by_timeframe: &BTreeMap<String, LevelSet>,
    base_scores: &IndicatorScores,
    scores_by_timeframe: &BTreeMap<String, IndicatorScores>,
    current_price: f64,
    config: &ConfluenceConfig,
) -> ConfluenceResult {
    let base = TimeframeScore::resolve(base_scores, config.neutral_score);

    let mut total_long = base.long_probability;
    let mut total_short = base.short_probability;
    let mut combined_factors = Vec::new();
    let mut breakdown = Vec::new();

    for timeframe in prioritised_timeframes(patterns_by_timeframe, config) {
        let patterns = patterns_by_timeframe
            .get(timeframe)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if patterns.is_empty() && !levels_by_timeframe.contains_key(timeframe) {
            continue;
        }

        let weight = config.weight_for(timeframe);
        let levels = resolve_levels(timeframe, levels_by_timeframe, current_price, config);
        let scores = scores_by_timeframe.get(timeframe).unwrap_or(base_scores);

        let tf_result = score_timeframe(
            patterns,
            scores,
            &levels,
            current_price,
            Some(timeframe),
            weight,
            config,
        );

        total_long += tf_result.long_adjustment;
        total_short += tf_result.short_adjustment;
        combined_factors.extend(tf_result.confluence_factors.iter().cloned());

        breakdown.push(TimeframeBreakdown {
            timeframe: timeframe.to_string(),
            weight: tf_result.timeframe_weight.unwrap_or(weight),
            long_adjustment: tf_result.long_adjustment,
            short_adjustment: tf_result.short_adjustment,
            long_probability: tf_result.long_probability,
            short_probability: tf_result.short_probability,
            signal: tf_result.signal,
            patterns_detected: tf_result.pattern_counts.by_strength.total(),
            confluence_factors: tf_result.confluence_factors,
        });
    }

    let long_probability = config.clamp_probability(total_long);
    let short_probability = config.clamp_probability(total_short);
    let decision = decide_signal(long_probability, short_probability, config.signal_threshold);

    if PRINT_TIMEFRAME_BREAKDOWN {
        for entry in &breakdown {
            log::info!(
                "{} (w={:.2}): long {:+.2} short {:+.2} -> {}",
                entry.timeframe,
                entry.weight,
                entry.long_adjustment,
                entry.short_adjustment,
                entry.signal
            );
        }
        log::info!(
            "Aggregate: long {:.1} short {:.1} -> {}",
            long_probability,
            short_probability,
            decision.signal
        );
    }

    ConfluenceResult {
        signal: decision.signal,
        bias: decision.bias,
        primary_probability: decision.primary_probability,
        long_probability,
        short_probability,
        long_adjustment: long_probability - base.long_probability,
        short_adjustment: short_probability - base.short_probability,
        timeframe: None,
        timeframe_weight: None,
        base_scores: base,
        confluence_factors: combined_factors,
        pattern_counts: PatternCounts::from_occurrences(patterns_by_timeframe.values().flatten()),
        timeframe_breakdown: breakdown,
    }
}
