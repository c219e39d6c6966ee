//! Deterministic candlestick pattern detection.
//!
//! Rules are a fixed, ordered table of independent predicates. Every rule is evaluated at
//! every index of the lookback window; a single index can carry several patterns.

use std::collections::BTreeMap;

use crate::config::PRINT_PATTERN_MATCHES;
use crate::domain::{Candle, PatternKind, PatternOccurrence};
use crate::models::CandleSeries;

/// One entry of the rule table. `predicate` receives exactly `kind.traits().bars`
/// consecutive candles, the last one being the candle under test.
pub struct PatternRule {
    pub kind: PatternKind,
    pub predicate: fn(&[Candle]) -> bool,
}

pub const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        kind: PatternKind::BullishEngulfing,
        predicate: bullish_engulfing,
    },
    PatternRule {
        kind: PatternKind::BearishEngulfing,
        predicate: bearish_engulfing,
    },
    PatternRule {
        kind: PatternKind::Hammer,
        predicate: hammer,
    },
    PatternRule {
        kind: PatternKind::ShootingStar,
        predicate: shooting_star,
    },
    PatternRule {
        kind: PatternKind::Doji,
        predicate: doji,
    },
    PatternRule {
        kind: PatternKind::SpinningTop,
        predicate: spinning_top,
    },
    PatternRule {
        kind: PatternKind::BullishMarubozu,
        predicate: bullish_marubozu,
    },
    PatternRule {
        kind: PatternKind::BearishMarubozu,
        predicate: bearish_marubozu,
    },
    PatternRule {
        kind: PatternKind::BullishHarami,
        predicate: bullish_harami,
    },
    PatternRule {
        kind: PatternKind::BearishHarami,
        predicate: bearish_harami,
    },
    PatternRule {
        kind: PatternKind::PiercingLine,
        predicate: piercing_line,
    },
    PatternRule {
        kind: PatternKind::DarkCloudCover,
        predicate: dark_cloud_cover,
    },
    PatternRule {
        kind: PatternKind::MorningStar,
        predicate: morning_star,
    },
    PatternRule {
        kind: PatternKind::EveningStar,
        predicate: evening_star,
    },
    PatternRule {
        kind: PatternKind::ThreeWhiteSoldiers,
        predicate: three_white_soldiers,
    },
    PatternRule {
        kind: PatternKind::ThreeBlackCrows,
        predicate: three_black_crows,
    },
];

// Shape thresholds
const DOJI_MAX_BODY_RATIO: f64 = 0.1;
const PIN_MIN_SHADOW_TO_BODY: f64 = 2.0;
const PIN_MAX_OPPOSITE_SHADOW_TO_BODY: f64 = 0.3;
const PIN_BODY_RATIO: (f64, f64) = (0.10, 0.35);
const SPINNING_TOP_BODY_RATIO: (f64, f64) = (0.1, 0.3);
const SPINNING_TOP_MIN_SHADOW_TO_BODY: f64 = 0.5;
const MARUBOZU_MIN_BODY_RATIO: f64 = 0.9;
const HARAMI_MAX_BODY_TO_PREV: f64 = 0.7;
const STAR_MAX_MIDDLE_BODY_TO_FIRST: f64 = 0.4;
const SOLDIERS_MIN_BODY_RATIO: f64 = 0.6;

/// Scan the `lookback` most recent candles and report every rule match.
///
/// Multi-candle rules at the start of the window may look back past it; a rule that would
/// need candles before index 0 simply does not fire.
pub fn detect_patterns(candles: &[Candle], lookback: usize) -> Vec<PatternOccurrence> {
    let start_idx = candles.len().saturating_sub(lookback);
    let mut patterns = Vec::new();

    for idx in start_idx..candles.len() {
        for rule in PATTERN_RULES {
            let bars = rule.kind.traits().bars;
            if idx + 1 < bars {
                continue;
            }
            let window = &candles[idx + 1 - bars..=idx];
            if (rule.predicate)(window) {
                let candle = &candles[idx];

                if PRINT_PATTERN_MATCHES {
                    log::info!(
                        "Pattern {} at index {} (close {})",
                        rule.kind,
                        idx,
                        candle.close_price
                    );
                }

                patterns.push(PatternOccurrence::new(
                    rule.kind,
                    idx,
                    candle.timestamp_ms,
                    candle.close_price,
                ));
            }
        }
    }

    patterns
}

/// Detect patterns for each requested timeframe. Every requested timeframe gets an entry;
/// absent or empty series map to an empty list.
pub fn detect_patterns_by_timeframe(
    frames: &BTreeMap<String, CandleSeries>,
    timeframes: &[String],
    lookback: usize,
) -> BTreeMap<String, Vec<PatternOccurrence>> {
    timeframes
        .iter()
        .map(|tf| {
            let patterns = match frames.get(tf) {
                Some(series) if !series.is_empty() => {
                    detect_patterns(&series.candles, lookback.min(series.len()))
                }
                _ => Vec::new(),
            };
            (tf.clone(), patterns)
        })
        .collect()
}

// ----------------------------------------------------------------------------
// Single-candle rules
// ----------------------------------------------------------------------------

fn in_band(value: f64, (low, high): (f64, f64)) -> bool {
    value >= low && value <= high
}

/// Long lower shadow, tiny upper shadow, small body. Bias comes from the shape alone,
/// so a red hammer is still a Hammer.
fn hammer(w: &[Candle]) -> bool {
    let c = &w[0];
    let body = c.body();
    c.lower_shadow() >= PIN_MIN_SHADOW_TO_BODY * body
        && c.upper_shadow() <= PIN_MAX_OPPOSITE_SHADOW_TO_BODY * body
        && in_band(c.body_ratio(), PIN_BODY_RATIO)
}

/// Mirror of [`hammer`]: long upper shadow, tiny lower shadow, colour ignored
fn shooting_star(w: &[Candle]) -> bool {
    let c = &w[0];
    let body = c.body();
    c.upper_shadow() >= PIN_MIN_SHADOW_TO_BODY * body
        && c.lower_shadow() <= PIN_MAX_OPPOSITE_SHADOW_TO_BODY * body
        && in_band(c.body_ratio(), PIN_BODY_RATIO)
}

fn doji(w: &[Candle]) -> bool {
    w[0].body_ratio() < DOJI_MAX_BODY_RATIO
}

fn spinning_top(w: &[Candle]) -> bool {
    let c = &w[0];
    let ratio = c.body_ratio();
    let min_shadow = SPINNING_TOP_MIN_SHADOW_TO_BODY * c.body();
    ratio > SPINNING_TOP_BODY_RATIO.0
        && ratio < SPINNING_TOP_BODY_RATIO.1
        && c.upper_shadow() > min_shadow
        && c.lower_shadow() > min_shadow
}

fn bullish_marubozu(w: &[Candle]) -> bool {
    w[0].is_bullish() && w[0].body_ratio() >= MARUBOZU_MIN_BODY_RATIO
}

fn bearish_marubozu(w: &[Candle]) -> bool {
    w[0].is_bearish() && w[0].body_ratio() >= MARUBOZU_MIN_BODY_RATIO
}

// ----------------------------------------------------------------------------
// Two-candle rules
// ----------------------------------------------------------------------------

fn bullish_engulfing(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bearish()
        && curr.is_bullish()
        && curr.close_price > prev.open_price
        && curr.open_price < prev.close_price
}

fn bearish_engulfing(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bullish()
        && curr.is_bearish()
        && curr.close_price < prev.open_price
        && curr.open_price > prev.close_price
}

fn inside_prev_range(prev: &Candle, curr: &Candle) -> bool {
    curr.high_price <= prev.high_price && curr.low_price >= prev.low_price
}

fn bullish_harami(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bearish()
        && curr.is_bullish()
        && curr.body() < prev.body() * HARAMI_MAX_BODY_TO_PREV
        && inside_prev_range(prev, curr)
}

fn bearish_harami(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bullish()
        && curr.is_bearish()
        && curr.body() < prev.body() * HARAMI_MAX_BODY_TO_PREV
        && inside_prev_range(prev, curr)
}

fn piercing_line(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bearish()
        && curr.is_bullish()
        && curr.close_price > prev.body_midpoint()
        && curr.close_price < prev.open_price
}

fn dark_cloud_cover(w: &[Candle]) -> bool {
    let (prev, curr) = (&w[0], &w[1]);
    prev.is_bullish()
        && curr.is_bearish()
        && curr.close_price < prev.body_midpoint()
        && curr.close_price > prev.open_price
}

// ----------------------------------------------------------------------------
// Three-candle rules
// ----------------------------------------------------------------------------

fn morning_star(w: &[Candle]) -> bool {
    let (c1, c2, c3) = (&w[0], &w[1], &w[2]);
    c1.is_bearish()
        && c2.body() < c1.body() * STAR_MAX_MIDDLE_BODY_TO_FIRST
        && c3.is_bullish()
        && c3.close_price > c1.body_midpoint()
}

fn evening_star(w: &[Candle]) -> bool {
    let (c1, c2, c3) = (&w[0], &w[1], &w[2]);
    c1.is_bullish()
        && c2.body() < c1.body() * STAR_MAX_MIDDLE_BODY_TO_FIRST
        && c3.is_bearish()
        && c3.close_price < c1.body_midpoint()
}

/// Only the last soldier has to be a full-bodied candle
fn three_white_soldiers(w: &[Candle]) -> bool {
    w.iter().all(Candle::is_bullish)
        && w[2].body_ratio() > SOLDIERS_MIN_BODY_RATIO
        && w[1].close_price > w[0].close_price
        && w[2].close_price > w[1].close_price
}

fn three_black_crows(w: &[Candle]) -> bool {
    w.iter().all(Candle::is_bearish)
        && w[2].body_ratio() > SOLDIERS_MIN_BODY_RATIO
        && w[1].close_price < w[0].close_price
        && w[2].close_price < w[1].close_price
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PatternCategory, PatternStrength};
    use strum::IntoEnumIterator;

    fn c(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0, open, high, low, close)
    }

    /// Give the bars increasing timestamps so occurrences can be told apart
    fn series(bars: Vec<Candle>) -> Vec<Candle> {
        bars.into_iter()
            .enumerate()
            .map(|(i, mut bar)| {
                bar.timestamp_ms = i as i64 * 3_600_000;
                bar
            })
            .collect()
    }

    fn kinds_at(candles: &[Candle], index: usize) -> Vec<PatternKind> {
        detect_patterns(candles, candles.len())
            .into_iter()
            .filter(|p| p.index == index)
            .map(|p| p.kind)
            .collect()
    }

    #[test]
    fn test_rule_table_covers_every_kind_once() {
        for kind in PatternKind::iter() {
            let hits = PATTERN_RULES.iter().filter(|r| r.kind == kind).count();
            assert_eq!(hits, 1, "{kind} should appear exactly once");
        }
    }

    #[test]
    fn test_doji_scenario() {
        // body/range = 0.05
        let candles = series(vec![c(100.0, 100.5, 99.5, 100.05)]);
        let found = detect_patterns(&candles, 5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, PatternKind::Doji);
        assert_eq!(found[0].strength, PatternStrength::Medium);
        assert_eq!(found[0].category, PatternCategory::Neutral);
    }

    #[test]
    fn test_bullish_engulfing_scenario() {
        let candles = series(vec![
            c(1.1000, 1.1005, 1.0945, 1.0950),
            c(1.0940, 1.1015, 1.0935, 1.1010),
        ]);
        let found = detect_patterns(&candles, 5);
        let engulfing = found
            .iter()
            .find(|p| p.kind == PatternKind::BullishEngulfing)
            .expect("bullish engulfing should be detected");
        assert_eq!(engulfing.index, 1);
        assert_eq!(engulfing.category, PatternCategory::Bullish);
        assert_eq!(engulfing.strength, PatternStrength::VeryStrong);
        assert_eq!(engulfing.price, 1.1010);
        assert_eq!(engulfing.timestamp_ms, 3_600_000);
    }

    #[test]
    fn test_bearish_engulfing() {
        let candles = series(vec![
            c(1.0950, 1.1005, 1.0945, 1.1000),
            c(1.1010, 1.1015, 1.0935, 1.0940),
        ]);
        assert!(kinds_at(&candles, 1).contains(&PatternKind::BearishEngulfing));
    }

    #[test]
    fn test_hammer_family() {
        let bullish_hammer = series(vec![c(100.0, 101.2, 97.0, 101.0)]);
        assert_eq!(kinds_at(&bullish_hammer, 0), vec![PatternKind::Hammer]);

        // A red body does not flip the bias or add a second reading
        let bearish_hammer = series(vec![c(101.0, 101.2, 97.0, 100.0)]);
        assert_eq!(kinds_at(&bearish_hammer, 0), vec![PatternKind::Hammer]);
    }

    #[test]
    fn test_shooting_star_family() {
        let bearish_star = series(vec![c(101.0, 104.0, 99.8, 100.0)]);
        assert_eq!(kinds_at(&bearish_star, 0), vec![PatternKind::ShootingStar]);

        let bullish_star = series(vec![c(100.0, 104.0, 99.8, 101.0)]);
        assert_eq!(kinds_at(&bullish_star, 0), vec![PatternKind::ShootingStar]);
    }

    #[test]
    fn test_spinning_top() {
        let candles = series(vec![c(100.0, 100.6, 99.6, 100.2)]);
        assert_eq!(kinds_at(&candles, 0), vec![PatternKind::SpinningTop]);
    }

    #[test]
    fn test_marubozu() {
        let up = series(vec![c(100.0, 110.2, 99.9, 110.0)]);
        assert_eq!(kinds_at(&up, 0), vec![PatternKind::BullishMarubozu]);
        let down = series(vec![c(110.0, 110.1, 99.8, 100.0)]);
        assert_eq!(kinds_at(&down, 0), vec![PatternKind::BearishMarubozu]);
    }

    #[test]
    fn test_harami() {
        let bullish = series(vec![c(110.0, 111.0, 99.0, 100.0), c(103.0, 107.0, 102.0, 106.0)]);
        assert!(kinds_at(&bullish, 1).contains(&PatternKind::BullishHarami));

        let bearish = series(vec![c(100.0, 111.0, 99.0, 110.0), c(107.0, 108.0, 103.0, 104.0)]);
        assert!(kinds_at(&bearish, 1).contains(&PatternKind::BearishHarami));
    }

    #[test]
    fn test_piercing_line_and_dark_cloud_cover() {
        let piercing = series(vec![c(110.0, 111.0, 99.5, 100.0), c(99.0, 107.5, 98.5, 107.0)]);
        let kinds = kinds_at(&piercing, 1);
        assert!(kinds.contains(&PatternKind::PiercingLine));
        assert!(!kinds.contains(&PatternKind::BullishEngulfing));

        let dark_cloud = series(vec![c(100.0, 110.5, 99.0, 110.0), c(111.0, 111.5, 102.5, 103.0)]);
        let kinds = kinds_at(&dark_cloud, 1);
        assert!(kinds.contains(&PatternKind::DarkCloudCover));
        assert!(!kinds.contains(&PatternKind::BearishEngulfing));
    }

    #[test]
    fn test_piercing_line_needs_no_gap() {
        // Opens above the previous low
        let candles = series(vec![c(110.0, 111.0, 99.0, 100.0), c(99.5, 108.5, 99.2, 107.0)]);
        assert_eq!(kinds_at(&candles, 1), vec![PatternKind::PiercingLine]);

        let dark_cloud = series(vec![c(100.0, 111.0, 99.0, 110.0), c(110.5, 111.5, 102.5, 103.0)]);
        assert_eq!(kinds_at(&dark_cloud, 1), vec![PatternKind::DarkCloudCover]);
    }

    #[test]
    fn test_stars() {
        let morning = series(vec![
            c(110.0, 111.0, 99.0, 100.0),
            c(99.5, 100.0, 98.5, 99.0),
            c(100.0, 108.5, 99.5, 108.0),
        ]);
        assert!(kinds_at(&morning, 2).contains(&PatternKind::MorningStar));

        let evening = series(vec![
            c(100.0, 111.0, 99.0, 110.0),
            c(110.5, 111.5, 110.0, 111.0),
            c(110.0, 110.5, 101.5, 102.0),
        ]);
        assert!(kinds_at(&evening, 2).contains(&PatternKind::EveningStar));
    }

    #[test]
    fn test_soldiers_and_crows() {
        let soldiers = series(vec![
            c(100.0, 104.2, 99.9, 104.0),
            c(104.0, 108.2, 103.9, 108.0),
            c(108.0, 112.2, 107.9, 112.0),
        ]);
        assert!(kinds_at(&soldiers, 2).contains(&PatternKind::ThreeWhiteSoldiers));

        let crows = series(vec![
            c(112.0, 112.1, 107.8, 108.0),
            c(108.0, 108.1, 103.8, 104.0),
            c(104.0, 104.1, 99.8, 100.0),
        ]);
        assert!(kinds_at(&crows, 2).contains(&PatternKind::ThreeBlackCrows));
    }

    #[test]
    fn test_soldiers_only_check_last_body() {
        // First soldier has body/range 0.5
        let soldiers = series(vec![
            c(100.0, 104.0, 98.0, 103.0),
            c(103.0, 107.2, 102.9, 107.0),
            c(107.0, 111.2, 106.9, 111.0),
        ]);
        assert_eq!(
            kinds_at(&soldiers, 2),
            vec![PatternKind::BullishMarubozu, PatternKind::ThreeWhiteSoldiers]
        );

        let weak_last = series(vec![
            c(100.0, 104.1, 99.9, 104.0),
            c(104.0, 108.1, 103.9, 108.0),
            c(108.0, 110.0, 106.0, 109.0),
        ]);
        assert!(!kinds_at(&weak_last, 2).contains(&PatternKind::ThreeWhiteSoldiers));

        let crows = series(vec![
            c(112.0, 114.0, 108.0, 109.0),
            c(109.0, 109.1, 104.8, 105.0),
            c(105.0, 105.1, 100.8, 101.0),
        ]);
        assert!(kinds_at(&crows, 2).contains(&PatternKind::ThreeBlackCrows));
    }

    #[test]
    fn test_insufficient_history_never_fires_multi_bar_rules() {
        // The engulfing candle alone has no predecessor
        let candles = series(vec![c(1.0940, 1.1015, 1.0935, 1.1010)]);
        let found = detect_patterns(&candles, 10);
        assert!(found.iter().all(|p| p.kind.traits().bars == 1));
        assert!(detect_patterns(&[], 10).is_empty());
    }

    #[test]
    fn test_lookback_limits_tested_indices() {
        let mut bars = vec![c(100.0, 100.5, 99.5, 100.05); 8];
        bars.push(c(100.0, 101.2, 97.0, 101.0));
        let candles = series(bars);
        let found = detect_patterns(&candles, 3);
        assert!(found.iter().all(|p| p.index >= 6));
        assert_eq!(found.iter().filter(|p| p.kind == PatternKind::Doji).count(), 2);
        assert!(found.iter().any(|p| p.kind == PatternKind::Hammer && p.index == 8));
    }

    #[test]
    fn test_zero_range_candle_does_not_panic() {
        let candles = series(vec![c(1.0, 1.0, 1.0, 1.0), c(1.0, 1.0, 1.0, 1.0)]);
        let found = detect_patterns(&candles, 2);
        // a flat bar has body/range == 0 which reads as a doji
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.kind == PatternKind::Doji));
    }

    #[test]
    fn test_by_timeframe_fills_missing_frames() {
        let mut frames = BTreeMap::new();
        frames.insert(
            "H1".to_string(),
            CandleSeries::new("H1", series(vec![c(100.0, 100.5, 99.5, 100.05)])),
        );
        let timeframes = vec!["H1".to_string(), "H4".to_string()];
        let by_tf = detect_patterns_by_timeframe(&frames, &timeframes, 10);
        assert_eq!(by_tf.len(), 2);
        assert_eq!(by_tf["H1"].len(), 1);
        assert!(by_tf["H4"].is_empty());
    }
}
