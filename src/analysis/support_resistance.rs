use itertools::Itertools;

use crate::domain::Candle;
use crate::models::LevelSet;

/// Swing-point support/resistance over the trailing `window` candles.
///
/// A swing high is a bar whose high is strictly above both neighbours (swing low mirrors it),
/// so the first and last bar of the window never qualify. Keeps the `max_levels` highest swing
/// highs and lowest swing lows, each returned ascending. Pivot is `(h + l + c) / 3` of the last
/// bar, or `fallback_pivot` when there are no candles.
pub fn locate_levels(
    candles: &[Candle],
    window: usize,
    max_levels: usize,
    fallback_pivot: f64,
) -> LevelSet {
    let recent = &candles[candles.len().saturating_sub(window)..];
    let Some(last) = recent.last() else {
        return LevelSet::empty(fallback_pivot);
    };

    let swing_highs = recent
        .windows(3)
        .filter(|w| w[1].high_price > w[0].high_price && w[1].high_price > w[2].high_price)
        .map(|w| w[1].high_price);

    let swing_lows = recent
        .windows(3)
        .filter(|w| w[1].low_price < w[0].low_price && w[1].low_price < w[2].low_price)
        .map(|w| w[1].low_price);

    let resistance = swing_highs
        .sorted_by(|a, b| b.total_cmp(a))
        .dedup()
        .take(max_levels)
        .sorted_by(|a, b| a.total_cmp(b))
        .collect();

    let support = swing_lows
        .sorted_by(|a, b| a.total_cmp(b))
        .dedup()
        .take(max_levels)
        .collect();

    LevelSet {
        resistance,
        support,
        pivot: last.pivot(),
    }
}
