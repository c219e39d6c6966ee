//! Candlestick pattern vocabulary: names, directional category, strength tier and the
//! static reliability table. Detection predicates live in `analysis::pattern_detector`.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum PatternCategory {
    Bullish,
    Bearish,
    Neutral,
}

/// Ordered weakest to strongest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
pub enum PatternStrength {
    Weak,
    Medium,
    Strong,
    #[strum(serialize = "Very Strong")]
    VeryStrong,
}

/// Every pattern the detector knows, in rule-table order
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PatternKind {
    #[strum(serialize = "Bullish Engulfing")]
    BullishEngulfing,
    #[strum(serialize = "Bearish Engulfing")]
    BearishEngulfing,
    Hammer,
    #[strum(serialize = "Shooting Star")]
    ShootingStar,
    Doji,
    #[strum(serialize = "Spinning Top")]
    SpinningTop,
    #[strum(serialize = "Bullish Marubozu")]
    BullishMarubozu,
    #[strum(serialize = "Bearish Marubozu")]
    BearishMarubozu,
    #[strum(serialize = "Bullish Harami")]
    BullishHarami,
    #[strum(serialize = "Bearish Harami")]
    BearishHarami,
    #[strum(serialize = "Piercing Line")]
    PiercingLine,
    #[strum(serialize = "Dark Cloud Cover")]
    DarkCloudCover,
    #[strum(serialize = "Morning Star")]
    MorningStar,
    #[strum(serialize = "Evening Star")]
    EveningStar,
    #[strum(serialize = "Three White Soldiers")]
    ThreeWhiteSoldiers,
    #[strum(serialize = "Three Black Crows")]
    ThreeBlackCrows,
}

/// Fixed attributes attached to every occurrence of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTraits {
    pub category: PatternCategory,
    pub strength: PatternStrength,
    pub reliability: u8,
    /// Consecutive candles (ending at the tested index) the rule looks at
    pub bars: usize,
}

impl PatternKind {
    pub fn traits(&self) -> PatternTraits {
        use PatternCategory::*;
        use PatternStrength::*;

        let (category, strength, reliability, bars) = match self {
            PatternKind::BullishEngulfing => (Bullish, VeryStrong, 75, 2),
            PatternKind::BearishEngulfing => (Bearish, VeryStrong, 75, 2),
            PatternKind::Hammer => (Bullish, Strong, 70, 1),
            PatternKind::ShootingStar => (Bearish, Strong, 70, 1),
            PatternKind::Doji => (Neutral, Medium, 55, 1),
            PatternKind::SpinningTop => (Neutral, Weak, 50, 1),
            PatternKind::BullishMarubozu => (Bullish, Strong, 70, 1),
            PatternKind::BearishMarubozu => (Bearish, Strong, 70, 1),
            PatternKind::BullishHarami => (Bullish, Medium, 65, 2),
            PatternKind::BearishHarami => (Bearish, Medium, 65, 2),
            PatternKind::PiercingLine => (Bullish, Strong, 70, 2),
            PatternKind::DarkCloudCover => (Bearish, Strong, 70, 2),
            PatternKind::MorningStar => (Bullish, VeryStrong, 80, 3),
            PatternKind::EveningStar => (Bearish, VeryStrong, 80, 3),
            PatternKind::ThreeWhiteSoldiers => (Bullish, VeryStrong, 80, 3),
            PatternKind::ThreeBlackCrows => (Bearish, VeryStrong, 80, 3),
        };

        PatternTraits {
            category,
            strength,
            reliability,
            bars,
        }
    }
}

/// One detected pattern at one candle index. Never merged across rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternOccurrence {
    pub name: String,
    pub kind: PatternKind,
    pub category: PatternCategory,
    pub strength: PatternStrength,
    pub reliability: u8,
    pub index: usize,
    pub timestamp_ms: i64,
    pub price: f64,
}

impl PatternOccurrence {
    pub fn new(kind: PatternKind, index: usize, timestamp_ms: i64, price: f64) -> Self {
        let traits = kind.traits();
        Self {
            name: kind.to_string(),
            kind,
            category: traits.category,
            strength: traits.strength,
            reliability: traits.reliability,
            index,
            timestamp_ms,
            price,
        }
    }
}
