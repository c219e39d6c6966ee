use serde::{Deserialize, Serialize};

use crate::domain::candle::Candle;

// ============================================================================
// CandleSeries: one timeframe's OHLC bars, oldest first
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    pub timeframe: String,
    pub candles: Vec<Candle>,
}

/// How usable a timeframe's data was for this scan.
/// Never fatal: anything but `Ok` just means no detections for that frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeStatus {
    Ok { candles: usize },
    MissingData,
    InsufficientData { received: usize, required: usize },
}

impl TimeframeStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, TimeframeStatus::Ok { .. })
    }

    pub fn detail(&self) -> String {
        match self {
            TimeframeStatus::Ok { candles } => format!("{} candles", candles),
            TimeframeStatus::MissingData => "No candles provided".to_string(),
            TimeframeStatus::InsufficientData { received, required } => {
                format!("{}/{} candles", received, required)
            }
        }
    }
}

impl CandleSeries {
    /// Build a series, sorting by timestamp and dropping duplicate timestamps (first wins)
    pub fn new(timeframe: impl Into<String>, mut candles: Vec<Candle>) -> Self {
        candles.sort_by_key(|c| c.timestamp_ms);
        candles.dedup_by_key(|c| c.timestamp_ms);
        Self {
            timeframe: timeframe.into(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Strictly ascending, duplicate-free timestamps and well-formed bars
    pub fn is_clean(&self) -> bool {
        self.candles.iter().all(Candle::is_well_formed)
            && self
                .candles
                .windows(2)
                .all(|w| w[0].timestamp_ms < w[1].timestamp_ms)
    }

    pub fn status(&self, min_candles: usize) -> TimeframeStatus {
        match self.candles.len() {
            0 => TimeframeStatus::MissingData,
            n if n < min_candles => TimeframeStatus::InsufficientData {
                received: n,
                required: min_candles,
            },
            n => TimeframeStatus::Ok { candles: n },
        }
    }
}
