use serde::{Deserialize, Serialize};

use crate::config::RANGE_EPSILON;

// Define the CandleType enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Bullish,
    Bearish,
    Flat,
}

/// One OHLC bar. Volume is carried through but never read by the pattern core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(alias = "time")]
    pub timestamp_ms: i64,
    #[serde(alias = "open")]
    pub open_price: f64,
    #[serde(alias = "high")]
    pub high_price: f64,
    #[serde(alias = "low")]
    pub low_price: f64,
    #[serde(alias = "close")]
    pub close_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

// Implement methods for the Candle struct
impl Candle {
    // A constructor for convenience
    pub fn new(
        timestamp_ms: i64,
        open_price: f64,
        high_price: f64,
        low_price: f64,
        close_price: f64,
    ) -> Self {
        Candle {
            timestamp_ms,
            open_price,
            high_price,
            low_price,
            close_price,
            volume: None,
        }
    }

    // A method to determine the type of candle
    pub fn get_type(&self) -> CandleType {
        if self.close_price > self.open_price {
            CandleType::Bullish
        } else if self.close_price < self.open_price {
            CandleType::Bearish
        } else {
            CandleType::Flat
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.get_type() == CandleType::Bullish
    }

    pub fn is_bearish(&self) -> bool {
        self.get_type() == CandleType::Bearish
    }

    // Returns the low and high of the candle body as a tuple
    pub fn body_range(&self) -> (f64, f64) {
        if self.open_price <= self.close_price {
            (self.open_price, self.close_price)
        } else {
            (self.close_price, self.open_price)
        }
    }

    pub fn body(&self) -> f64 {
        (self.close_price - self.open_price).abs()
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high_price - self.body_range().1
    }

    pub fn lower_shadow(&self) -> f64 {
        self.body_range().0 - self.low_price
    }

    /// High minus low, floored so ratio tests never divide by zero
    pub fn range(&self) -> f64 {
        let range = self.high_price - self.low_price;
        if range > 0.0 { range } else { RANGE_EPSILON }
    }

    /// Body as a fraction of the (floored) range
    pub fn body_ratio(&self) -> f64 {
        self.body() / self.range()
    }

    pub fn body_midpoint(&self) -> f64 {
        (self.open_price + self.close_price) / 2.0
    }

    /// Classic floor-trader pivot of this bar
    pub fn pivot(&self) -> f64 {
        (self.high_price + self.low_price + self.close_price) / 3.0
    }

    /// `low <= min(open, close) <= max(open, close) <= high`
    pub fn is_well_formed(&self) -> bool {
        let (body_low, body_high) = self.body_range();
        [self.open_price, self.high_price, self.low_price, self.close_price]
            .iter()
            .all(|p| p.is_finite())
            && self.low_price <= body_low
            && body_high <= self.high_price
    }
}
