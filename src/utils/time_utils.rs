use chrono::DateTime;

pub struct TimeUtils;

impl TimeUtils {
    pub const MS_IN_S: i64 = 1000;
    pub const MS_IN_MIN: i64 = Self::MS_IN_S * 60;
    pub const MS_IN_5_MIN: i64 = Self::MS_IN_S * 60 * 5;
    pub const MS_IN_15_MIN: i64 = Self::MS_IN_S * 60 * 15;
    pub const MS_IN_30_MIN: i64 = Self::MS_IN_S * 60 * 30;
    pub const MS_IN_H: i64 = Self::MS_IN_MIN * 60;
    pub const MS_IN_4_H: i64 = Self::MS_IN_MIN * 60 * 4;
    pub const MS_IN_D: i64 = Self::MS_IN_H * 24;
    pub const MS_IN_W: i64 = Self::MS_IN_D * 7;
    pub const STANDARD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Candle duration for a timeframe label (`M15`, `H1`, `D1`, ...).
    /// Binance-style shorthands (`15m`, `1h`, `1d`) are accepted too.
    pub fn timeframe_to_ms(label: &str) -> Option<i64> {
        let ms = match label {
            "M1" | "1m" => Self::MS_IN_MIN,
            "M5" | "5m" => Self::MS_IN_5_MIN,
            "M15" | "15m" => Self::MS_IN_15_MIN,
            "M30" | "30m" => Self::MS_IN_30_MIN,
            "H1" | "1h" => Self::MS_IN_H,
            "H4" | "4h" => Self::MS_IN_4_H,
            "D1" | "1d" => Self::MS_IN_D,
            "W1" | "1w" => Self::MS_IN_W,
            _ => return None,
        };
        Some(ms)
    }
}

pub fn epoch_ms_to_utc(epoch_ms: i64) -> String {
    // Used for display purposes
    match DateTime::from_timestamp_millis(epoch_ms) {
        Some(dt) => dt.format(TimeUtils::STANDARD_TIME_FORMAT).to_string(),
        None => String::from("invalid timestamp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_labels() {
        assert_eq!(TimeUtils::timeframe_to_ms("H4"), Some(4 * 3_600_000));
        assert_eq!(TimeUtils::timeframe_to_ms("15m"), Some(900_000));
        assert_eq!(TimeUtils::timeframe_to_ms("Q1"), None);
    }

    #[test]
    fn test_epoch_formatting() {
        assert_eq!(epoch_ms_to_utc(0), "1970-01-01 00:00");
        assert_eq!(epoch_ms_to_utc(1_700_000_000_000), "2023-11-14 22:13");
    }
}
