use serde::{Deserialize, Serialize};

/// Directional scores as supplied by the indicator collaborator for one timeframe.
///
/// Older producers emit `bullish_score` / `bearish_score`; newer ones emit
/// `long_probability` / `short_probability`. Both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorScores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bullish_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearish_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend_bias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_regime: Option<String>,
}

impl IndicatorScores {
    pub fn modern(long_probability: f64, short_probability: f64) -> Self {
        Self {
            long_probability: Some(long_probability),
            short_probability: Some(short_probability),
            ..Default::default()
        }
    }

    pub fn legacy(bullish_score: f64, bearish_score: f64) -> Self {
        Self {
            bullish_score: Some(bullish_score),
            bearish_score: Some(bearish_score),
            ..Default::default()
        }
    }
}

/// Resolved long/short pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeframeScore {
    pub long_probability: f64,
    pub short_probability: f64,
}

impl TimeframeScore {
    pub fn resolve(scores: &IndicatorScores, default: f64) -> Self {
        Self {
            long_probability: resolve_score(scores.long_probability, scores.bullish_score, default),
            short_probability: resolve_score(
                scores.short_probability,
                scores.bearish_score,
                default,
            ),
        }
    }
}

/// Primary key wins, then the secondary (legacy) key, then `default`.
/// Non-finite values count as absent.
pub fn resolve_score(primary: Option<f64>, secondary: Option<f64>, default: f64) -> f64 {
    primary
        .filter(|v| v.is_finite())
        .or(secondary.filter(|v| v.is_finite()))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_keys_win_over_legacy() {
        let scores = IndicatorScores {
            long_probability: Some(62.0),
            bullish_score: Some(40.0),
            bearish_score: Some(45.0),
            ..Default::default()
        };
        let resolved = TimeframeScore::resolve(&scores, 50.0);
        assert_eq!(resolved.long_probability, 62.0);
        assert_eq!(resolved.short_probability, 45.0);
    }

    #[test]
    fn test_missing_keys_default_to_neutral() {
        let resolved = TimeframeScore::resolve(&IndicatorScores::default(), 50.0);
        assert_eq!(resolved.long_probability, 50.0);
        assert_eq!(resolved.short_probability, 50.0);
    }

    #[test]
    fn test_nan_is_treated_as_absent() {
        assert_eq!(resolve_score(Some(f64::NAN), Some(41.0), 50.0), 41.0);
        assert_eq!(resolve_score(Some(f64::INFINITY), None, 50.0), 50.0);
    }

    #[test]
    fn test_legacy_json_payload() {
        let json = r#"{"bullish_score": 55.0, "bearish_score": 45.0, "trend_bias": "bullish"}"#;
        let scores: IndicatorScores = serde_json::from_str(json).unwrap();
        assert_eq!(scores, {
            let mut expected = IndicatorScores::legacy(55.0, 45.0);
            expected.trend_bias = Some("bullish".to_string());
            expected
        });
        let resolved = TimeframeScore::resolve(&scores, 50.0);
        assert_eq!(resolved, TimeframeScore::resolve(&IndicatorScores::modern(55.0, 45.0), 50.0));
    }
}
