use serde::{Deserialize, Serialize};

/// Support/resistance levels for one timeframe. Both lists ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub resistance: Vec<f64>,
    pub support: Vec<f64>,
    pub pivot: f64,
}

impl LevelSet {
    /// No levels at all, pivot pinned to a known price
    pub fn empty(pivot: f64) -> Self {
        Self {
            resistance: Vec::new(),
            support: Vec::new(),
            pivot,
        }
    }

    pub fn has_levels(&self) -> bool {
        !self.resistance.is_empty() || !self.support.is_empty()
    }

    /// True if `price` is within `threshold` (fractional) of any support level
    pub fn near_support(&self, price: f64, threshold: f64) -> bool {
        any_within(&self.support, price, threshold)
    }

    /// True if `price` is within `threshold` (fractional) of any resistance level
    pub fn near_resistance(&self, price: f64, threshold: f64) -> bool {
        any_within(&self.resistance, price, threshold)
    }

    /// Closest resistance strictly above `price`
    pub fn nearest_resistance_above(&self, price: f64) -> Option<f64> {
        self.resistance
            .iter()
            .chain(self.support.iter())
            .copied()
            .filter(|&level| level > price)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Closest support strictly below `price`
    pub fn nearest_support_below(&self, price: f64) -> Option<f64> {
        self.support
            .iter()
            .chain(self.resistance.iter())
            .copied()
            .filter(|&level| level < price)
            .max_by(|a, b| a.total_cmp(b))
    }
}

fn any_within(levels: &[f64], price: f64, threshold: f64) -> bool {
    if price == 0.0 || !price.is_finite() {
        return false;
    }
    levels
        .iter()
        .any(|&level| ((price - level) / price).abs() < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proximity_checks_any_level() {
        let levels = LevelSet {
            resistance: vec![1.1300, 1.1500],
            support: vec![1.0800, 1.1150],
            pivot: 1.12,
        };
        // 1.1160 is 0.09% from 1.1150 but far from 1.0800
        assert!(levels.near_support(1.1160, 0.002));
        assert!(!levels.near_resistance(1.1160, 0.002));
        assert!(levels.near_resistance(1.1490, 0.002));
    }

    #[test]
    fn test_proximity_boundary_is_strict() {
        let levels = LevelSet {
            resistance: vec![],
            support: vec![98.0],
            pivot: 100.0,
        };
        // exactly 2% away with a 2% threshold is not "within"
        assert!(!levels.near_support(100.0, 0.02));
        assert!(levels.near_support(100.0, 0.0201));
    }

    #[test]
    fn test_zero_price_never_near() {
        let levels = LevelSet {
            resistance: vec![0.0],
            support: vec![0.0],
            pivot: 0.0,
        };
        assert!(!levels.near_support(0.0, 0.002));
    }

    #[test]
    fn test_nearest_levels() {
        let levels = LevelSet {
            resistance: vec![105.0, 110.0],
            support: vec![90.0, 95.0],
            pivot: 100.0,
        };
        assert_eq!(levels.nearest_resistance_above(100.0), Some(105.0));
        assert_eq!(levels.nearest_support_below(100.0), Some(95.0));
        assert_eq!(LevelSet::empty(1.0).nearest_support_below(1.0), None);
        assert!(!LevelSet::empty(1.0).has_levels());
    }
}
