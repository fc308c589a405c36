//! Score aggregation for the rule and profile models

use crate::config::DetectionConfig;
use crate::stats::round4;

/// Blends the rule score and the profile score into the final risk score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAggregator {
    /// Weight of the rolling-window rule score
    rule_weight: f64,
    /// Weight of the long-lived profile score
    profile_weight: f64,
}

impl RiskAggregator {
    /// Create an aggregator with explicit weights.
    ///
    /// Weights are normalized to sum to 1. Negative, non-finite or all-zero
    /// weights fall back to equal weights.
    pub fn new(rule_weight: f64, profile_weight: f64) -> Self {
        let usable = |w: f64| w.is_finite() && w >= 0.0;
        if usable(rule_weight) && usable(profile_weight) && rule_weight + profile_weight > 0.0 {
            Self {
                rule_weight,
                profile_weight,
            }
        } else {
            Self::equal_weights()
        }
    }

    /// Weights from the `[detection]` configuration.
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(config.rule_weight, config.profile_weight)
    }

    /// Plain average of both scores.
    pub fn equal_weights() -> Self {
        Self {
            rule_weight: 1.0,
            profile_weight: 1.0,
        }
    }

    /// Final score in `[0, 1]`, rounded to 4 decimals.
    pub fn aggregate(&self, rule_score: f64, profile_score: f64) -> f64 {
        let total = self.rule_weight + self.profile_weight;
        let blended = (rule_score * self.rule_weight + profile_score * self.profile_weight) / total;
        round4(blended.clamp(0.0, 1.0))
    }
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self::equal_weights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_weights_average() {
        let aggregator = RiskAggregator::default();
        assert_eq!(aggregator.aggregate(0.72, 0.8), 0.76);
        assert_eq!(aggregator.aggregate(0.0, 0.0), 0.0);
        assert_eq!(aggregator.aggregate(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_rounds_to_four_decimals() {
        let aggregator = RiskAggregator::default();
        assert_eq!(aggregator.aggregate(0.33333, 0.0), 0.1667);
    }

    #[test]
    fn test_weighted_aggregation() {
        let aggregator = RiskAggregator::new(3.0, 1.0);
        assert!((aggregator.aggregate(0.8, 0.4) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_weights_fall_back_to_average() {
        assert_eq!(RiskAggregator::new(0.0, 0.0), RiskAggregator::equal_weights());
        assert_eq!(RiskAggregator::new(2.0, -1.0), RiskAggregator::equal_weights());
        assert_eq!(RiskAggregator::new(f64::NAN, 1.0), RiskAggregator::equal_weights());
    }

    #[test]
    fn test_from_detection_config() {
        let config = DetectionConfig {
            rule_weight: 1.0,
            profile_weight: 0.0,
            ..Default::default()
        };
        let aggregator = RiskAggregator::from_config(&config);
        assert_eq!(aggregator.aggregate(0.44, 0.9), 0.44);
        assert_eq!(
            RiskAggregator::from_config(&Default::default()),
            RiskAggregator::equal_weights()
        );
    }
}
