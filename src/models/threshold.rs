//! Per-user adaptive fraud threshold

use crate::config::DetectionConfig;
use crate::stats::percentile;
use crate::types::context::RiskHistory;

/// Fallback used when no default is supplied by the caller.
pub const COMPONENT_DEFAULT_THRESHOLD: f64 = 0.5;

/// Derives a fraud threshold from a user's own score history.
///
/// Users who routinely score high get a higher bar before being flagged;
/// users with little history keep the fixed default.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveThresholder {
    min_history: usize,
    history_window: usize,
    percentile: f64,
    floor: f64,
    ceiling: f64,
}

impl AdaptiveThresholder {
    pub fn new(config: &DetectionConfig) -> Self {
        Self {
            min_history: config.min_history,
            history_window: config.history_window.max(1),
            percentile: config.percentile,
            floor: config.threshold_floor,
            ceiling: config.threshold_ceiling,
        }
    }

    /// Threshold for a user with the given history.
    ///
    /// Below `min_history` scores the supplied default is returned as is.
    /// Otherwise the configured percentile of the most recent
    /// `history_window` scores, clamped to `[floor, ceiling]`.
    pub fn threshold(&self, history: &RiskHistory, default: f64) -> f64 {
        let scores = history.scores();
        if scores.len() < self.min_history {
            return default;
        }

        let recent = &scores[scores.len().saturating_sub(self.history_window)..];
        match percentile(recent, self.percentile) {
            Some(p) => p.max(self.floor).min(self.ceiling),
            None => default,
        }
    }

    /// Threshold using [`COMPONENT_DEFAULT_THRESHOLD`] as the fallback.
    pub fn threshold_with_component_default(&self, history: &RiskHistory) -> f64 {
        self.threshold(history, COMPONENT_DEFAULT_THRESHOLD)
    }
}

impl Default for AdaptiveThresholder {
    fn default() -> Self {
        Self::new(&DetectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(scores: &[f64]) -> RiskHistory {
        RiskHistory::new(scores.to_vec())
    }

    #[test]
    fn test_short_history_uses_default() {
        let thresholder = AdaptiveThresholder::default();
        let short = history(&[0.1, 0.17, 0.23, 0.45, 0.31, 0.76]);

        assert_eq!(thresholder.threshold(&short, 0.65), 0.65);
        assert_eq!(thresholder.threshold_with_component_default(&short), 0.5);
        assert_eq!(thresholder.threshold(&RiskHistory::default(), 0.65), 0.65);
    }

    #[test]
    fn test_percentile_of_history() {
        let thresholder = AdaptiveThresholder::default();
        let scores: Vec<f64> = (1..=10).map(|i| i as f64 / 10.0).collect();

        let t = thresholder.threshold(&history(&scores), 0.65);
        assert!((t - 0.865).abs() < 1e-9);
    }

    #[test]
    fn test_only_recent_window_counts() {
        let thresholder = AdaptiveThresholder::default();
        // 30 old high scores followed by 50 recent low ones
        let mut scores = vec![0.9; 30];
        scores.extend(std::iter::repeat(0.2).take(50));

        let t = thresholder.threshold(&history(&scores), 0.65);
        assert!((t - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_is_clamped() {
        let thresholder = AdaptiveThresholder::default();
        assert_eq!(thresholder.threshold(&history(&[0.99; 12]), 0.65), 0.95);
        assert_eq!(thresholder.threshold(&history(&[0.0; 12]), 0.65), 0.05);
    }

    #[test]
    fn test_custom_configuration() {
        let config = DetectionConfig {
            min_history: 3,
            history_window: 3,
            percentile: 50.0,
            ..Default::default()
        };
        let thresholder = AdaptiveThresholder::new(&config);
        let t = thresholder.threshold(&history(&[0.9, 0.1, 0.3, 0.5]), 0.65);
        assert!((t - 0.3).abs() < 1e-12);
    }
}
