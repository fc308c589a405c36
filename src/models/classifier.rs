//! Final verdict from a score and a threshold

use crate::types::result::Category;

/// Category and fraud flag for one score.
///
/// The two are decided against different boundaries and may disagree, e.g.
/// a Safe category flagged as fraud when a user's threshold is very low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub category: Category,
    pub fraud: bool,
}

/// Classify a final score against the fixed bands and an adaptive threshold.
pub fn classify(score: f64, threshold: f64) -> Verdict {
    Verdict {
        category: Category::from_score(score),
        fraud: score >= threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraud_flag_uses_threshold() {
        assert!(classify(0.65, 0.65).fraud);
        assert!(!classify(0.6499, 0.65).fraud);
    }

    #[test]
    fn test_category_and_flag_can_disagree() {
        let low_bar = classify(0.2, 0.05);
        assert_eq!(low_bar.category, Category::Safe);
        assert!(low_bar.fraud);

        let high_bar = classify(0.8, 0.95);
        assert_eq!(high_bar.category, Category::Alert);
        assert!(!high_bar.fraud);
    }
}
