//! Risk from the long-lived behavior profile alone

use crate::stats::{mean, round4, shannon_entropy};
use crate::types::context::BehaviorProfile;
use crate::types::transaction::TransactionEvent;

const EPSILON: f64 = 1e-6;
const MAX_AMOUNT_DEVIATION: f64 = 0.5;
const FAMILIAR_COUNT: u32 = 2;
const MAX_FOOTPRINT_ENTROPY: f64 = 2.0;

/// Scores how far a transaction strays from the user's settled habits.
///
/// Independent of the rolling window: only the profile's amounts, cities,
/// devices and time slots are consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileRiskModel;

impl ProfileRiskModel {
    pub fn new() -> Self {
        Self
    }

    /// Profile score in `[0, 1]`, rounded to 4 decimals.
    pub fn score(&self, profile: &BehaviorProfile, tx: &TransactionEvent) -> f64 {
        let mut score: f64 = 0.0;

        // An empty amount history means no deviation
        let average = mean(&profile.amounts).unwrap_or(tx.amount);
        if (tx.amount - average).abs() / (average + EPSILON) > MAX_AMOUNT_DEVIATION {
            score += 0.2;
        }

        if profile.city_count(&tx.city) < FAMILIAR_COUNT {
            score += 0.2;
        }

        if profile.device_count(&tx.device_id) == 0 {
            score += 0.2;
        }

        if profile.slot_count(tx.slot()) < FAMILIAR_COUNT {
            score += 0.2;
        }

        // A footprint spread over many cities and devices
        let footprint: Vec<f64> = profile
            .cities
            .values()
            .chain(profile.devices.values())
            .map(|&c| c as f64)
            .collect();
        if footprint.len() > 1 && shannon_entropy(footprint) > MAX_FOOTPRINT_ENTROPY {
            score += 0.25;
        }

        round4(score.min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::TimeSlot;
    use chrono::NaiveDate;

    fn tx(amount: f64, city: &str, device: &str, hour: u32) -> TransactionEvent {
        let ts = NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TransactionEvent::new(amount, city, device, "user_1", ts)
    }

    fn settled() -> BehaviorProfile {
        let mut profile = BehaviorProfile {
            amounts: vec![45.0, 60.0, 40.0, 55.0],
            ..Default::default()
        };
        profile.cities.insert("Delhi".to_string(), 5);
        profile.devices.insert("dev-x1".to_string(), 3);
        profile.time_slots.insert(TimeSlot::Morning, 3);
        profile
    }

    #[test]
    fn test_familiar_transaction_scores_zero() {
        let model = ProfileRiskModel::new();
        assert_eq!(model.score(&settled(), &tx(50.0, "Delhi", "dev-x1", 9)), 0.0);
    }

    #[test]
    fn test_each_novelty_adds_weight() {
        let model = ProfileRiskModel::new();
        let profile = settled();

        assert_eq!(model.score(&profile, &tx(500.0, "Delhi", "dev-x1", 9)), 0.2);
        assert_eq!(model.score(&profile, &tx(50.0, "Pune", "dev-x1", 9)), 0.2);
        assert_eq!(model.score(&profile, &tx(50.0, "Delhi", "dev-new", 9)), 0.2);
        assert_eq!(model.score(&profile, &tx(50.0, "Delhi", "dev-x1", 23)), 0.2);
        assert_eq!(model.score(&profile, &tx(500.0, "Pune", "dev-new", 23)), 0.8);
    }

    #[test]
    fn test_city_seen_once_is_still_novel() {
        let mut profile = settled();
        profile.cities.insert("Pune".to_string(), 1);
        let model = ProfileRiskModel::new();
        assert_eq!(model.score(&profile, &tx(50.0, "Pune", "dev-x1", 9)), 0.2);
    }

    #[test]
    fn test_empty_profile() {
        let model = ProfileRiskModel::new();
        let score = model.score(&BehaviorProfile::default(), &tx(50.0, "Delhi", "dev-x1", 9));
        // No amount deviation; city, device and slot are all new
        assert_eq!(score, 0.6);
    }

    #[test]
    fn test_scattered_footprint_entropy() {
        let mut profile = settled();
        for i in 0..5 {
            profile.cities.insert(format!("city-{i}"), 2);
            profile.devices.insert(format!("dev-{i}"), 2);
        }
        let model = ProfileRiskModel::new();
        // 12 roughly even counts: entropy ~2.43
        assert_eq!(model.score(&profile, &tx(50.0, "Delhi", "dev-x1", 9)), 0.25);
    }
}
