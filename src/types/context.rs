//! Caller-owned behavioral context threaded into every scoring call.
//!
//! None of these values is retained or mutated by the engine. Callers keep
//! them up to date between calls and must hand each call a consistent
//! snapshot.

use crate::error::ScoringError;
use crate::types::transaction::{AmountBucket, TimeSlot, TransactionEvent};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Long-lived behavior profile of a single user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BehaviorProfile {
    /// Past transaction amounts, oldest first
    pub amounts: Vec<f64>,
    /// Occurrences per city name
    pub cities: BTreeMap<String, u32>,
    /// Occurrences per device id
    pub devices: BTreeMap<String, u32>,
    /// Occurrences per time-of-day slot
    pub time_slots: BTreeMap<TimeSlot, u32>,
}

impl BehaviorProfile {
    pub fn city_count(&self, city: &str) -> u32 {
        self.cities.get(city).copied().unwrap_or(0)
    }

    pub fn device_count(&self, device_id: &str) -> u32 {
        self.devices.get(device_id).copied().unwrap_or(0)
    }

    pub fn slot_count(&self, slot: TimeSlot) -> u32 {
        self.time_slots.get(&slot).copied().unwrap_or(0)
    }

    /// Past amounts must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ScoringError> {
        match self
            .amounts
            .iter()
            .position(|a| !a.is_finite() || *a < 0.0)
        {
            Some(index) => Err(ScoringError::InvalidProfileAmount {
                index,
                amount: self.amounts[index],
            }),
            None => Ok(()),
        }
    }
}

/// One prior transaction inside the rolling window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowEntry {
    pub amount: f64,
    #[serde(with = "crate::types::timestamp")]
    pub timestamp: NaiveDateTime,
}

impl WindowEntry {
    pub fn new(amount: f64, timestamp: NaiveDateTime) -> Self {
        Self { amount, timestamp }
    }
}

/// Short-term activity context supplied with each call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingWindow {
    /// Recent transactions, oldest first
    pub recent_transactions: Vec<WindowEntry>,
    /// Devices seen recently
    pub recent_devices: BTreeSet<String>,
    /// Recent occurrences per time slot
    pub recent_time_slots: BTreeMap<TimeSlot, u32>,
    /// Recent occurrences per amount bucket
    pub recent_amount_buckets: BTreeMap<AmountBucket, u32>,
    /// Caller-computed transaction velocity
    pub current_velocity: f64,
    /// City of the previous transaction
    pub last_city: String,
}

impl RollingWindow {
    /// Newest prior transaction, the reference point for travel speed.
    pub fn latest(&self) -> Result<&WindowEntry, ScoringError> {
        self.recent_transactions
            .last()
            .ok_or(ScoringError::EmptyWindow)
    }

    pub fn slot_count(&self, slot: TimeSlot) -> u32 {
        self.recent_time_slots.get(&slot).copied().unwrap_or(0)
    }

    pub fn bucket_count(&self, bucket: AmountBucket) -> u32 {
        self.recent_amount_buckets.get(&bucket).copied().unwrap_or(0)
    }

    /// Most frequent recent bucket. Ties go to the least severe bucket.
    pub fn dominant_bucket(&self) -> Option<AmountBucket> {
        self.recent_amount_buckets
            .iter()
            .fold(None, |best: Option<(AmountBucket, u32)>, (&bucket, &count)| {
                match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((bucket, count)),
                }
            })
            .map(|(bucket, _)| bucket)
    }

    /// Check the window against the transaction it accompanies.
    ///
    /// The window must be non-empty, chronological, and must not contain
    /// entries later than the transaction itself.
    pub fn validate(&self, at: NaiveDateTime) -> Result<(), ScoringError> {
        if !self.current_velocity.is_finite() || self.current_velocity < 0.0 {
            return Err(ScoringError::InvalidVelocity(self.current_velocity));
        }

        let newest = self.latest()?;

        for (index, entry) in self.recent_transactions.iter().enumerate() {
            if !entry.amount.is_finite() || entry.amount < 0.0 {
                return Err(ScoringError::InvalidWindowAmount {
                    index,
                    amount: entry.amount,
                });
            }
        }

        if let Some(index) = self
            .recent_transactions
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
        {
            return Err(ScoringError::NonChronologicalWindow { index: index + 1 });
        }

        if newest.timestamp > at {
            return Err(ScoringError::WindowAfterTransaction {
                newest: newest.timestamp,
                transaction: at,
            });
        }

        Ok(())
    }
}

/// Previously computed scores for one user, oldest first.
///
/// The engine only reads this. Persisting the score of each call (by
/// appending it with [`RiskHistory::record`]) is the caller's job; nothing
/// accumulates across calls otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskHistory {
    scores: Vec<f64>,
}

impl RiskHistory {
    pub fn new(scores: Vec<f64>) -> Self {
        Self { scores }
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Append the score of a completed call.
    pub fn record(&mut self, score: f64) {
        self.scores.push(score);
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        match self.scores.iter().position(|s| !s.is_finite()) {
            Some(index) => Err(ScoringError::InvalidHistoryScore {
                index,
                score: self.scores[index],
            }),
            None => Ok(()),
        }
    }
}

impl From<Vec<f64>> for RiskHistory {
    fn from(scores: Vec<f64>) -> Self {
        Self::new(scores)
    }
}

/// Everything one scoring call needs, as carried on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRequest {
    /// Correlation id; the service assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub transaction: TransactionEvent,
    #[serde(default)]
    pub profile: BehaviorProfile,
    #[serde(default)]
    pub risk_history: RiskHistory,
    pub window: RollingWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn window(minutes_before: &[i64]) -> RollingWindow {
        RollingWindow {
            recent_transactions: minutes_before
                .iter()
                .map(|m| WindowEntry::new(50.0, base() - Duration::minutes(*m)))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dominant_bucket_prefers_least_severe_on_tie() {
        let mut w = RollingWindow::default();
        assert_eq!(w.dominant_bucket(), None);

        w.recent_amount_buckets.insert(AmountBucket::High, 3);
        w.recent_amount_buckets.insert(AmountBucket::Low, 3);
        w.recent_amount_buckets.insert(AmountBucket::Micro, 1);
        assert_eq!(w.dominant_bucket(), Some(AmountBucket::Low));

        w.recent_amount_buckets.insert(AmountBucket::Critical, 4);
        assert_eq!(w.dominant_bucket(), Some(AmountBucket::Critical));
    }

    #[test]
    fn test_validate_window() {
        assert!(window(&[40, 30, 20, 10]).validate(base()).is_ok());
        assert!(window(&[0]).validate(base()).is_ok());

        assert_eq!(
            window(&[]).validate(base()),
            Err(ScoringError::EmptyWindow)
        );
        assert_eq!(
            window(&[40, 10, 20]).validate(base()),
            Err(ScoringError::NonChronologicalWindow { index: 2 })
        );
        assert!(matches!(
            window(&[20, -5]).validate(base()),
            Err(ScoringError::WindowAfterTransaction { .. })
        ));

        let mut fast = window(&[10]);
        fast.current_velocity = -1.0;
        assert_eq!(
            fast.validate(base()),
            Err(ScoringError::InvalidVelocity(-1.0))
        );
    }

    #[test]
    fn test_validate_profile_amounts() {
        let mut profile = BehaviorProfile {
            amounts: vec![120.0, 0.0, 80.0],
            ..Default::default()
        };
        assert!(profile.validate().is_ok());
        assert!(BehaviorProfile::default().validate().is_ok());

        profile.amounts[1] = -100.0;
        assert_eq!(
            profile.validate(),
            Err(ScoringError::InvalidProfileAmount { index: 1, amount: -100.0 })
        );

        profile.amounts = vec![50.0, f64::NAN];
        assert!(matches!(
            profile.validate(),
            Err(ScoringError::InvalidProfileAmount { index: 1, .. })
        ));
    }

    #[test]
    fn test_risk_history_is_caller_appended() {
        let mut history = RiskHistory::from(vec![0.1, 0.2]);
        history.record(0.35);
        assert_eq!(history.scores(), &[0.1, 0.2, 0.35]);

        history.record(f64::INFINITY);
        assert!(matches!(
            history.validate(),
            Err(ScoringError::InvalidHistoryScore { index: 3, .. })
        ));
    }

    #[test]
    fn test_scoring_request_deserialization() {
        let json = r#"{
            "transaction": {
                "amount": 250.0, "city": "Mumbai", "deviceId": "dev-x1",
                "userId": "user_999", "timestamp": "2026-03-10 10:00:00"
            },
            "profile": {
                "amounts": [199.0, 240.0],
                "cities": {"Delhi": 4},
                "devices": {"dev-x1": 5},
                "timeSlots": {"morning": 3}
            },
            "riskHistory": [0.1, 0.17],
            "window": {
                "recentTransactions": [{"amount": 200.0, "timestamp": "2026-03-10 09:50:00"}],
                "recentDevices": ["dev-old"],
                "recentTimeSlots": {"morning": 3, "evening": 2},
                "recentAmountBuckets": {"low": 4, "micro": 10},
                "currentVelocity": 7,
                "lastCity": "Mumbai"
            }
        }"#;

        let request: ScoringRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.request_id, None);
        assert_eq!(request.profile.slot_count(TimeSlot::Morning), 3);
        assert_eq!(request.risk_history.len(), 2);
        assert_eq!(request.window.bucket_count(AmountBucket::Micro), 10);
        assert_eq!(request.window.dominant_bucket(), Some(AmountBucket::Micro));
        assert_eq!(request.window.current_velocity, 7.0);
    }
}
