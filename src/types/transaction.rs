//! Transaction data structures and the discretizations applied to them

use crate::error::ScoringError;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single transaction to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    /// Transaction amount, strictly positive
    pub amount: f64,

    /// Free-text city name as reported by the payment channel
    pub city: String,

    /// Device identifier the transaction originated from
    pub device_id: String,

    /// Account identifier
    pub user_id: String,

    /// Wall-clock time of the transaction
    #[serde(with = "crate::types::timestamp")]
    pub timestamp: NaiveDateTime,
}

impl TransactionEvent {
    /// Create a new transaction event
    pub fn new(
        amount: f64,
        city: impl Into<String>,
        device_id: impl Into<String>,
        user_id: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            amount,
            city: city.into(),
            device_id: device_id.into(),
            user_id: user_id.into(),
            timestamp,
        }
    }

    /// Reject amounts the scoring rules cannot reason about.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ScoringError::InvalidAmount(self.amount));
        }
        Ok(())
    }

    /// Amount bucket of this transaction
    pub fn bucket(&self) -> AmountBucket {
        AmountBucket::from_amount(self.amount)
    }

    /// Time-of-day slot of this transaction
    pub fn slot(&self) -> TimeSlot {
        TimeSlot::from_hour(self.timestamp.hour())
    }
}

/// Discretized amount category, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountBucket {
    Micro,
    Low,
    Medium,
    High,
    Critical,
}

impl AmountBucket {
    pub const ALL: [AmountBucket; 5] = [
        AmountBucket::Micro,
        AmountBucket::Low,
        AmountBucket::Medium,
        AmountBucket::High,
        AmountBucket::Critical,
    ];

    /// Bucket an amount. Upper bounds are inclusive.
    pub fn from_amount(amount: f64) -> Self {
        if amount <= 10.0 {
            AmountBucket::Micro
        } else if amount <= 500.0 {
            AmountBucket::Low
        } else if amount <= 5_000.0 {
            AmountBucket::Medium
        } else if amount <= 50_000.0 {
            AmountBucket::High
        } else {
            AmountBucket::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountBucket::Micro => "micro",
            AmountBucket::Low => "low",
            AmountBucket::Medium => "medium",
            AmountBucket::High => "high",
            AmountBucket::Critical => "critical",
        }
    }
}

impl fmt::Display for AmountBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Six-hour time-of-day slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    /// Slot for an hour of day: `[0,6)`, `[6,12)`, `[12,18)`, `[18,24)`.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeSlot::Night,
            6..=11 => TimeSlot::Morning,
            12..=17 => TimeSlot::Afternoon,
            _ => TimeSlot::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSlot::Night => "night",
            TimeSlot::Morning => "morning",
            TimeSlot::Afternoon => "afternoon",
            TimeSlot::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_bucket_boundaries_are_inclusive() {
        assert_eq!(AmountBucket::from_amount(10.0), AmountBucket::Micro);
        assert_eq!(AmountBucket::from_amount(10.01), AmountBucket::Low);
        assert_eq!(AmountBucket::from_amount(500.0), AmountBucket::Low);
        assert_eq!(AmountBucket::from_amount(5_000.0), AmountBucket::Medium);
        assert_eq!(AmountBucket::from_amount(50_000.0), AmountBucket::High);
        assert_eq!(AmountBucket::from_amount(50_000.5), AmountBucket::Critical);
    }

    #[test]
    fn test_time_slots() {
        assert_eq!(TimeSlot::from_hour(0), TimeSlot::Night);
        assert_eq!(TimeSlot::from_hour(5), TimeSlot::Night);
        assert_eq!(TimeSlot::from_hour(6), TimeSlot::Morning);
        assert_eq!(TimeSlot::from_hour(12), TimeSlot::Afternoon);
        assert_eq!(TimeSlot::from_hour(18), TimeSlot::Evening);
        assert_eq!(TimeSlot::from_hour(23), TimeSlot::Evening);
    }

    #[test]
    fn test_validate_rejects_non_positive_amounts() {
        let mut tx = TransactionEvent::new(25.0, "Delhi", "dev-1", "user_1", at(9));
        assert!(tx.validate().is_ok());

        tx.amount = 0.0;
        assert_eq!(tx.validate(), Err(ScoringError::InvalidAmount(0.0)));

        tx.amount = -4.0;
        assert!(tx.validate().is_err());

        tx.amount = f64::NAN;
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_transaction_serialization() {
        let tx = TransactionEvent::new(250.0, "Mumbai", "dev-x1", "user_999", at(14));

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["deviceId"], "dev-x1");
        assert_eq!(json["timestamp"], "2026-03-10 14:30:00");

        let deserialized: TransactionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(tx, deserialized);
        assert_eq!(deserialized.slot(), TimeSlot::Afternoon);
        assert_eq!(deserialized.bucket(), AmountBucket::Low);
    }
}
