//! Rule-based anomaly signals over the rolling window.
//!
//! Each rule inspects one aspect of the transaction against recent activity
//! and may add a fixed weight to the rule score, usually with a
//! human-readable rationale. Rules are evaluated in a fixed order and the
//! rationale strings keep that order.

use crate::error::ScoringError;
use crate::geo::CityInfo;
use crate::stats::{round4, shannon_entropy, LinearFit};
use crate::types::context::RollingWindow;
use crate::types::transaction::{AmountBucket, TransactionEvent};
use serde::Serialize;

const EPSILON_HOURS: f64 = 1e-5;
const EPSILON_AMOUNT: f64 = 1e-6;

const REMOTE_TIER: u8 = 3;
const TRAVEL_MIN_DISTANCE_KM: f64 = 300.0;
const TRAVEL_MAX_SPEED_KMH: f64 = 500.0;
const SLOT_MIN_COUNT: u32 = 2;
const VELOCITY_LIMIT: f64 = 5.0;
const MICRO_ABUSE_COUNT: u32 = 15;
const REGRESSION_MIN_SAMPLES: usize = 5;
const REGRESSION_MAX_DEVIATION: f64 = 0.75;
const BUCKET_ENTROPY_LIMIT: f64 = 1.5;

/// Individual rule of the extractor, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    CityTier,
    ImpossibleTravel,
    NewDevice,
    UnusualTimeSlot,
    UnusualAmountBucket,
    HighVelocity,
    MicroBuildup,
    MicroAbuse,
    HighFrequencyMicro,
    SpendingDeviation,
    BucketEntropy,
}

impl Signal {
    pub const ALL: [Signal; 11] = [
        Signal::CityTier,
        Signal::ImpossibleTravel,
        Signal::NewDevice,
        Signal::UnusualTimeSlot,
        Signal::UnusualAmountBucket,
        Signal::HighVelocity,
        Signal::MicroBuildup,
        Signal::MicroAbuse,
        Signal::HighFrequencyMicro,
        Signal::SpendingDeviation,
        Signal::BucketEntropy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Signal::CityTier => "city_tier",
            Signal::ImpossibleTravel => "impossible_travel",
            Signal::NewDevice => "new_device",
            Signal::UnusualTimeSlot => "unusual_time_slot",
            Signal::UnusualAmountBucket => "unusual_amount_bucket",
            Signal::HighVelocity => "high_velocity",
            Signal::MicroBuildup => "micro_buildup",
            Signal::MicroAbuse => "micro_abuse",
            Signal::HighFrequencyMicro => "high_frequency_micro",
            Signal::SpendingDeviation => "spending_deviation",
            Signal::BucketEntropy => "bucket_entropy",
        }
    }
}

/// Weight one signal added to the rule score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub signal: Signal,
    pub weight: f64,
}

/// Outcome of running every rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleAssessment {
    /// Rule score clamped to `[0, 1]` and rounded to 4 decimals
    pub score: f64,
    /// Rationale strings in firing order
    pub alerts: Vec<String>,
    /// Raw weight per fired signal in firing order
    pub contributions: Vec<Contribution>,
}

impl RuleAssessment {
    fn add(&mut self, signal: Signal, weight: f64, alert: Option<String>) {
        self.score += weight;
        self.contributions.push(Contribution { signal, weight });
        if let Some(alert) = alert {
            self.alerts.push(alert);
        }
    }

    fn finish(mut self) -> Self {
        self.score = round4(self.score.clamp(0.0, 1.0));
        self
    }

    /// Weight a signal contributed, if it fired.
    pub fn weight_of(&self, signal: Signal) -> Option<f64> {
        self.contributions
            .iter()
            .find(|c| c.signal == signal)
            .map(|c| c.weight)
    }

    pub fn fired(&self, signal: Signal) -> bool {
        self.weight_of(signal).is_some()
    }
}

/// Evaluates the rule signals for one transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalExtractor;

impl SignalExtractor {
    /// Create a new signal extractor.
    pub fn new() -> Self {
        Self
    }

    /// Run every rule against the rolling window.
    ///
    /// `current` and `last` are the resolved locations of the transaction's
    /// city and of the window's last city. Fails only when the window has no
    /// prior transaction to measure travel speed against.
    pub fn extract(
        &self,
        tx: &TransactionEvent,
        window: &RollingWindow,
        current: &CityInfo,
        last: &CityInfo,
    ) -> Result<RuleAssessment, ScoringError> {
        let mut out = RuleAssessment::default();
        let bucket = tx.bucket();
        let slot = tx.slot();

        // Remote location
        if current.tier >= REMOTE_TIER {
            out.add(
                Signal::CityTier,
                0.1,
                Some(format!("Tier-{} location", current.tier)),
            );
        }

        // Impossible travel since the newest window entry
        let latest = window.latest()?;
        let distance = current.distance_km(last);
        let minutes = (tx.timestamp - latest.timestamp).num_milliseconds() as f64 / 60_000.0;
        let speed = distance / (minutes / 60.0 + EPSILON_HOURS);
        if distance > TRAVEL_MIN_DISTANCE_KM && speed > TRAVEL_MAX_SPEED_KMH {
            out.add(
                Signal::ImpossibleTravel,
                0.2,
                Some(format!(
                    "Impossible travel: {:.1} km @ {:.1} km/h",
                    distance, speed
                )),
            );
        }

        // Device novelty, weighted by how many devices were already in use
        if !window.recent_devices.contains(&tx.device_id) {
            let diversity = window.recent_devices.len();
            out.add(
                Signal::NewDevice,
                (0.1 + 0.02 * diversity as f64).min(0.2),
                Some(format!("New device used (seen {} before)", diversity)),
            );
        }

        if window.slot_count(slot) < SLOT_MIN_COUNT {
            out.add(
                Signal::UnusualTimeSlot,
                0.1,
                Some(format!("Unusual transaction time ({})", slot)),
            );
        }

        if let Some(dominant) = window.dominant_bucket() {
            if bucket != dominant {
                out.add(
                    Signal::UnusualAmountBucket,
                    0.1,
                    Some(format!(
                        "Unusual amount bucket: {} vs usual {}",
                        bucket, dominant
                    )),
                );
            }
        }

        let high_velocity = window.current_velocity >= VELOCITY_LIMIT;
        if high_velocity {
            out.add(
                Signal::HighVelocity,
                0.2,
                Some("High transaction velocity".to_string()),
            );
        }

        // Microtransaction spam builds up gradually with the recent micro count
        if bucket == AmountBucket::Micro {
            let micro_count = window.bucket_count(AmountBucket::Micro);
            if micro_count > 0 {
                out.add(Signal::MicroBuildup, 0.05 * micro_count as f64, None);
            }
            if micro_count >= MICRO_ABUSE_COUNT {
                out.add(
                    Signal::MicroAbuse,
                    0.25,
                    Some("Microtransaction abuse pattern detected".to_string()),
                );
            }
            if high_velocity {
                out.add(
                    Signal::HighFrequencyMicro,
                    0.1,
                    Some("High-frequency microtransactions".to_string()),
                );
            }
        }

        if let Some(deviation) = Self::trend_deviation(tx, window) {
            if deviation > REGRESSION_MAX_DEVIATION {
                out.add(
                    Signal::SpendingDeviation,
                    0.2,
                    Some(format!("Spending behavior deviation: {:.2}", deviation)),
                );
            }
        }

        if window.recent_amount_buckets.len() > 1 {
            let entropy =
                shannon_entropy(window.recent_amount_buckets.values().map(|&c| c as f64));
            if entropy > BUCKET_ENTROPY_LIMIT {
                out.add(
                    Signal::BucketEntropy,
                    0.1,
                    Some("High spending entropy".to_string()),
                );
            }
        }

        Ok(out.finish())
    }

    /// Relative deviation of the amount from the window's linear spending trend.
    ///
    /// `None` with fewer than five samples or when all samples share one
    /// timestamp.
    pub fn trend_deviation(tx: &TransactionEvent, window: &RollingWindow) -> Option<f64> {
        let entries = &window.recent_transactions;
        if entries.len() < REGRESSION_MIN_SAMPLES {
            return None;
        }

        let origin = entries.first()?.timestamp;
        let elapsed = |ts: chrono::NaiveDateTime| (ts - origin).num_milliseconds() as f64 / 1_000.0;

        let points: Vec<(f64, f64)> = entries
            .iter()
            .map(|e| (elapsed(e.timestamp), e.amount))
            .collect();
        let fit = LinearFit::fit(&points)?;

        let predicted = fit.predict(elapsed(tx.timestamp));
        Some((predicted - tx.amount).abs() / (tx.amount + EPSILON_AMOUNT))
    }

    /// Get the number of signals evaluated.
    pub fn signal_count(&self) -> usize {
        Signal::ALL.len()
    }

    /// Get signal names in evaluation order.
    pub fn signal_names(&self) -> Vec<&'static str> {
        Signal::ALL.iter().map(Signal::name).collect()
    }
}
