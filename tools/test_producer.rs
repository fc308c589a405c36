//! Test Request Producer
//!
//! Generates scoring requests and publishes them to NATS for end-to-end
//! testing of the engine.

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Timelike};
use fraud_risk_engine::types::{
    AmountBucket, BehaviorProfile, RiskHistory, RollingWindow, ScoringRequest, TimeSlot,
    TransactionEvent, WindowEntry,
};
use rand::Rng;
use std::time::Duration;
use tracing::{info, warn};

const HOME_CITIES: &[&str] = &["Mumbai", "Delhi", "Bangalore", "Chennai", "Pune", "Jaipur"];
const FAR_CITIES: &[&str] = &["London", "New York City", "Singapore", "Dubai", "Vaduz"];

/// Scoring request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
        }
    }

    fn now() -> NaiveDateTime {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }

    /// Window of `count` transactions ending `gap_minutes` before `at`
    fn window_before(&mut self, at: NaiveDateTime, count: usize, gap_minutes: i64, amount: f64) -> Vec<WindowEntry> {
        (0..count)
            .rev()
            .map(|i| {
                let minutes = gap_minutes * (i as i64 + 1);
                let jitter = self.rng.gen_range(0.9..1.1);
                WindowEntry::new(amount * jitter, at - ChronoDuration::minutes(minutes))
            })
            .collect()
    }

    fn history(&mut self, len: usize, low: f64, high: f64) -> RiskHistory {
        (0..len)
            .map(|_| (self.rng.gen_range(low..high) * 10_000.0f64).round() / 10_000.0)
            .collect::<Vec<_>>()
            .into()
    }

    /// Generate a request for routine activity
    fn generate_legitimate(&mut self) -> ScoringRequest {
        self.request_counter += 1;
        let user = self.rng.gen_range(1..500);
        let city = self.random_choice(HOME_CITIES);
        let device = format!("dev-{:04x}", user);
        let at = Self::now();
        let typical = self.rng.gen_range(50.0..500.0);
        let slot = TimeSlot::from_hour(at.hour());

        let mut profile = BehaviorProfile {
            amounts: (0..20).map(|_| typical * self.rng.gen_range(0.8..1.2)).collect(),
            ..Default::default()
        };
        profile.cities.insert(city.to_string(), self.rng.gen_range(5..40));
        profile.devices.insert(device.clone(), self.rng.gen_range(5..40));
        profile.time_slots.insert(slot, self.rng.gen_range(5..20));

        let mut window = RollingWindow {
            recent_transactions: self.window_before(at, 5, 45, typical),
            current_velocity: self.rng.gen_range(0.5..2.0),
            last_city: city.to_string(),
            ..Default::default()
        };
        window.recent_devices.insert(device.clone());
        window.recent_time_slots.insert(slot, self.rng.gen_range(2..6));
        window
            .recent_amount_buckets
            .insert(AmountBucket::from_amount(typical), 5);

        let history_len = self.rng.gen_range(0..30);
        ScoringRequest {
            request_id: Some(format!("req_{:012}", self.request_counter)),
            transaction: TransactionEvent::new(
                typical * self.rng.gen_range(0.8..1.2),
                city,
                device,
                format!("user_{}", user),
                at,
            ),
            profile,
            risk_history: self.history(history_len, 0.0, 0.3),
            window,
        }
    }

    /// Generate a request with anomalous travel, device, and amount
    fn generate_suspicious(&mut self) -> ScoringRequest {
        self.request_counter += 1;
        let user = self.rng.gen_range(1..500);
        let home = self.random_choice(HOME_CITIES);
        let far = self.random_choice(FAR_CITIES);
        let now = Self::now();
        // Night-time transaction
        let at = now.date().and_hms_opt(self.rng.gen_range(1..5), 0, 0).unwrap_or(now);

        let mut profile = BehaviorProfile {
            amounts: (0..20).map(|_| self.rng.gen_range(80.0..150.0)).collect(),
            ..Default::default()
        };
        profile.cities.insert(home.to_string(), 20);
        profile.devices.insert(format!("dev-{:04x}", user), 20);
        profile.time_slots.insert(TimeSlot::Evening, 15);

        let mut window = RollingWindow {
            recent_transactions: self.window_before(at, 5, 10, 100.0),
            current_velocity: self.rng.gen_range(5.0..12.0),
            last_city: home.to_string(),
            ..Default::default()
        };
        window.recent_devices.insert(format!("dev-{:04x}", user));
        window.recent_time_slots.insert(TimeSlot::Evening, 5);
        window.recent_amount_buckets.insert(AmountBucket::Low, 5);

        let history_len = self.rng.gen_range(0..30);
        ScoringRequest {
            request_id: Some(format!("req_{:012}", self.request_counter)),
            transaction: TransactionEvent::new(
                self.rng.gen_range(20_000.0..80_000.0),
                far,
                format!("dev-{:016x}", self.rng.gen::<u64>()),
                format!("user_{}", user),
                at,
            ),
            profile,
            risk_history: self.history(history_len, 0.1, 0.5),
            window,
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args.get(2).map(|s| s.as_str()).unwrap_or("risk.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            return run_dry_mode(count, fraud_rate, delay_ms).await;
        }
    };

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} requests...", count);

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        let payload = serde_json::to_vec(&request)?;
        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} requests ({} legitimate, {} suspicious)",
                i + 1,
                count,
                legitimate_count,
                suspicious_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    client.flush().await?;

    info!(
        "Completed! Published {} requests ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
