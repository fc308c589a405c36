//! Fraud Risk Engine Library
//!
//! Real-time risk scoring for payment transactions. Each call blends
//! rolling-window anomaly signals with a long-lived behavior profile,
//! classifies the result, and flags fraud against a per-user adaptive
//! threshold.

pub mod config;
pub mod consumer;
pub mod error;
pub mod geo;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod signal_extractor;
pub mod stats;
pub mod types;

pub use config::AppConfig;
pub use consumer::RequestConsumer;
pub use error::ScoringError;
pub use geo::{CityInfo, Gazetteer, GeoResolver};
pub use models::engine::{Assessment, FraudEngine};
pub use producer::{ResultProducer, ScoredTransaction};
pub use signal_extractor::SignalExtractor;
pub use types::{
    context::{BehaviorProfile, RiskHistory, RollingWindow, ScoringRequest},
    result::{Category, DetectionResult},
    transaction::TransactionEvent,
};
