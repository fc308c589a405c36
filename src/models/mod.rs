//! Scoring models and the engine that combines them

pub mod aggregator;
pub mod classifier;
pub mod engine;
pub mod profile;
pub mod threshold;

pub use aggregator::RiskAggregator;
pub use classifier::{classify, Verdict};
pub use engine::{Assessment, FraudEngine};
pub use profile::ProfileRiskModel;
pub use threshold::AdaptiveThresholder;
