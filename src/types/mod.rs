//! Type definitions for the fraud-risk engine

pub mod context;
pub mod result;
pub mod timestamp;
pub mod transaction;

pub use context::{BehaviorProfile, RiskHistory, RollingWindow, ScoringRequest, WindowEntry};
pub use result::{Category, DetectionResult};
pub use transaction::{AmountBucket, TimeSlot, TransactionEvent};
