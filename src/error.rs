//! Error types for the scoring contract.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Caller contract violations detected before any signal is computed.
///
/// Degraded city lookups and degenerate statistics are not errors; they are
/// absorbed as data by the scoring rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// Transaction amount is zero, negative or not a number.
    #[error("transaction amount must be positive and finite, got {0}")]
    InvalidAmount(f64),

    /// No prior transaction to measure travel velocity against.
    #[error("rolling window is empty: at least one prior transaction is required for the travel check")]
    EmptyWindow,

    /// A rolling-window entry carries an unusable amount.
    #[error("rolling window entry {index} has invalid amount {amount}")]
    InvalidWindowAmount {
        /// Position in the window.
        index: usize,
        /// Offending amount.
        amount: f64,
    },

    /// Rolling-window entries are not ordered oldest to newest.
    #[error("rolling window is not chronological: entry {index} precedes its predecessor")]
    NonChronologicalWindow {
        /// Position of the first out-of-order entry.
        index: usize,
    },

    /// The newest window entry is later than the transaction being scored.
    #[error("rolling window entry at {newest} is later than the transaction at {transaction}")]
    WindowAfterTransaction {
        /// Timestamp of the newest window entry.
        newest: NaiveDateTime,
        /// Timestamp of the transaction.
        transaction: NaiveDateTime,
    },

    /// Velocity is negative or not a number.
    #[error("current velocity must be finite and non-negative, got {0}")]
    InvalidVelocity(f64),

    /// A past amount in the behavior profile is negative or not a number.
    #[error("profile amount {index} must be finite and non-negative, got {amount}")]
    InvalidProfileAmount {
        /// Position in the profile's amounts.
        index: usize,
        /// Offending amount.
        amount: f64,
    },

    /// A historical risk score is not a number.
    #[error("risk history entry {index} is not a finite score: {score}")]
    InvalidHistoryScore {
        /// Position in the history.
        index: usize,
        /// Offending score.
        score: f64,
    },
}

/// Result type alias using `ScoringError`.
pub type Result<T> = std::result::Result<T, ScoringError>;
