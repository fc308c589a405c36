//! Detection result data structures

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound (inclusive) of the Safe band
pub const SAFE_MAX: f64 = 0.25;

/// Upper bound (inclusive) of the Suspicious band
pub const SUSPICIOUS_MAX: f64 = 0.65;

/// Severity category, serialized as `[name, code]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "CategoryRepr", try_from = "CategoryRepr")]
pub enum Category {
    Safe,
    Suspicious,
    Alert,
}

impl Category {
    /// Determine category from a final score.
    ///
    /// The bands are fixed and do not move with the adaptive threshold.
    pub fn from_score(score: f64) -> Self {
        if score <= SAFE_MAX {
            Category::Safe
        } else if score <= SUSPICIOUS_MAX {
            Category::Suspicious
        } else {
            Category::Alert
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Category::Safe => 0,
            Category::Suspicious => 1,
            Category::Alert => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Safe => "Safe",
            Category::Suspicious => "Suspicious",
            Category::Alert => "Alert",
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Category::Safe),
            1 => Some(Category::Suspicious),
            2 => Some(Category::Alert),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Serialize, Deserialize)]
struct CategoryRepr(String, u8);

impl From<Category> for CategoryRepr {
    fn from(category: Category) -> Self {
        CategoryRepr(category.name().to_string(), category.code())
    }
}

impl TryFrom<CategoryRepr> for Category {
    type Error = String;

    fn try_from(repr: CategoryRepr) -> Result<Self, Self::Error> {
        match Category::from_code(repr.1) {
            Some(category) if category.name() == repr.0 => Ok(category),
            _ => Err(format!("unknown category [{}, {}]", repr.0, repr.1)),
        }
    }
}

/// Verdict for one scored transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Whether the score reached the user's adaptive threshold
    pub fraud: bool,

    /// Final risk score (0.0 - 1.0, 4 decimals)
    pub score: f64,

    /// Severity category from the fixed bands
    pub category: Category,

    /// Rationale strings in the order the signals fired
    pub alerts: Vec<String>,

    pub user_id: String,
    pub city: String,
    pub device_id: String,

    #[serde(with = "crate::types::timestamp")]
    pub timestamp: NaiveDateTime,
}
