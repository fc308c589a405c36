//! NATS message producer for detection results

use crate::types::result::DetectionResult;
use anyhow::Result;
use async_nats::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Detection result tagged with the request it answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredTransaction {
    pub request_id: String,
    #[serde(flatten)]
    pub result: DetectionResult,
}

impl ScoredTransaction {
    pub fn new(request_id: impl Into<String>, result: DetectionResult) -> Self {
        Self {
            request_id: request_id.into(),
            result,
        }
    }
}

/// Producer for publishing detection results to NATS
#[derive(Clone)]
pub struct ResultProducer {
    client: Client,
    subject: String,
}

impl ResultProducer {
    /// Create a new result producer
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish one scored transaction
    pub async fn publish(&self, scored: &ScoredTransaction) -> Result<()> {
        let payload = serde_json::to_vec(scored)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            request_id = %scored.request_id,
            user_id = %scored.result.user_id,
            score = scored.result.score,
            fraud = scored.result.fraud,
            "Published detection result"
        );

        Ok(())
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::result::Category;
    use chrono::NaiveDate;

    #[test]
    fn test_envelope_is_flat() {
        let result = DetectionResult {
            fraud: true,
            score: 0.7,
            category: Category::Alert,
            alerts: vec!["High transaction velocity".to_string()],
            user_id: "user_3".to_string(),
            city: "Mumbai".to_string(),
            device_id: "dev-bot".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 10)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
        };
        let json = serde_json::to_value(ScoredTransaction::new("req-9", result.clone())).unwrap();

        assert_eq!(json["requestId"], "req-9");
        assert_eq!(json["userId"], "user_3");
        assert_eq!(json["category"], serde_json::json!(["Alert", 2]));
        assert_eq!(json["timestamp"], "2026-03-10 14:00:00");

        let back: ScoredTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(back.result, result);
    }
}
