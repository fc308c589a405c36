//! Configuration management for the fraud-risk engine

use crate::geo::gazetteer::DEFAULT_MATCH_CUTOFF;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub gazetteer: GazetteerConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Subject for incoming scoring requests
    pub request_subject: String,
    /// Subject for outgoing detection results
    pub result_subject: String,
}

/// Adaptive threshold parameters
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Fraud threshold for users without enough history
    pub default_threshold: f64,
    /// History length below which the default threshold applies
    pub min_history: usize,
    /// Number of most recent scores the percentile is taken over
    pub history_window: usize,
    /// Percentile (0-100) of recent scores used as the threshold
    pub percentile: f64,
    /// Lowest adaptive threshold allowed
    pub threshold_floor: f64,
    /// Highest adaptive threshold allowed
    pub threshold_ceiling: f64,
    /// Weight of the rolling-window rule score in the final score
    pub rule_weight: f64,
    /// Weight of the behavior-profile score in the final score
    pub profile_weight: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.65,
            min_history: 10,
            history_window: 50,
            percentile: 85.0,
            threshold_floor: 0.05,
            threshold_ceiling: 0.95,
            rule_weight: 1.0,
            profile_weight: 1.0,
        }
    }
}

/// City dataset configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GazetteerConfig {
    /// JSON city dataset; the embedded dataset is used when unset
    pub data_path: Option<String>,
    /// Minimum similarity for correcting a misspelled city name
    pub match_cutoff: f64,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            match_cutoff: DEFAULT_MATCH_CUTOFF,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of requests scored concurrently
    pub workers: usize,
    /// Interval between metrics summaries in seconds
    #[serde(default = "default_metrics_interval")]
    pub metrics_interval_secs: u64,
}

fn default_metrics_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    ///
    /// Environment variables prefixed with `RISK__` override file values,
    /// e.g. `RISK__NATS__URL`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("RISK").prefix_separator("__").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                request_subject: "risk.requests".to_string(),
                result_subject: "risk.results".to_string(),
            },
            detection: DetectionConfig::default(),
            gazetteer: GazetteerConfig::default(),
            pipeline: PipelineConfig {
                workers: 4,
                metrics_interval_secs: default_metrics_interval(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.nats.url, "nats://localhost:4222");
        assert_eq!(config.detection.default_threshold, 0.65);
        assert_eq!(config.detection.min_history, 10);
        assert_eq!(config.detection.history_window, 50);
        assert_eq!(config.gazetteer.match_cutoff, 0.7);
        assert!(config.gazetteer.data_path.is_none());
    }

    #[test]
    fn test_shipped_config_file_loads() {
        let config = AppConfig::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/config/config.toml"
        ))
        .unwrap();

        assert_eq!(config.detection, DetectionConfig::default());
        assert_eq!(config.nats.request_subject, "risk.requests");
        assert_eq!(config.pipeline.workers, 4);
    }
}
