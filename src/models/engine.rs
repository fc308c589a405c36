//! Single-call fraud scoring: signals, profile risk, blend, threshold, verdict

use crate::config::DetectionConfig;
use crate::error::ScoringError;
use crate::geo::{Gazetteer, GeoResolver};
use crate::models::aggregator::RiskAggregator;
use crate::models::classifier::classify;
use crate::models::profile::ProfileRiskModel;
use crate::models::threshold::AdaptiveThresholder;
use crate::signal_extractor::{RuleAssessment, SignalExtractor};
use crate::types::context::{BehaviorProfile, RiskHistory, RollingWindow, ScoringRequest};
use crate::types::result::DetectionResult;
use crate::types::transaction::TransactionEvent;
use tracing::debug;

/// Full breakdown of one scoring call
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    /// Rolling-window rule signals
    pub rules: RuleAssessment,
    /// Long-lived profile score
    pub profile_score: f64,
    /// Fraud threshold in effect for this user
    pub threshold: f64,
    /// Caller-facing verdict
    pub result: DetectionResult,
}

/// Stateless fraud scorer.
///
/// Holds only configuration and a read-only geo resolver, so one instance
/// can be shared across threads and reused for any number of users.
pub struct FraudEngine<G> {
    geo: G,
    extractor: SignalExtractor,
    profile_model: ProfileRiskModel,
    aggregator: RiskAggregator,
    thresholder: AdaptiveThresholder,
    default_threshold: f64,
}

impl FraudEngine<&'static Gazetteer> {
    /// Engine backed by the process-wide gazetteer
    pub fn with_global_gazetteer(config: &DetectionConfig) -> Self {
        Self::new(Gazetteer::global(), config)
    }
}

impl<G: GeoResolver> FraudEngine<G> {
    /// Create a new engine from a resolver and detection configuration
    pub fn new(geo: G, config: &DetectionConfig) -> Self {
        Self {
            geo,
            extractor: SignalExtractor::new(),
            profile_model: ProfileRiskModel::new(),
            aggregator: RiskAggregator::from_config(config),
            thresholder: AdaptiveThresholder::new(config),
            default_threshold: config.default_threshold,
        }
    }

    /// Fraud threshold applied to users with too little history
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold
    }

    pub fn extractor(&self) -> &SignalExtractor {
        &self.extractor
    }

    /// Score one transaction.
    ///
    /// Inputs are validated before any signal runs. Nothing passed in is
    /// modified; appending the returned score to `history` is up to the
    /// caller.
    pub fn score(
        &self,
        tx: &TransactionEvent,
        profile: &BehaviorProfile,
        history: &RiskHistory,
        window: &RollingWindow,
    ) -> Result<DetectionResult, ScoringError> {
        self.assess(tx, profile, history, window)
            .map(|assessment| assessment.result)
    }

    /// Score a wire request
    pub fn score_request(&self, request: &ScoringRequest) -> Result<DetectionResult, ScoringError> {
        self.score(
            &request.transaction,
            &request.profile,
            &request.risk_history,
            &request.window,
        )
    }

    /// Score one transaction and keep the intermediate scores.
    pub fn assess(
        &self,
        tx: &TransactionEvent,
        profile: &BehaviorProfile,
        history: &RiskHistory,
        window: &RollingWindow,
    ) -> Result<Assessment, ScoringError> {
        tx.validate()?;
        window.validate(tx.timestamp)?;
        profile.validate()?;
        history.validate()?;

        let current = self.geo.resolve(&tx.city);
        let last = self.geo.resolve(&window.last_city);

        let rules = self.extractor.extract(tx, window, &current, &last)?;
        let profile_score = self.profile_model.score(profile, tx);
        let score = self.aggregator.aggregate(rules.score, profile_score);

        let threshold = self.thresholder.threshold(history, self.default_threshold);
        let verdict = classify(score, threshold);

        debug!(
            user_id = %tx.user_id,
            rule_score = rules.score,
            profile_score = profile_score,
            score = score,
            threshold = threshold,
            category = %verdict.category,
            fraud = verdict.fraud,
            "Transaction scored"
        );

        let result = DetectionResult {
            fraud: verdict.fraud,
            score,
            category: verdict.category,
            alerts: rules.alerts.clone(),
            user_id: tx.user_id.clone(),
            city: tx.city.clone(),
            device_id: tx.device_id.clone(),
            timestamp: tx.timestamp,
        };

        Ok(Assessment {
            rules,
            profile_score,
            threshold,
            result,
        })
    }
}
