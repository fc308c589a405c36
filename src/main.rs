//! Fraud Risk Engine - Main Entry Point
//!
//! Consumes scoring requests from NATS, scores each transaction, and
//! publishes detection results. Requests are scored in parallel up to the
//! configured worker count.

use anyhow::Result;
use fraud_risk_engine::{
    config::{AppConfig, LoggingConfig},
    consumer::RequestConsumer,
    geo::Gazetteer,
    metrics::{MetricsReporter, PipelineMetrics},
    models::engine::FraudEngine,
    producer::{ResultProducer, ScoredTransaction},
    types::context::ScoringRequest,
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("fraud_risk_engine={}", logging.level).parse()?);

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    info!("Starting Fraud Risk Engine");
    info!(
        "Default threshold: {:.2}, adaptive after {} scores (p{} of last {}, clamped to [{:.2}, {:.2}])",
        config.detection.default_threshold,
        config.detection.min_history,
        config.detection.percentile,
        config.detection.history_window,
        config.detection.threshold_floor,
        config.detection.threshold_ceiling
    );

    // Initialize metrics
    let metrics = Arc::new(PipelineMetrics::new());

    // Load the city dataset and build the engine
    let gazetteer = Gazetteer::install(Gazetteer::from_config(&config.gazetteer)?)?;
    info!("Gazetteer initialized ({} cities)", gazetteer.len());

    let engine = Arc::new(FraudEngine::new(gazetteer, &config.detection));
    info!(
        "Signal extractor initialized ({} signals): {:?}",
        engine.extractor().signal_count(),
        engine.extractor().signal_names()
    );

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = RequestConsumer::new(client.clone(), &config.nats.request_subject);
    let producer = Arc::new(ResultProducer::new(client.clone(), &config.nats.result_subject));

    let num_workers = config.pipeline.workers.max(1);
    info!("Starting scoring loop with {} parallel workers", num_workers);
    info!("Listening on subject: {}", consumer.subject());
    info!("Publishing results to: {}", producer.subject());

    // Semaphore to limit concurrent scoring
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    let reporter = MetricsReporter::new(metrics.clone(), config.pipeline.metrics_interval_secs);
    tokio::spawn(reporter.start());

    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        let permit = semaphore.clone().acquire_owned().await?;

        let engine = engine.clone();
        let producer = producer.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            let request = match serde_json::from_slice::<ScoringRequest>(&message.payload) {
                Ok(request) => request,
                Err(e) => {
                    metrics.record_failure("decode");
                    warn!(error = %e, "Failed to deserialize scoring request");
                    return;
                }
            };

            let request_id = request
                .request_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            let result = match engine.score_request(&request) {
                Ok(result) => result,
                Err(e) => {
                    metrics.record_failure("invalid_input");
                    warn!(
                        request_id = %request_id,
                        user_id = %request.transaction.user_id,
                        error = %e,
                        "Rejected scoring request"
                    );
                    return;
                }
            };

            let processing_time = start_time.elapsed();
            metrics.record_result(processing_time, &result);

            if result.fraud {
                info!(
                    request_id = %request_id,
                    user_id = %result.user_id,
                    score = result.score,
                    category = %result.category,
                    alerts = ?result.alerts,
                    processing_time_us = processing_time.as_micros(),
                    "Transaction flagged as fraud"
                );
            } else {
                debug!(
                    request_id = %request_id,
                    score = result.score,
                    category = %result.category,
                    processing_time_us = processing_time.as_micros(),
                    "Transaction scored (below threshold)"
                );
            }

            let scored = ScoredTransaction::new(request_id, result);
            if let Err(e) = producer.publish(&scored).await {
                metrics.record_failure("publish");
                error!(
                    request_id = %scored.request_id,
                    error = %e,
                    "Failed to publish detection result"
                );
            }

            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

            // Log progress every 100 requests
            if count % 100 == 0 {
                let processing_stats = metrics.get_processing_stats();
                info!(
                    processed = count,
                    throughput = format!("{:.1} req/s", metrics.get_throughput()),
                    avg_latency_us = processing_stats.mean_us,
                    "Processing milestone"
                );
            }

            drop(permit);
        });
    }

    info!("Engine shutting down...");
    metrics.print_summary();

    Ok(())
}
