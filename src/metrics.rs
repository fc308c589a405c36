//! Performance metrics and statistics tracking for the scoring service.

use crate::types::result::{Category, DetectionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the scoring pipeline
pub struct PipelineMetrics {
    /// Requests scored successfully
    pub requests_scored: AtomicU64,
    /// Results flagged as fraud
    pub fraud_flagged: AtomicU64,
    /// Results per category (Safe, Suspicious, Alert)
    results_by_category: [AtomicU64; 3],
    /// Failures by kind (decode, invalid_input, publish)
    failures: RwLock<HashMap<String, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Risk score distribution buckets
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            requests_scored: AtomicU64::new(0),
            fraud_flagged: AtomicU64::new(0),
            results_by_category: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
            failures: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored request
    pub fn record_result(&self, processing_time: Duration, result: &DetectionResult) {
        self.requests_scored.fetch_add(1, Ordering::Relaxed);
        if result.fraud {
            self.fraud_flagged.fetch_add(1, Ordering::Relaxed);
        }
        self.results_by_category[result.category.code() as usize].fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the most recent samples
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (result.score * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request that could not be scored or delivered
    pub fn record_failure(&self, kind: &str) {
        if let Ok(mut failures) = self.failures.write() {
            *failures.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Get processing time statistics
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let mut sorted: Vec<u64> = match self.processing_times.read() {
            Ok(times) if !times.is_empty() => times.clone(),
            _ => return ProcessingStats::default(),
        };
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Get current throughput (requests per second)
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Get result count for a category
    pub fn get_category_count(&self, category: Category) -> u64 {
        self.results_by_category[category.code() as usize].load(Ordering::Relaxed)
    }

    /// Get failures by kind
    pub fn get_failures(&self) -> HashMap<String, u64> {
        self.failures.read().map(|f| f.clone()).unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let scored = self.requests_scored.load(Ordering::Relaxed);
        let flagged = self.fraud_flagged.load(Ordering::Relaxed);
        let fraud_rate = if scored > 0 {
            (flagged as f64 / scored as f64) * 100.0
        } else {
            0.0
        };

        let processing = self.get_processing_stats();
        let throughput = self.get_throughput();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              FRAUD RISK ENGINE - METRICS SUMMARY             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests Scored: {:>8}  │  Throughput: {:>6.1} req/s        ║",
            scored, throughput
        );
        info!(
            "║ Fraud Flagged:   {:>8}  │  Fraud Rate: {:>6.1}%             ║",
            flagged, fraud_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            processing.mean_us, processing.p50_us, processing.p95_us, processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Results by Category:                                         ║");
        for category in [Category::Safe, Category::Suspicious, Category::Alert] {
            let count = self.get_category_count(category);
            let pct = if scored > 0 {
                (count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!("║   {:10}: {:>6} ({:>5.1}%)                                ║", category.name(), count, pct);
        }
        for (kind, count) in &self.get_failures() {
            info!("║   failed {:13}: {:>6}                                ║", kind, count);
        }
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Risk Score Distribution:                                     ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar_len = (pct / 2.0) as usize;
            let bar: String = "█".repeat(bar_len.min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Real-time metrics reporter that prints periodic summaries
pub struct MetricsReporter {
    metrics: Arc<PipelineMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<PipelineMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn result(score: f64, fraud: bool) -> DetectionResult {
        DetectionResult {
            fraud,
            score,
            category: Category::from_score(score),
            alerts: Vec::new(),
            user_id: "user_1".to_string(),
            city: "Delhi".to_string(),
            device_id: "dev-1".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2026, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_result(Duration::from_micros(100), &result(0.1, false));
        metrics.record_result(Duration::from_micros(200), &result(0.8, true));
        metrics.record_result(Duration::from_micros(300), &result(1.0, true));
        metrics.record_failure("decode");

        assert_eq!(metrics.requests_scored.load(Ordering::Relaxed), 3);
        assert_eq!(metrics.fraud_flagged.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.get_category_count(Category::Safe), 1);
        assert_eq!(metrics.get_category_count(Category::Alert), 2);
        assert_eq!(metrics.get_failures().get("decode"), Some(&1));

        let dist = metrics.get_score_distribution();
        assert_eq!(dist[1], 1);
        assert_eq!(dist[8], 1);
        assert_eq!(dist[9], 1);
    }

    #[test]
    fn test_processing_stats() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.get_processing_stats().count, 0);

        for us in [100, 200, 300, 400] {
            metrics.record_result(Duration::from_micros(us), &result(0.3, false));
        }
        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.max_us, 400);
    }
}
