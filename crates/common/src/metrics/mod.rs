//! Metrics and observability utilities
//!
//! Prometheus metrics for the gateway and generation worker with
//! standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Perdia metrics
pub const METRICS_PREFIX: &str = "perdia";

/// Histogram buckets for HTTP request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.00,
];

/// Buckets for provider/pipeline stage latency (LLM calls run long)
pub const STAGE_BUCKETS: &[f64] = &[
    0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Pipeline metrics
    describe_counter!(
        format!("{}_jobs_processed_total", METRICS_PREFIX),
        Unit::Count,
        "Total generation jobs processed"
    );

    describe_histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Pipeline stage latency in seconds"
    );

    describe_histogram!(
        format!("{}_quality_score", METRICS_PREFIX),
        Unit::Count,
        "Quality score of saved articles"
    );

    describe_counter!(
        format!("{}_fix_attempts_total", METRICS_PREFIX),
        Unit::Count,
        "Total auto-fix iterations run"
    );

    // Provider metrics
    describe_counter!(
        format!("{}_provider_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total provider API requests"
    );

    describe_counter!(
        format!("{}_provider_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total provider API errors"
    );

    // Publish metrics
    describe_counter!(
        format!("{}_articles_published_total", METRICS_PREFIX),
        Unit::Count,
        "Total articles published to WordPress"
    );

    // Queue metrics
    describe_gauge!(
        format!("{}_queue_depth", METRICS_PREFIX),
        Unit::Count,
        "Number of pending generation jobs"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record a completed pipeline stage
pub fn record_stage(stage: &str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    histogram!(
        format!("{}_stage_duration_seconds", METRICS_PREFIX),
        "stage" => stage.to_string(),
        "status" => status.to_string()
    )
    .record(duration_secs);
}

/// Record a finished generation job and its outcome
pub fn record_job(outcome: &str, quality_score: Option<i32>, fix_attempts: u32) {
    counter!(
        format!("{}_jobs_processed_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    if let Some(score) = quality_score {
        histogram!(format!("{}_quality_score", METRICS_PREFIX)).record(score as f64);
    }

    if fix_attempts > 0 {
        counter!(format!("{}_fix_attempts_total", METRICS_PREFIX)).increment(fix_attempts as u64);
    }
}

/// Record a provider call result
pub fn record_provider(provider: &str, success: bool) {
    counter!(
        format!("{}_provider_requests_total", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .increment(1);

    if !success {
        counter!(
            format!("{}_provider_errors_total", METRICS_PREFIX),
            "provider" => provider.to_string()
        )
        .increment(1);
    }
}

/// Record a successful WordPress publish
pub fn record_publish(trigger: &str) {
    counter!(
        format!("{}_articles_published_total", METRICS_PREFIX),
        "trigger" => trigger.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_sorted() {
        for buckets in [LATENCY_BUCKETS, STAGE_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_request_metrics() {
        let metrics = RequestMetrics::start("POST", "/v1/generate");
        std::thread::sleep(std::time::Duration::from_millis(5));
        metrics.finish(202);
        // Just verify it runs without panic
    }
}
