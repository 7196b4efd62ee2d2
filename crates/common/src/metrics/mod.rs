//! Metrics and observability utilities
//!
//! Prometheus metrics with standardized naming conventions.

use metrics::{describe_counter, describe_histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Storyhaven metrics
pub const METRICS_PREFIX: &str = "storyhaven";

/// SLO-aligned histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.075, 0.100, 0.150, 0.250, 0.500, 1.000, 2.500, 5.000,
];

/// Register all metric descriptions
pub fn register_metrics() {
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

    describe_counter!(
        format!("{}_comments_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of comments created"
    );

    describe_counter!(
        format!("{}_story_transitions_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of story lifecycle transitions applied"
    );

    describe_counter!(
        format!("{}_story_views_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of story views counted"
    );

    describe_counter!(
        format!("{}_stories_purged_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of stories permanently deleted"
    );
}

/// Timer helper for recording operation durations
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            start: Instant::now(),
            name: name.into(),
        }
    }

    /// Record the elapsed time to the named histogram
    pub fn record(self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        metrics::histogram!(self.name).record(elapsed);
    }
}
