//! Metric names and descriptions for the store runtime and the API client.
//!
//! Metrics are emitted through the `metrics` facade. Installing a recorder
//! (Prometheus, statsd, ...) is left to the embedding application; without
//! one every call here is a no-op.
//!
//! # Example
//!
//! ```rust
//! use eventpulse_runtime::metrics::{describe_metrics, ApiMetrics};
//! use std::time::Duration;
//!
//! describe_metrics();
//! ApiMetrics::record_request("list_events", Duration::from_millis(12), true);
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Register all metric descriptions.
///
/// Safe to call more than once.
pub fn describe_metrics() {
    // Store Metrics
    describe_counter!(
        "store.commands.total",
        "Total number of actions sent to a store"
    );
    describe_counter!(
        "store.effects.executed",
        "Total number of effects executed, labelled by effect type"
    );
    describe_counter!(
        "store.effects.cancelled",
        "Total number of running effect tasks aborted by cancellation"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time taken to run a reducer"
    );
    describe_counter!(
        "store.shutdown.initiated",
        "Number of graceful shutdowns started"
    );
    describe_counter!(
        "store.shutdown.timeout",
        "Number of shutdowns that timed out with effects still running"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // API Metrics
    describe_counter!(
        "api.requests.total",
        "Total number of API requests, labelled by endpoint"
    );
    describe_counter!(
        "api.requests.failed",
        "Total number of failed API requests, labelled by endpoint"
    );
    describe_histogram!(
        "api.request.duration_seconds",
        "Time taken for an API request to complete"
    );
}

/// API client metrics recorder.
pub struct ApiMetrics;

impl ApiMetrics {
    /// Record a finished request.
    pub fn record_request(endpoint: &'static str, duration: Duration, succeeded: bool) {
        counter!("api.requests.total", "endpoint" => endpoint).increment(1);
        histogram!("api.request.duration_seconds").record(duration.as_secs_f64());
        if !succeeded {
            counter!("api.requests.failed", "endpoint" => endpoint).increment(1);
        }
    }
}
