// Copyright (c) 2025 - Cowboy AI, Inc.
//! Metrics sink
//!
//! Components receive an `Arc<dyn MetricsSink>` at construction instead of
//! touching process-wide registries, so tests can substitute a recording sink.
//! [`PrometheusMetrics`] forwards to the `metrics` facade; installing an
//! exporter is left to the embedding process.

use metrics::{counter, describe_counter, describe_histogram, histogram};

/// Counter: failed inventory queries by `storeKind` and `queryKind`
pub const STORE_QUERY_ERRORS: &str = "bmc_worker_store_query_error_count";

/// Counter: failed BMC operations by `operation` and `kind`
pub const BMC_QUERY_ERRORS: &str = "bmc_worker_bmc_query_error_count";

/// Counter: work items received by `valid` and `response`
pub const EVENTS_RECEIVED: &str = "bmc_worker_events_received";

/// Histogram: work item runtime by `label` and `state`
pub const ACTION_DURATION: &str = "bmc_worker_action_duration_seconds";

/// Destination for operational metrics
pub trait MetricsSink: Send + Sync {
    /// An upstream inventory query failed
    fn store_query_error(&self, store_kind: &str, query_kind: &str);

    /// A BMC operation failed, classified by failure kind
    fn bmc_query_error(&self, operation: &str, kind: &str);

    /// A work item was received and either processed or rejected
    fn event_received(&self, valid: bool, response: &str);

    /// Time spent on a unit of work
    fn observe_duration(&self, label: &str, state: &str, seconds: f64);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn store_query_error(&self, _store_kind: &str, _query_kind: &str) {}

    fn bmc_query_error(&self, _operation: &str, _kind: &str) {}

    fn event_received(&self, _valid: bool, _response: &str) {}

    fn observe_duration(&self, _label: &str, _state: &str, _seconds: f64) {}
}

/// Sink backed by the `metrics` facade
#[derive(Debug, Clone, Copy)]
pub struct PrometheusMetrics;

impl PrometheusMetrics {
    /// Describe every metric this crate emits and return the sink
    pub fn new() -> Self {
        describe_counter!(
            STORE_QUERY_ERRORS,
            "A counter metric to measure the total count of errors querying the asset store"
        );
        describe_counter!(
            BMC_QUERY_ERRORS,
            "A counter metric to measure the total count of failed BMC operations"
        );
        describe_counter!(
            EVENTS_RECEIVED,
            "A counter metric to measure the total count of work items received"
        );
        describe_histogram!(
            ACTION_DURATION,
            "Time spent completing each power work item in seconds"
        );

        Self
    }
}

impl Default for PrometheusMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSink for PrometheusMetrics {
    fn store_query_error(&self, store_kind: &str, query_kind: &str) {
        counter!(
            STORE_QUERY_ERRORS,
            "storeKind" => store_kind.to_string(),
            "queryKind" => query_kind.to_string()
        )
        .increment(1);
    }

    fn bmc_query_error(&self, operation: &str, kind: &str) {
        counter!(
            BMC_QUERY_ERRORS,
            "operation" => operation.to_string(),
            "kind" => kind.to_string()
        )
        .increment(1);
    }

    fn event_received(&self, valid: bool, response: &str) {
        counter!(
            EVENTS_RECEIVED,
            "valid" => valid.to_string(),
            "response" => response.to_string()
        )
        .increment(1);
    }

    fn observe_duration(&self, label: &str, state: &str, seconds: f64) {
        histogram!(
            ACTION_DURATION,
            "label" => label.to_string(),
            "state" => state.to_string()
        )
        .record(seconds);
    }
}
