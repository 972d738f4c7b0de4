//! Prometheus metrics for the RFQ gateway.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration
//! fails, it indicates a fatal configuration error (e.g., duplicate
//! metric names) that should crash at startup rather than fail silently.
//! These panics only occur during static initialization, never at runtime.

use crate::error::{TelemetryError, TelemetryResult};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

/// Requests served, by endpoint and response status.
pub static HTTP_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfq_http_requests_total",
        "Total HTTP requests served",
        &["endpoint", "status"]
    )
    .unwrap()
});

/// Request handling latency in milliseconds.
pub static REQUEST_DURATION_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "rfq_request_duration_ms",
        "Request handling latency in milliseconds",
        &["endpoint"],
        vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0]
    )
    .unwrap()
});

/// Gas bid decisions, by outcome (bid / ceiling / oracle_error).
pub static GAS_BIDS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfq_gas_bids_total",
        "Total gas bid decisions",
        &["outcome"]
    )
    .unwrap()
});

/// Health-check cache lookups, by result (hit / refresh).
pub static HEALTH_CACHE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "rfq_health_cache_total",
        "Total health-check cache lookups",
        &["result"]
    )
    .unwrap()
});

/// Render all registered metrics in the Prometheus text format.
pub fn gather() -> TelemetryResult<String> {
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
