//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_relay_requests_total` (counter): relayed requests by endpoint, status
//! - `gateway_relay_duration_seconds` (histogram): end-to-end latency by endpoint
//! - `gateway_upstream_failures_total` (counter): transport/timeout/body failures
//! - `gateway_cookie_parse_failures_total` (counter): upstream cookies dropped
//! - `gateway_spoofed_trust_marker_total` (counter): inbound requests carrying the marker
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_relay(endpoint: &'static str, status: u16, start: Instant) {
    ::metrics::counter!(
        "gateway_relay_requests_total",
        "endpoint" => endpoint,
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!("gateway_relay_duration_seconds", "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_upstream_failure(endpoint: &'static str, kind: &'static str) {
    ::metrics::counter!(
        "gateway_upstream_failures_total",
        "endpoint" => endpoint,
        "kind" => kind
    )
    .increment(1);
}

pub fn record_cookie_parse_failure(endpoint: &'static str) {
    ::metrics::counter!("gateway_cookie_parse_failures_total", "endpoint" => endpoint).increment(1);
}

pub fn record_spoofed_trust_marker() {
    ::metrics::counter!("gateway_spoofed_trust_marker_total").increment(1);
}
