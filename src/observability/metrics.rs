//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ipc_gateway_calls_total` (counter): decisions by channel and outcome
//! - `ipc_gateway_rate_limited_total` (counter): rate-limit rejections by channel
//! - `ipc_gateway_call_duration_seconds` (histogram): forwarded call latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Channel labels are only emitted for well-formed channel identifiers

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::audit::AuditDecision;

/// Install the Prometheus exporter and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count one gateway decision.
pub fn record_decision(channel: &str, decision: AuditDecision) {
    metrics::counter!(
        "ipc_gateway_calls_total",
        "channel" => channel.to_string(),
        "decision" => decision.as_str(),
    )
    .increment(1);
}

/// Count one rate-limit rejection.
pub fn record_rate_limited(channel: &str) {
    metrics::counter!("ipc_gateway_rate_limited_total", "channel" => channel.to_string())
        .increment(1);
}

/// Observe the latency of a forwarded call.
pub fn record_call_duration(channel: &str, success: bool, duration: Duration) {
    metrics::histogram!(
        "ipc_gateway_call_duration_seconds",
        "channel" => channel.to_string(),
        "success" => if success { "true" } else { "false" },
    )
    .record(duration.as_secs_f64());
}
