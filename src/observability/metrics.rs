//! Metrics collection and exposition.
//!
//! # Metrics
//! - `node_console_rpc_calls_total` (counter): node calls by method, outcome
//! - `node_console_rpc_duration_seconds` (histogram): node call latency
//! - `node_console_pipeline_stages_total` (counter): send pipeline stage outcomes
//! - `node_console_pipeline_in_flight` (gauge): 1 while a send is running
//! - `node_console_api_requests_total` (counter): API requests by route, status
//! - `node_console_api_request_duration_seconds` (histogram): API latency
//!
//! Without an installed exporter every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one node RPC call. `outcome` is `ok`, `node_error` or an error kind.
pub fn record_rpc_call(method: &str, outcome: &'static str, start: Instant) {
    ::metrics::counter!(
        "node_console_rpc_calls_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!(
        "node_console_rpc_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a pipeline stage finishing with `outcome`.
pub fn record_pipeline_stage(stage: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "node_console_pipeline_stages_total",
        "stage" => stage,
        "outcome" => outcome
    )
    .increment(1);
}

/// Flag whether a send pipeline is currently running.
pub fn set_pipeline_in_flight(in_flight: bool) {
    ::metrics::gauge!("node_console_pipeline_in_flight").set(if in_flight { 1.0 } else { 0.0 });
}

/// Record one dashboard API request.
pub fn record_request(route: &str, method: &str, status: u16, start: Instant) {
    ::metrics::counter!(
        "node_console_api_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    ::metrics::histogram!(
        "node_console_api_request_duration_seconds",
        "route" => route.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}
