//! Metrics collection and exposition.
//!
//! # Metrics
//! - `engine_routes_bound_total` (counter): units attached to the listener
//! - `engine_requests_total` (counter): requests by route, status
//! - `engine_request_duration_seconds` (histogram): latency by route
//! - `engine_handler_failures_total` (counter): adapter-caught failures by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to start metrics exporter"),
    }
}

pub fn record_route_bound(route: &str) {
    counter!("engine_routes_bound_total", "route" => route.to_string()).increment(1);
}

pub fn record_request(route: &str, status: u16, started: Instant) {
    counter!(
        "engine_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("engine_request_duration_seconds", "route" => route.to_string())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_handler_failure(route: &str) {
    counter!("engine_handler_failures_total", "route" => route.to_string()).increment(1);
}
