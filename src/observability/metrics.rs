//! Metrics collection and exposition.
//!
//! # Metrics
//! - `lb_requests_total` (counter): requests by method, status, backend
//! - `lb_request_duration_seconds` (histogram): latency by method, backend
//! - `lb_selections_total` (counter): routing decisions by strategy, backend
//! - `lb_no_healthy_backend_total` (counter): requests rejected with 503
//! - `lb_backend_healthy` (gauge): 1=healthy, 0=unhealthy

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "lb_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);

    histogram!(
        "lb_request_duration_seconds",
        "method" => method.to_string(),
        "backend" => backend.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_selection(strategy: &'static str, backend: &str) {
    counter!("lb_selections_total", "strategy" => strategy, "backend" => backend.to_string())
        .increment(1);
}

pub fn record_no_healthy_backend() {
    counter!("lb_no_healthy_backend_total").increment(1);
}

pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("lb_backend_healthy", "backend" => backend.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
