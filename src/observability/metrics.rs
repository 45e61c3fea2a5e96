//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): forwarded requests by method, status, worker
//! - `gateway_request_duration_seconds` (histogram): time to response head, by worker
//! - `gateway_dispatch_total` (counter): round-robin selections by worker
//! - `gateway_in_flight_requests` (gauge): requests currently being handled
//!
//! Recording is a no-op until a recorder is installed, so workers and tests
//! pay nothing.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed (or failed) forward.
pub fn record_request(method: &str, status: u16, worker: &str, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "worker" => worker.to_string(),
    )
    .increment(1);

    metrics::histogram!("gateway_request_duration_seconds", "worker" => worker.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record one round-robin selection.
pub fn record_dispatch(worker: &str) {
    metrics::counter!("gateway_dispatch_total", "worker" => worker.to_string()).increment(1);
}

/// Publish the in-flight request count.
pub fn set_in_flight(count: u64) {
    metrics::gauge!("gateway_in_flight_requests").set(count as f64);
}
