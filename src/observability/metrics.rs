//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_regenerations_total` (counter): runs by target, outcome
//! - `config_regeneration_duration_seconds` (histogram): run time by target
//! - `auth_resolutions_total` (counter): lookups by outcome
//! - `auth_resolution_duration_seconds` (histogram): lookup latency
//! - `registered_endpoints` (gauge): live endpoint records
//!
//! # Design Decisions
//! - Exporter is optional; recording without one is a no-op
//! - Labels are low-cardinality (target name, outcome), never ids or paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener. Must run inside a
/// tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// One regeneration run of `target`; `outcome` is `success` or an error kind.
pub fn record_regeneration(target: &str, outcome: &'static str, start: Instant) {
    counter!(
        "config_regenerations_total",
        "target" => target.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("config_regeneration_duration_seconds", "target" => target.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_resolution(found: bool, start: Instant) {
    let outcome = if found { "found" } else { "not_found" };
    counter!("auth_resolutions_total", "outcome" => outcome).increment(1);
    histogram!("auth_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn set_registered_endpoints(count: usize) {
    gauge!("registered_endpoints").set(count as f64);
}
