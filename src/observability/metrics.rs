//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define kernel metrics (requests, latency, job iterations, tasks)
//! - Expose a Prometheus-compatible scrape endpoint when enabled
//!
//! # Metrics
//! - `kernel_requests_total` (counter): requests by method, status
//! - `kernel_request_duration_seconds` (histogram): dispatch latency
//! - `kernel_job_iterations_total` (counter): cyclic job runs by job, outcome
//! - `kernel_tasks_total` (counter): task executions by task, outcome
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Labels stay low-cardinality: no paths, no request IDs, non-standard
//!   methods as `OTHER`, unresolvable task names as `unknown`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(address: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(address).install()?;
    tracing::info!(address = %address, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, started: Instant) {
    let method = method_label(method);
    metrics::counter!(
        "kernel_requests_total",
        "method" => method,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "kernel_request_duration_seconds",
        "method" => method
    )
    .record(started.elapsed().as_secs_f64());
}

/// Standard methods by name, anything else as `OTHER`.
pub fn method_label(method: &str) -> &'static str {
    const KNOWN: [&str; 9] = [
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
    ];
    KNOWN
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(method))
        .unwrap_or("OTHER")
}

/// `outcome` is one of `ok`, `error`, `panic`.
pub fn record_job_iteration(job: &str, outcome: &'static str) {
    metrics::counter!(
        "kernel_job_iterations_total",
        "job" => job.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_task(task: &str, succeeded: bool) {
    let outcome = if succeeded { "success" } else { "failure" };
    metrics::counter!(
        "kernel_tasks_total",
        "task" => task.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
