//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_jobs_submitted_total` (counter): jobs accepted into the queue
//! - `relay_jobs_rejected_total` (counter): jobs refused at submit time, by reason
//! - `relay_receipts_total` (counter): receipts produced, by outcome
//! - `relay_jobs_in_flight` (gauge): accepted jobs without a receipt yet
//! - `relay_callback_panics_total` (counter): callbacks that panicked

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_submitted() {
    ::metrics::counter!("relay_jobs_submitted_total").increment(1);
}

pub fn record_rejected(reason: &'static str) {
    ::metrics::counter!("relay_jobs_rejected_total", "reason" => reason).increment(1);
}

pub fn record_receipt(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("relay_receipts_total", "outcome" => outcome).increment(1);
}

pub fn record_in_flight(count: u64) {
    ::metrics::gauge!("relay_jobs_in_flight").set(count as f64);
}

pub fn record_callback_panic() {
    ::metrics::counter!("relay_callback_panics_total").increment(1);
}
