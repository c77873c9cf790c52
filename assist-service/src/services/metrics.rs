//! Metrics collection for assist-service.
//!
//! Installs a Prometheus recorder and exposes counters for FAQ routing and
//! ticket lifecycle actions, rendered at `GET /metrics`.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize metrics collection. Call once at startup.
pub fn init_metrics() {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    if METRICS_HANDLE.set(handle).is_err() {
        tracing::warn!("metrics recorder already initialized");
    }
}

/// Render current metrics in Prometheus exposition format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

/// Count a FAQ query by outcome: "answered", "escalated", or "upstream_error".
pub fn record_faq_query(outcome: &'static str) {
    counter!("faq_queries_total", "outcome" => outcome).increment(1);
}

/// Count a ticket lifecycle action: "created", "answered", "rejected", "removed".
pub fn record_ticket_action(action: &'static str) {
    counter!("ticket_actions_total", "action" => action).increment(1);
}
