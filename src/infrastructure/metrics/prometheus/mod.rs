mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

// Re-export utilities for internal use within this module
pub(crate) use counters::{
    increment_items_added, increment_login_failure, increment_login_success,
    increment_registrations,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a new Prometheus metrics implementation.
///
/// This implementation collects metrics in Prometheus format and exposes
/// them for scraping via the /metrics endpoint.
///
/// Returns a fully initialized metrics instance ready for use.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics();

    Ok(Arc::new(PrometheusMetrics::new()))
}
