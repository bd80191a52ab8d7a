use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus recorder globally and store the handle.
///
/// Idempotent: repeated calls (multiple routers in one test process) reuse
/// the first recorder.
pub fn init_metrics() {
    HANDLE.get_or_init(|| {
        PrometheusBuilder::new()
            .install_recorder()
            .expect("failed to install Prometheus recorder")
    });
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    HANDLE
        .get()
        .expect("metrics recorder not initialized")
        .render()
}
