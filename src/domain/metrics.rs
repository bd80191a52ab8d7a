use std::sync::Arc;

/// Abstraction for application metrics (counters).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a completed registration.
    fn record_registration(&self);

    /// Record a successful login.
    fn record_login_success(&self);

    /// Record a rejected login attempt.
    fn record_login_failure(&self);

    /// Record a pantry item insert.
    fn record_item_added(&self);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
