use crate::app_state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};

/// Handler for the `/metrics` endpoint.
///
/// Renders whatever the configured metrics backend collects: Prometheus
/// text format in production, an empty body under the no-op backend.
pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, StatusCode> {
    // ---

    let metrics_text = app_state.metrics().render();

    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        metrics_text,
    ))
}
