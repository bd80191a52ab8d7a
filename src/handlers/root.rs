use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Pantry API 👋
Version: {version}

Available endpoints:
  - POST /register             - Create an account (username, password, password_confirm)
  - GET  /login?redirect=      - Login form target; echoes the post-login destination
  - POST /login                - Sign in (username, password, optional redirect)
  - GET  /logout               - Clear the session cookie
  - GET  /pantry               - List your items (requires login)
  - POST /pantry/add           - Add an item (requires login)
  - GET  /api/username_exists  - Username availability check
  - GET  /api/suggestions      - Product-name autosuggest by prefix
  - GET  /api/lookups          - Category / condition / location labels
  - POST /admin/lookups/reload - Refresh the lookup tables (requires login)
  - GET  /health               - Light health check
  - GET  /health?mode=full     - Full health check (includes the store)
  - GET  /metrics              - Prometheus metrics

Items track what you bought, where it is stored, and when it expires.
"#
    )
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    // ---
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}
