use crate::session;
use axum::http::header;
use axum::response::{IntoResponse, Redirect};

/// GET /logout
///
/// Expires the session cookie and sends the client home. Idempotent:
/// clearing an already-empty session succeeds the same way.
pub async fn logout() -> impl IntoResponse {
    // ---
    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Redirect::to("/"),
    )
}
