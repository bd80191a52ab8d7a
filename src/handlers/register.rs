//! Registration handler.
//!
//! Validates the submitted credentials, stores the salted digest, and
//! begins a session so the new account is signed in immediately.

use crate::app_state::AppState;
use crate::domain::auth::{self, RegistrationError};
use crate::session;
use axum::extract::{Form, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    // ---
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    // ---
    pub success: bool,
    pub user_id: i64,
    pub username: String,
}

/// Failure payload. `username` echoes what the user typed (never the
/// password) so the form can be redisplayed without re-entry.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ============================================================================
// Registration Handler
// ============================================================================

/// POST /register
///
/// Validation order (first failure wins): empty username, invalid
/// characters, username taken, empty password, password mismatch. On
/// success the response carries the session cookie, so registration also
/// signs the user in.
pub async fn register(
    State(state): State<AppState>,
    Form(req): Form<RegisterRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let user = match auth::register(
        state.repository(),
        &req.username,
        &req.password,
        &req.password_confirm,
    )
    .await
    {
        Ok(user) => user,
        Err(e) => return Err(registration_error_response(e, req.username)),
    };

    state.metrics().record_registration();

    let token = session::begin_session(
        state.session_keys(),
        state.session_ttl(),
        &user.username,
        user.user_id,
    )
    .map_err(|status| {
        //
        (
            status,
            Json(ErrorResponse {
                error: "Failed to create session".to_string(),
                username: None,
            }),
        )
    })?;

    let cookie = session::session_cookie(&token, state.session_ttl());

    tracing::info!("Registered user: {}", user.username);

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(RegisterResponse {
            success: true,
            user_id: user.user_id,
            username: user.username,
        }),
    )
        .into_response())
}

fn registration_error_response(
    err: RegistrationError,
    username: String,
) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    if let RegistrationError::Store(e) = &err {
        //
        tracing::error!("Credential store failure during registration: {:?}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                username: None,
            }),
        );
    }

    tracing::warn!("Registration rejected for '{}': {}", username, err);

    let status = match err {
        RegistrationError::UsernameTaken => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    };

    let echo = if username.is_empty() { None } else { Some(username) };

    (
        status,
        Json(ErrorResponse {
            error: format!("Error: {err}"),
            username: echo,
        }),
    )
}
