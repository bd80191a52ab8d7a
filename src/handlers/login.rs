//! Login handlers.
//!
//! `GET /login` is the target the authorization gate redirects to; it echoes
//! the resolved post-login destination so an external renderer can build the
//! form. `POST /login` verifies the credentials and redirects the client.
//!
//! # Security
//! - Unknown-user and wrong-password rejections share one response body, so
//!   the login surface never reveals whether a username exists. The log
//!   lines stay specific.
//! - Redirect targets are restricted to same-site absolute paths; anything
//!   else falls back to the default landing page.

use crate::app_state::AppState;
use crate::domain::auth::{self, LoginError};
use crate::session;
use axum::extract::{Form, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Where a successful login lands when the client did not ask otherwise.
pub const DEFAULT_LANDING_PAGE: &str = "/pantry";

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    // ---
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    // ---
    pub redirect: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    // ---
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

// ============================================================================
// Login Handlers
// ============================================================================

/// GET /login
///
/// Echoes the post-login destination (validated) for the login form.
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPageResponse> {
    // ---
    Json(LoginPageResponse {
        redirect: sanitize_redirect(query.redirect.as_deref()),
    })
}

/// POST /login
///
/// Verifies the username/password pair, begins a session, and redirects to
/// the requested target.
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // ---
    let user = match auth::login(state.repository(), &req.username, &req.password).await {
        Ok(user) => user,
        Err(e) => return Err(login_error_response(&state, e, req.username)),
    };

    state.metrics().record_login_success();

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
    let target = sanitize_redirect(req.redirect.as_deref());

    tracing::info!("User '{}' authenticated successfully", user.username);

    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response())
}

fn login_error_response(
    state: &AppState,
    err: LoginError,
    username: String,
) -> (StatusCode, Json<ErrorResponse>) {
    // ---
    match &err {
        LoginError::Store(e) => {
            //
            tracing::error!("Credential store failure during login: {:?}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                    username: None,
                }),
            );
        }
        LoginError::UnknownUser => {
            //
            tracing::warn!("Login attempt for non-existent user: {}", username);
        }
        LoginError::WrongPassword => {
            //
            tracing::warn!("Incorrect password for user: {}", username);
        }
    }

    state.metrics().record_login_failure();

    // Same status and body text for both rejection kinds.
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: format!("Error: {err}"),
            username: Some(username),
        }),
    )
}

/// Accepts only same-site absolute paths as post-login targets.
fn sanitize_redirect(target: Option<&str>) -> String {
    // ---
    match target {
        Some(t) if t.starts_with('/') && !t.starts_with("//") => t.to_string(),
        _ => DEFAULT_LANDING_PAGE.to_string(),
    }
}
