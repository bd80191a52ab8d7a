//! Authorization gate for protected operations.
//!
//! `CurrentUser` is an extractor: adding it to a handler's signature puts
//! that handler behind the gate. On every protected request it reads the
//! session cookie, then re-checks that the session's subject still exists in
//! the credential store. A session is not proof of a still-valid account,
//! and validity is deliberately never cached for the session's lifetime.
//! Rejections redirect to the login flow with the originally requested
//! destination preserved, so the user resumes where they left off.

use crate::app_state::AppState;
use crate::session;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};

/// The authenticated subject, made available to protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    //
    pub user_id: i64,
    pub username: String,
}

/// Why the gate refused to run the wrapped operation.
///
/// `Unauthenticated` and `AccountVanished` both redirect to login; they stay
/// separate variants because a vanished account is logged differently and
/// tests tell them apart. Store failures are a server fault, never an auth
/// failure.
#[derive(Debug)]
pub enum AuthGateRejection {
    //
    /// No session cookie, or the token failed validation.
    Unauthenticated { target: String },

    /// The session was well-formed but its username is gone from the store.
    AccountVanished { target: String },

    /// The credential store could not be reached for the re-check.
    Internal,
}

impl AuthGateRejection {
    // ---
    /// The login URL carrying the original destination as the post-login
    /// target.
    pub fn login_location(target: &str) -> String {
        // ---
        format!("/login?redirect={}", urlencoding::encode(target))
    }
}

impl IntoResponse for AuthGateRejection {
    // ---
    fn into_response(self) -> Response {
        // ---
        match self {
            AuthGateRejection::Unauthenticated { target }
            | AuthGateRejection::AccountVanished { target } => {
                Redirect::to(&Self::login_location(&target)).into_response()
            }
            AuthGateRejection::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthGateRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The path+query of the protected request is the post-login target.
        let target = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        let claims = session::current_session(&parts.headers, state.session_keys())
            .ok_or(AuthGateRejection::Unauthenticated {
                target: target.clone(),
            })?;

        // Re-validate the subject on every call: the account could have been
        // deleted after the session was issued.
        match state.repository().username_exists(&claims.sub).await {
            Ok(true) => Ok(CurrentUser {
                user_id: claims.uid,
                username: claims.sub,
            }),
            Ok(false) => {
                //
                tracing::warn!("Session subject no longer exists: {}", claims.sub);
                Err(AuthGateRejection::AccountVanished { target })
            }
            Err(e) => {
                //
                tracing::error!("Credential store failure during session re-check: {:?}", e);
                Err(AuthGateRejection::Internal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::domain::{LookupTables, Repository};
    use crate::infrastructure::{create_noop_metrics, MemoryRepository};
    use crate::session::{begin_session, SessionKeys, SESSION_COOKIE_NAME};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Duration;

    const SECRET: &[u8] = b"auth-gate-test-secret-0123456789";

    fn state_with_repo(repo: Arc<MemoryRepository>) -> AppState {
        // ---
        AppState::new(
            repo,
            create_noop_metrics().unwrap(),
            SessionKeys::from_secret(SECRET),
            Duration::from_secs(3600),
            LookupTables::default(),
        )
    }

    fn parts_for(uri: &str, cookie: Option<&str>) -> Parts {
        // ---
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn no_session_redirects_to_login_with_target() {
        // ---
        let state = state_with_repo(Arc::new(MemoryRepository::new()));
        let mut parts = parts_for("/pantry?sort=expiry", None);

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();

        match err {
            AuthGateRejection::Unauthenticated { target } => {
                assert_eq!(target, "/pantry?sort=expiry");
                assert_eq!(
                    AuthGateRejection::login_location(&target),
                    "/login?redirect=%2Fpantry%3Fsort%3Dexpiry"
                );
            }
            other => panic!("expected Unauthenticated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn valid_session_with_existing_account_passes() {
        // ---
        let repo = Arc::new(MemoryRepository::new());
        let cred = repo
            .create_credential("alice", &[1u8; 64], &[2u8; 16])
            .await
            .unwrap();
        let state = state_with_repo(repo);

        let token = begin_session(
            state.session_keys(),
            Duration::from_secs(3600),
            "alice",
            cred.id,
        )
        .unwrap();
        let cookie = format!("{SESSION_COOKIE_NAME}={token}");
        let mut parts = parts_for("/pantry", Some(&cookie));

        let user = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("gate should pass");

        assert_eq!(user.username, "alice");
        assert_eq!(user.user_id, cred.id);
    }

    #[tokio::test]
    async fn well_formed_session_for_deleted_account_is_rejected() {
        // ---
        let repo = Arc::new(MemoryRepository::new());
        let cred = repo
            .create_credential("ghost", &[1u8; 64], &[2u8; 16])
            .await
            .unwrap();
        let state = state_with_repo(repo.clone());

        let token = begin_session(
            state.session_keys(),
            Duration::from_secs(3600),
            "ghost",
            cred.id,
        )
        .unwrap();

        // Delete the account after the session was issued.
        assert!(repo.remove_user("ghost"));

        let cookie = format!("{SESSION_COOKIE_NAME}={token}");
        let mut parts = parts_for("/pantry", Some(&cookie));

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthGateRejection::AccountVanished { .. }));
    }

    #[tokio::test]
    async fn garbage_cookie_is_unauthenticated() {
        // ---
        let state = state_with_repo(Arc::new(MemoryRepository::new()));
        let cookie = format!("{SESSION_COOKIE_NAME}=not-a-token");
        let mut parts = parts_for("/pantry", Some(&cookie));

        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthGateRejection::Unauthenticated { .. }));
    }
}
