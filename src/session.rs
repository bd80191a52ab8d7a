//! Session management for authenticated users.
//!
//! Sessions are signed, client-held cookies with configurable TTL. The token
//! is an HS256-signed claim set carrying the subject `(username, user_id)`;
//! because it is unguessable and tamper-evident, no server-side session
//! table exists. Beginning and clearing a session mutate only the per-client
//! cookie, and a session dies either on logout (cookie cleared) or when its
//! expiry passes. Holders of a well-formed token are still re-validated
//! against the credential store by the authorization gate.

use axum::http::{header, HeaderMap, StatusCode};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

// ---

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "pantry_session";

/// Default session time-to-live in seconds (7 days).
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 604_800;

// ---

/// Claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    //
    /// Username, copied from the credential at issuance.
    pub sub: String,
    /// User id, copied from the credential at issuance.
    pub uid: i64,
    /// Random token id.
    pub jti: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Signing and verification keys derived from the configured secret.
pub struct SessionKeys {
    //
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    // ---
    pub fn from_secret(secret: &[u8]) -> Self {
        // ---
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

// ---

/// Signs a new session token bound to `(username, user_id)`.
///
/// # Returns
/// The signed token on success, or HTTP status code on failure.
pub fn begin_session(
    keys: &SessionKeys,
    ttl: Duration,
    username: &str,
    user_id: i64,
) -> Result<String, StatusCode> {
    //
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: username.to_string(),
        uid: user_id,
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };

    let token = encode(&Header::default(), &claims, &keys.encoding).map_err(|e| {
        //
        tracing::error!("Failed to sign session token: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!("Created session for user: {}", username);

    Ok(token)
}

/// Reads the active session for the current request, if any.
///
/// Returns `None` when the cookie is absent or the token fails signature or
/// expiry validation. The caller still owns the existence re-check against
/// the credential store.
pub fn current_session(headers: &HeaderMap, keys: &SessionKeys) -> Option<SessionClaims> {
    //
    let token = session_token_from_headers(headers)?;

    decode::<SessionClaims>(&token, &keys.decoding, &Validation::new(Algorithm::HS256))
        .map(|data| data.claims)
        .ok()
}

/// The `Set-Cookie` value that installs a session token on the client.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    //
    format!(
        "{SESSION_COOKIE_NAME}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        ttl.as_secs()
    )
}

/// The `Set-Cookie` value that destroys the client's session cookie.
/// Clearing an already-empty session is not an error.
pub fn clear_session_cookie() -> String {
    //
    format!("{SESSION_COOKIE_NAME}=; HttpOnly; Path=/; Max-Age=0")
}

/// Extracts the session token from the request's `Cookie` header.
fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    //
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| {
            cookies.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                if parts.next()? == SESSION_COOKIE_NAME {
                    Some(parts.next()?.to_string())
                } else {
                    None
                }
            })
        })
}
