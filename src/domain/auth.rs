//! Registration and login flows.
//!
//! These functions carry the validation and verification logic only; cookie
//! issuance and redirects stay in the HTTP handlers. Both flows return typed
//! errors so callers (and tests) can distinguish every failure, even where
//! the user-facing message is deliberately shared.

use super::models::SessionUser;
use super::password;
use super::repository::{DuplicateUsername, RepositoryPtr};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// ---

/// Allowed username alphabet, anchored over the whole string.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("username regex must compile"));

/// Why a registration attempt was rejected.
///
/// The `Store` variant wraps a store/connectivity failure; it is the one
/// non-validation case and must surface as a generic server failure.
#[derive(Debug, Error)]
pub enum RegistrationError {
    // ---
    #[error("username is empty")]
    EmptyUsername,

    #[error("username may only contain alphanumeric characters, hyphens, and underscores")]
    InvalidUsername,

    #[error("username is already registered")]
    UsernameTaken,

    #[error("password is empty")]
    EmptyPassword,

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("credential store failure")]
    Store(#[source] anyhow::Error),
}

/// Why a login attempt was rejected.
///
/// `UnknownUser` and `WrongPassword` stay distinct variants for logging and
/// tests, but share one message so the response body never reveals whether
/// the username exists.
#[derive(Debug, Error)]
pub enum LoginError {
    // ---
    #[error("invalid username or password")]
    UnknownUser,

    #[error("invalid username or password")]
    WrongPassword,

    #[error("credential store failure")]
    Store(#[source] anyhow::Error),
}

// ---

/// Validates and stores a new credential.
///
/// Checks run in order and the first failure wins: empty username, invalid
/// characters, username taken, empty password, password mismatch. The
/// username-taken pre-check is only a fast path; the store's uniqueness
/// constraint decides races, and a constraint violation at insert time also
/// maps to [`RegistrationError::UsernameTaken`].
pub async fn register(
    repo: &RepositoryPtr,
    username: &str,
    password: &str,
    password_confirm: &str,
) -> Result<SessionUser, RegistrationError> {
    // ---
    if username.is_empty() {
        return Err(RegistrationError::EmptyUsername);
    }
    if !USERNAME_RE.is_match(username) {
        return Err(RegistrationError::InvalidUsername);
    }
    if repo
        .username_exists(username)
        .await
        .map_err(RegistrationError::Store)?
    {
        return Err(RegistrationError::UsernameTaken);
    }
    if password.is_empty() {
        return Err(RegistrationError::EmptyPassword);
    }
    if password != password_confirm {
        return Err(RegistrationError::PasswordMismatch);
    }

    let salt = password::generate_salt();
    let digest = password::hash_password(password, &salt);

    match repo.create_credential(username, &digest, &salt).await {
        Ok(credential) => Ok(SessionUser {
            user_id: credential.id,
            username: credential.username,
        }),
        Err(e) if e.downcast_ref::<DuplicateUsername>().is_some() => {
            // Lost the check-then-insert race; same outcome as the pre-check.
            Err(RegistrationError::UsernameTaken)
        }
        Err(e) => Err(RegistrationError::Store(e)),
    }
}

/// Verifies a username/password pair against the stored credential.
pub async fn login(
    repo: &RepositoryPtr,
    username: &str,
    password: &str,
) -> Result<SessionUser, LoginError> {
    // ---
    let credential = repo
        .get_credential_by_username(username)
        .await
        .map_err(LoginError::Store)?
        .ok_or(LoginError::UnknownUser)?;

    if !password::verify_password(password, &credential.salt, &credential.password_hash) {
        return Err(LoginError::WrongPassword);
    }

    Ok(SessionUser {
        user_id: credential.id,
        username: credential.username,
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::infrastructure::create_memory_repository;

    fn repo() -> RepositoryPtr {
        // ---
        create_memory_repository()
    }

    #[tokio::test]
    async fn register_then_login_yields_same_user_id() {
        // ---
        let repo = repo();

        let registered = register(&repo, "alice", "hunter2", "hunter2")
            .await
            .expect("registration should succeed");

        let logged_in = login(&repo, "alice", "hunter2")
            .await
            .expect("login should succeed");

        assert_eq!(registered, logged_in);
    }

    #[tokio::test]
    async fn empty_username_wins_over_later_checks() {
        // ---
        let repo = repo();

        // Password checks would also fail; the username check short-circuits.
        let err = register(&repo, "", "", "mismatch").await.unwrap_err();
        assert!(matches!(err, RegistrationError::EmptyUsername));
    }

    #[tokio::test]
    async fn rejects_invalid_username_characters() {
        // ---
        let repo = repo();

        for bad in ["has space", "semi;colon", "ünïcode", "dot.dot", "a/b"] {
            let err = register(&repo, bad, "pw", "pw").await.unwrap_err();
            assert!(
                matches!(err, RegistrationError::InvalidUsername),
                "expected InvalidUsername for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn validates_the_whole_username_not_just_the_first_character() {
        // ---
        let repo = repo();

        // A leading valid character must not mask trailing invalid ones.
        let err = register(&repo, "a!!!", "pw", "pw").await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidUsername));
    }

    #[tokio::test]
    async fn taken_username_beats_password_validation() {
        // ---
        let repo = repo();

        register(&repo, "bob", "pw", "pw").await.unwrap();

        // Empty password would fail too, but the taken check runs first.
        let err = register(&repo, "bob", "", "").await.unwrap_err();
        assert!(matches!(err, RegistrationError::UsernameTaken));
    }

    #[tokio::test]
    async fn rejects_empty_password_without_creating_a_credential() {
        // ---
        let repo = repo();

        let err = register(&repo, "bob", "", "").await.unwrap_err();
        assert!(matches!(err, RegistrationError::EmptyPassword));

        assert!(!repo.username_exists("bob").await.unwrap());
        assert!(matches!(
            login(&repo, "bob", "").await.unwrap_err(),
            LoginError::UnknownUser
        ));
    }

    #[tokio::test]
    async fn rejects_mismatched_confirmation() {
        // ---
        let repo = repo();

        let err = register(&repo, "carol", "pw1", "pw2").await.unwrap_err();
        assert!(matches!(err, RegistrationError::PasswordMismatch));
        assert!(!repo.username_exists("carol").await.unwrap());
    }

    #[tokio::test]
    async fn second_registration_for_same_username_fails() {
        // ---
        let repo = repo();

        register(&repo, "dave", "first", "first").await.unwrap();
        let err = register(&repo, "dave", "second", "second").await.unwrap_err();
        assert!(matches!(err, RegistrationError::UsernameTaken));

        // The first credential is untouched.
        let user = login(&repo, "dave", "first").await.unwrap();
        assert_eq!(user.username, "dave");
    }

    #[tokio::test]
    async fn concurrent_registrations_leave_exactly_one_credential() {
        // ---
        let repo = repo();

        let (a, b) = tokio::join!(
            register(&repo, "race", "first", "first"),
            register(&repo, "race", "second", "second"),
        );

        // Exactly one attempt wins; the loser sees the same error as a
        // sequential duplicate.
        assert_eq!(a.is_ok() as usize + b.is_ok() as usize, 1);
        for result in [a, b] {
            if let Err(e) = result {
                assert!(matches!(e, RegistrationError::UsernameTaken));
            }
        }

        assert!(repo.username_exists("race").await.unwrap());
        let first = login(&repo, "race", "first").await;
        let second = login(&repo, "race", "second").await;
        assert!(first.is_ok() || second.is_ok());
    }

    #[tokio::test]
    async fn login_failures_are_distinguishable_but_share_a_message() {
        // ---
        let repo = repo();

        register(&repo, "erin", "hunter2", "hunter2").await.unwrap();

        let unknown = login(&repo, "nobody", "hunter2").await.unwrap_err();
        let wrong = login(&repo, "erin", "wrong").await.unwrap_err();

        assert!(matches!(unknown, LoginError::UnknownUser));
        assert!(matches!(wrong, LoginError::WrongPassword));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }
}
