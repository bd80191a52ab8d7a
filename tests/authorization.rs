//! Integration tests for the authorization gate.
//!
//! The gate must reject missing/invalid sessions with a redirect that
//! preserves the original destination, and must re-check on every call that
//! the session's subject still exists in the credential store.

use pantry_api::SESSION_COOKIE_NAME;
use reqwest::StatusCode;

mod common;

// ============================================================================
// Unauthenticated Access
// ============================================================================

#[tokio::test]
async fn protected_routes_redirect_to_login_with_the_destination() {
    // ---
    let server = common::TestServer::new().await;

    let response = server
        .client
        .get(server.url("/pantry"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?redirect=%2Fpantry"
    );
}

#[tokio::test]
async fn the_preserved_destination_includes_the_query_string() {
    // ---
    let server = common::TestServer::new().await;

    let response = server
        .client
        .get(server.url("/pantry?sort=expiry"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?redirect=%2Fpantry%3Fsort%3Dexpiry"
    );
}

#[tokio::test]
async fn post_operations_are_gated_too() {
    // ---
    let server = common::TestServer::new().await;

    let add = server
        .client
        .post(server.url("/pantry/add"))
        .form(&[("type", "milk"), ("category", "1"), ("condition", "1"), ("location", "1")])
        .send()
        .await
        .unwrap();
    assert_eq!(add.status(), StatusCode::SEE_OTHER);

    let reload = server
        .client
        .post(server.url("/admin/lookups/reload"))
        .send()
        .await
        .unwrap();
    assert_eq!(reload.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        reload.headers().get("location").unwrap(),
        "/login?redirect=%2Fadmin%2Flookups%2Freload"
    );
}

#[tokio::test]
async fn garbage_session_cookies_are_treated_as_no_session() {
    // ---
    let server = common::TestServer::new().await;

    let response = server
        .client
        .get(server.url("/pantry"))
        .header("cookie", format!("{SESSION_COOKIE_NAME}=definitely-not-a-token"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

// ============================================================================
// Stale Sessions
// ============================================================================

#[tokio::test]
async fn a_session_for_a_deleted_account_is_rejected() {
    // ---
    let server = common::TestServer::new().await;

    server.register("ghost", "boo").await;

    // The session works while the account exists.
    assert_eq!(
        server
            .client
            .get(server.url("/pantry"))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::OK
    );

    // Delete the account out from under the session. The token in the
    // cookie jar is still well-formed and unexpired.
    assert!(server.repo.remove_user("ghost"));

    let response = server
        .client
        .get(server.url("/pantry"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get("location").unwrap(),
        "/login?redirect=%2Fpantry"
    );
}

#[tokio::test]
async fn the_existence_recheck_runs_on_every_call() {
    // ---
    let server = common::TestServer::new().await;

    server.register("henry", "pw").await;

    // Several successful calls first; validity must not be cached from them.
    for _ in 0..3 {
        assert_eq!(
            server
                .client
                .get(server.url("/pantry"))
                .send()
                .await
                .unwrap()
                .status(),
            StatusCode::OK
        );
    }

    assert!(server.repo.remove_user("henry"));

    assert_eq!(
        server
            .client
            .get(server.url("/pantry"))
            .send()
            .await
            .unwrap()
            .status(),
        StatusCode::SEE_OTHER
    );
}
