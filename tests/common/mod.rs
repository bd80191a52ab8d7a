// Test helpers are intentionally partially used
#![allow(dead_code)]

use pantry_api::domain::Repository;
use pantry_api::{build_router, create_noop_metrics, AppState, MemoryRepository, SessionKeys};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;

pub const TEST_SESSION_SECRET: &[u8] = b"integration-test-session-secret-0123";

// ============================================================================
// Test Setup
// ============================================================================

/// A full router served on an ephemeral port, backed by the in-memory store
/// so the suite needs no external services.
///
/// The client keeps a cookie jar (sessions flow like a browser) but does NOT
/// follow redirects, so tests can assert on statuses and Location headers.
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub client: Client,
    /// Concrete handle onto the backing store, for test-only mutations
    /// (deleting accounts, swapping lookup tables).
    pub repo: Arc<MemoryRepository>,
}

impl TestServer {
    // ---
    pub async fn new() -> Self {
        // ---
        let repo = Arc::new(MemoryRepository::new());
        Self::with_repo(repo).await
    }

    pub async fn with_repo(repo: Arc<MemoryRepository>) -> Self {
        // ---
        let lookups = repo
            .load_lookup_tables()
            .await
            .expect("memory store lookups");

        let state = AppState::new(
            repo.clone(),
            create_noop_metrics().expect("noop metrics"),
            SessionKeys::from_secret(TEST_SESSION_SECRET),
            Duration::from_secs(3600),
            lookups,
        );

        let app = build_router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Spawn the server in the background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start
        sleep(Duration::from_millis(100)).await;

        let client = new_client();

        Self { addr, client, repo }
    }

    pub fn url(&self, path: &str) -> String {
        // ---
        format!("http://{}{}", self.addr, path)
    }

    /// POST /register with matching confirmation.
    pub async fn register(&self, username: &str, password: &str) -> reqwest::Response {
        // ---
        self.client
            .post(self.url("/register"))
            .form(&[
                ("username", username),
                ("password", password),
                ("password_confirm", password),
            ])
            .send()
            .await
            .expect("register request failed")
    }

    /// POST /login without an explicit redirect target.
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        // ---
        self.client
            .post(self.url("/login"))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .expect("login request failed")
    }
}

/// A cookie-keeping, non-redirecting client; build extra ones to act as a
/// second independent browser against the same server.
pub fn new_client() -> Client {
    // ---
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build reqwest client")
}
