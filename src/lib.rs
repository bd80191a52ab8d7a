// src/lib.rs
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::env;

use handlers::health_check;
use handlers::metrics_handler;
use handlers::root_handler;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod auth_gate;
mod config;
mod handlers;
mod infrastructure;
mod session;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use auth_gate::{AuthGateRejection, CurrentUser};
pub use session::{
    begin_session, clear_session_cookie, current_session, session_cookie, SessionClaims,
    SessionKeys, DEFAULT_SESSION_TTL_SECONDS, SESSION_COOKIE_NAME,
};

pub use config::*;
pub use handlers::DEFAULT_LANDING_PAGE;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_memory_repository, // ---
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    init_database_with_retry,
    MemoryRepository,
};

/// Assemble the HTTP router around an already-built [`AppState`].
///
/// Kept separate from [`create_app`] so tests can run the full router
/// against the in-memory backend without touching the environment.
pub fn build_router(app_state: AppState) -> Router {
    // ---
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/register", post(handlers::register))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/pantry", get(handlers::list_items))
        .route("/pantry/add", post(handlers::add_item))
        .nest(
            "/api",
            Router::new()
                .route("/username_exists", get(handlers::username_exists))
                .route("/suggestions", get(handlers::suggestions))
                .route("/lookups", get(handlers::lookup_tables)),
        )
        .nest(
            "/admin",
            Router::new().route("/lookups/reload", post(handlers::reload_lookup_tables)),
        )
        .fallback(handlers::not_found)
        .with_state(app_state)
}

/// Build the HTTP router with backends determined by environment variables.
pub async fn create_app() -> Result<Router> {
    // ---
    // Determine metrics implementation from environment
    let metrics_type = env::var("PANTRY_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // ✅ Ignores if already initialized

    // Session signing is required regardless of the store backend.
    let session_config = SessionConfig::from_env()?;

    // Determine store backend from environment
    let backend = env::var("PANTRY_STORE_BACKEND").unwrap_or_else(|_| "postgres".to_string());
    let repository = if backend == "memory" {
        //
        tracing::warn!("Using the in-memory store backend; data will not survive restart");
        create_memory_repository()
    } else {
        //
        let database_config = DatabaseConfig::from_env()?;
        let pool = init_database_with_retry(&database_config).await?;
        create_postgres_repository(pool)
    };

    // Lookup tables are loaded once here; afterwards only the explicit
    // reload endpoint refreshes them.
    let lookups = repository.load_lookup_tables().await?;

    // Build application state with all dependencies
    let app_state = AppState::new(
        repository,
        metrics,
        SessionKeys::from_secret(session_config.secret.as_bytes()),
        session_config.ttl,
        lookups,
    );

    Ok(build_router(app_state))
}
