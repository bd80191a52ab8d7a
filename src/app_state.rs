//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` contains shared
//! resources like the persistence backend, metrics implementation, session
//! signing keys, and the lookup-table cache.
//!
//! The state is designed to be cheaply cloneable (using `Arc` internally
//! where needed) so it can be passed efficiently to each request handler
//! without expensive copying of resources.

use crate::domain::{LookupTables, MetricsPtr, RepositoryPtr};
use crate::session::SessionKeys;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the
/// application. Handlers depend on the abstractions it holds (`Repository`,
/// `Metrics`), never on concrete backends, so the same router runs against
/// Postgres in production and the in-memory store in tests.
///
/// Everything here is immutable after startup except the lookup-table cache,
/// which is read-mostly state refreshed only through the explicit reload
/// endpoint.
#[derive(Clone)]
pub struct AppState {
    /// Persistence abstraction (credentials, items, lookup tables).
    repository: RepositoryPtr,

    /// Metrics implementation for recording application events.
    metrics: MetricsPtr,

    /// HS256 keys for signing and verifying session tokens.
    session_keys: Arc<SessionKeys>,

    /// How long issued session tokens stay valid.
    session_ttl: Duration,

    /// Cached category / condition / location labels.
    lookups: Arc<RwLock<LookupTables>>,
}

impl AppState {
    // ---

    pub fn new(
        repository: RepositoryPtr,
        metrics: MetricsPtr,
        session_keys: SessionKeys,
        session_ttl: Duration,
        lookups: LookupTables,
    ) -> Self {
        // ---
        AppState {
            repository,
            metrics,
            session_keys: Arc::new(session_keys),
            session_ttl,
            lookups: Arc::new(RwLock::new(lookups)),
        }
    }

    /// Get a reference to the repository implementation.
    pub fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    /// Get a reference to the metrics implementation.
    pub fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }

    /// Get the session signing keys.
    pub fn session_keys(&self) -> &SessionKeys {
        // ---
        &self.session_keys
    }

    /// Get the session time-to-live.
    pub fn session_ttl(&self) -> Duration {
        // ---
        self.session_ttl
    }

    /// Current lookup tables, cloned out of the cache.
    pub async fn lookup_tables(&self) -> LookupTables {
        // ---
        self.lookups.read().await.clone()
    }

    /// Re-reads the lookup tables from the store into the cache.
    ///
    /// This is the explicit reload trigger; nothing else refreshes the
    /// cache after startup.
    pub async fn reload_lookup_tables(&self) -> Result<LookupTables> {
        // ---
        let tables = self.repository.load_lookup_tables().await?;
        *self.lookups.write().await = tables.clone();

        Ok(tables)
    }
}
