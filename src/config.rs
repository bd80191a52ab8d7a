// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub session: session::SessionConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            session: session::SessionConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    ///
    /// This configuration is required for the Postgres backend and is
    /// validated eagerly during startup.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        /// Startup will fail fast rather than continuing with incomplete
        /// or invalid configuration.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("PANTRY_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs = optional_env_parse!("PANTRY_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("PANTRY_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("PANTRY_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Session configuration
// ============================================================

mod session {
    // ---
    use super::*;

    /// Session-signing configuration.
    ///
    /// The secret keys every session token the service has ever issued;
    /// it is security-critical and must be explicitly provided.
    #[derive(Debug, Clone)]
    pub struct SessionConfig {
        /// HS256 secret for signing session tokens.
        pub secret: String,

        /// Time-to-live for issued session tokens.
        pub ttl: Duration,
    }

    impl SessionConfig {
        /// Builds a [`SessionConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the secret is missing or shorter than
        /// 32 bytes. A short secret makes the signature brute-forceable,
        /// which defeats the tamper evidence the session design relies on.
        pub fn from_env() -> Result<Self> {
            // ---
            let secret = required_env!("PANTRY_SESSION_SECRET");
            if secret.len() < 32 {
                anyhow::bail!("PANTRY_SESSION_SECRET must be at least 32 bytes");
            }

            let ttl_secs = optional_env_parse!(
                "PANTRY_SESSION_TTL_SEC",
                u64,
                crate::session::DEFAULT_SESSION_TTL_SECONDS
            );

            Ok(Self {
                secret,
                ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use session::SessionConfig;

// ============================================================
// Tests
// ============================================================
