//! Postgres-backed persistence.
//!
//! Pool initialization retries at startup (the database may come up after
//! the service under docker-compose), then the schema is bootstrapped and
//! the lookup tables seeded if empty.

mod postgres_repository;


pub use postgres_repository::{create_postgres_repository, PostgresRepository};

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

// ---

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        pw_hash BYTEA NOT NULL,
        salt BYTEA NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS category (
        id SERIAL PRIMARY KEY,
        label TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS storage_condition (
        id SERIAL PRIMARY KEY,
        label TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS storage_location (
        id SERIAL PRIMARY KEY,
        label TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS product (
        id SERIAL PRIMARY KEY,
        category INT NOT NULL,
        label TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS items (
        id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users(id),
        product_name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category INT NOT NULL,
        storage_condition INT NOT NULL,
        storage_location INT NOT NULL,
        date_added TIMESTAMPTZ NOT NULL DEFAULT now(),
        date_purchased TIMESTAMPTZ NOT NULL,
        expiration TIMESTAMPTZ NOT NULL
    )",
];

/// Default labels used to seed an empty lookup table.
const DEFAULT_CATEGORIES: &[&str] = &["dairy", "produce", "meat", "grains", "canned", "frozen"];
const DEFAULT_CONDITIONS: &[&str] = &["room temperature", "refrigerated", "frozen"];
const DEFAULT_LOCATIONS: &[&str] = &["pantry", "refrigerator", "freezer", "cellar"];

// ---

/// Connects to Postgres with retry, then bootstraps the schema.
///
/// Each attempt waits one second before the next; the retry count and pool
/// sizing come from [`DatabaseConfig`].
pub async fn init_database_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let mut last_err = None;

    for attempt in 1..=config.retry_count {
        // ---
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                // ---
                bootstrap_schema(&pool).await?;
                tracing::info!("Database ready after {attempt} attempt(s)");
                return Ok(pool);
            }
            Err(e) => {
                // ---
                tracing::warn!("Database connection attempt {attempt} failed: {e}");
                last_err = Some(e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }

    Err(last_err
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("database retry count is zero"))
        .context("could not connect to the database"))
}

/// Creates tables if missing and seeds empty lookup tables with defaults.
async fn bootstrap_schema(pool: &PgPool) -> Result<()> {
    // ---
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    seed_if_empty(pool, "category", DEFAULT_CATEGORIES).await?;
    seed_if_empty(pool, "storage_condition", DEFAULT_CONDITIONS).await?;
    seed_if_empty(pool, "storage_location", DEFAULT_LOCATIONS).await?;

    Ok(())
}

async fn seed_if_empty(pool: &PgPool, table: &str, labels: &[&str]) -> Result<()> {
    // ---
    // Lookup table names are compile-time constants, never user input.
    let count: i64 = sqlx::query_scalar(&format!("SELECT count(*) FROM {table}"))
        .fetch_one(pool)
        .await?;

    if count == 0 {
        // ---
        for label in labels {
            sqlx::query(&format!("INSERT INTO {table} (label) VALUES ($1)"))
                .bind(label)
                .execute(pool)
                .await?;
        }
        tracing::info!("Seeded {table} with {} default labels", labels.len());
    }

    Ok(())
}
