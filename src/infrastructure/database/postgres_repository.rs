use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    Credential, DuplicateUsername, Item, LookupTables, NewItem, Repository, RepositoryPtr,
};

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: i64,
    username: String,
    pw_hash: Vec<u8>,
    salt: Vec<u8>,
    created_at: DateTime<Utc>,
}

impl From<CredentialRow> for Credential {
    // ---
    fn from(r: CredentialRow) -> Self {
        // ---
        Credential {
            id: r.id,
            username: r.username,
            password_hash: r.pw_hash,
            salt: r.salt,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    user_id: i64,
    product_name: String,
    description: String,
    category: i32,
    storage_condition: i32,
    storage_location: i32,
    date_added: DateTime<Utc>,
    date_purchased: DateTime<Utc>,
    expiration: DateTime<Utc>,
}

impl From<ItemRow> for Item {
    // ---
    fn from(r: ItemRow) -> Self {
        // ---
        Item {
            id: r.id,
            user_id: r.user_id,
            product_name: r.product_name,
            description: r.description,
            category: r.category,
            storage_condition: r.storage_condition,
            storage_location: r.storage_location,
            date_added: r.date_added,
            date_purchased: r.date_purchased,
            expiration: r.expiration,
        }
    }
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    std::sync::Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn create_credential(
        &self,
        username: &str,
        password_hash: &[u8],
        salt: &[u8],
    ) -> Result<Credential> {
        // ---
        let result = sqlx::query_as::<_, CredentialRow>(
            "INSERT INTO users (username, pw_hash, salt)
             VALUES ($1, $2, $3)
             RETURNING id, username, pw_hash, salt, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .bind(salt)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(DuplicateUsername.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_credential_by_username(&self, username: &str) -> Result<Option<Credential>> {
        // ---
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, username, pw_hash, salt, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        // ---
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn add_item(&self, item: NewItem) -> Result<i64> {
        // ---
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO items (user_id, product_name, description, category,
                                storage_condition, storage_location,
                                date_purchased, expiration)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(item.user_id)
        .bind(&item.product_name)
        .bind(&item.description)
        .bind(item.category)
        .bind(item.storage_condition)
        .bind(item.storage_location)
        .bind(item.date_purchased)
        .bind(item.expiration)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn get_items_by_user(&self, user_id: i64) -> Result<Vec<Item>> {
        // ---
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, user_id, product_name, description, category,
                    storage_condition, storage_location,
                    date_added, date_purchased, expiration
             FROM items WHERE user_id = $1
             ORDER BY expiration",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn load_lookup_tables(&self) -> Result<LookupTables> {
        // ---
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT label FROM category ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let conditions: Vec<String> =
            sqlx::query_scalar("SELECT label FROM storage_condition ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let locations: Vec<String> =
            sqlx::query_scalar("SELECT label FROM storage_location ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(LookupTables {
            categories,
            conditions,
            locations,
        })
    }

    async fn suggest_products(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        // ---
        // LIKE wildcards in the prefix would widen the match; escape them.
        let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");

        let labels: Vec<String> = sqlx::query_scalar(
            "SELECT label FROM product WHERE label LIKE $1 || '%' ORDER BY label LIMIT $2",
        )
        .bind(escaped)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(labels)
    }

    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
