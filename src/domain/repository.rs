use super::models::{Credential, Item, LookupTables, NewItem};
use anyhow::Result;
use std::sync::Arc;

/// Returned by [`Repository::create_credential`] when the store's uniqueness
/// constraint rejects the username. The constraint, not the application-level
/// pre-check, is the source of truth: two concurrent registrations for the
/// same name commit at most one insert and the loser sees this error.
#[derive(Debug, thiserror::Error)]
#[error("username is already registered")]
pub struct DuplicateUsername;

/// Abstraction for credential and pantry-item persistence.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Insert a credential; the store assigns the user id.
    ///
    /// Fails with [`DuplicateUsername`] (downcastable from the returned
    /// error) when the username is already registered.
    async fn create_credential(
        &self,
        username: &str,
        password_hash: &[u8],
        salt: &[u8],
    ) -> Result<Credential>;

    /// Get a credential by username.
    async fn get_credential_by_username(&self, username: &str) -> Result<Option<Credential>>;

    /// Whether a credential exists for this username.
    async fn username_exists(&self, username: &str) -> Result<bool>;

    /// Insert a pantry item; returns the store-assigned id.
    async fn add_item(&self, item: NewItem) -> Result<i64>;

    /// All items belonging to one user.
    async fn get_items_by_user(&self, user_id: i64) -> Result<Vec<Item>>;

    /// Load the category / condition / location label tables.
    async fn load_lookup_tables(&self) -> Result<LookupTables>;

    /// Product labels starting with `prefix`, at most `limit`.
    async fn suggest_products(&self, prefix: &str, limit: i64) -> Result<Vec<String>>;

    /// Connectivity probe for the full health check.
    async fn ping(&self) -> Result<()>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
