use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored account credential: username plus salted PBKDF2 digest.
///
/// The plaintext password is never stored; `password_hash` is only
/// reproducible by re-running the KDF with the same plaintext and `salt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    // ---
    /// Store-assigned id, stable for the account's lifetime.
    pub id: i64,

    /// Unique across all credentials, immutable once registered.
    pub username: String,

    /// 64-byte PBKDF2-HMAC-SHA512 digest.
    pub password_hash: Vec<u8>,

    /// Per-account random bytes, generated once at registration.
    pub salt: Vec<u8>,

    /// When this account was created.
    pub created_at: DateTime<Utc>,
}

/// The subject of an active session, copied from the credential at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    // ---
    pub user_id: i64,
    pub username: String,
}

/// A stored pantry item. Category / condition / location are 1-based ids
/// into the lookup tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    // ---
    pub id: i64,
    pub user_id: i64,
    pub product_name: String,
    pub description: String,
    pub category: i32,
    pub storage_condition: i32,
    pub storage_location: i32,
    pub date_added: DateTime<Utc>,
    pub date_purchased: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

/// Fields for inserting a new item; the store assigns id and date_added.
#[derive(Debug, Clone)]
pub struct NewItem {
    // ---
    pub user_id: i64,
    pub product_name: String,
    pub description: String,
    pub category: i32,
    pub storage_condition: i32,
    pub storage_location: i32,
    pub date_purchased: DateTime<Utc>,
    pub expiration: DateTime<Utc>,
}

/// The category / storage-condition / storage-location label tables.
///
/// Loaded once at startup into shared read-mostly state and refreshed only
/// through the explicit reload endpoint. Item rows reference labels by
/// 1-based index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupTables {
    // ---
    pub categories: Vec<String>,
    pub conditions: Vec<String>,
    pub locations: Vec<String>,
}

impl LookupTables {
    // ---
    /// Resolve a 1-based id against a label table.
    fn label(table: &[String], id: i32) -> Option<&str> {
        // ---
        usize::try_from(id.checked_sub(1)?)
            .ok()
            .and_then(|idx| table.get(idx))
            .map(String::as_str)
    }

    pub fn category_label(&self, id: i32) -> Option<&str> {
        Self::label(&self.categories, id)
    }

    pub fn condition_label(&self, id: i32) -> Option<&str> {
        Self::label(&self.conditions, id)
    }

    pub fn location_label(&self, id: i32) -> Option<&str> {
        Self::label(&self.locations, id)
    }
}
