use anyhow::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::{
    Credential, DuplicateUsername, Item, LookupTables, NewItem, Repository, RepositoryPtr,
};

pub fn create_memory_repository() -> RepositoryPtr {
    // ---
    Arc::new(MemoryRepository::new())
}

/// In-memory store used by the `memory` backend and the integration tests.
///
/// All state sits behind one mutex, so the check-then-insert sequence for a
/// username is serialized: concurrent registrations for the same name commit
/// at most one credential and the loser sees [`DuplicateUsername`], matching
/// the Postgres UNIQUE constraint.
pub struct MemoryRepository {
    // ---
    inner: Mutex<Inner>,
}

struct Inner {
    // ---
    next_user_id: i64,
    next_item_id: i64,
    users: HashMap<String, Credential>,
    items: Vec<Item>,
    lookups: LookupTables,
    products: Vec<String>,
}

impl MemoryRepository {
    // ---
    pub fn new() -> Self {
        // ---
        Self {
            inner: Mutex::new(Inner {
                next_user_id: 1,
                next_item_id: 1,
                users: HashMap::new(),
                items: Vec::new(),
                lookups: LookupTables {
                    categories: to_labels(&["dairy", "produce", "meat", "grains", "canned", "frozen"]),
                    conditions: to_labels(&["room temperature", "refrigerated", "frozen"]),
                    locations: to_labels(&["pantry", "refrigerator", "freezer", "cellar"]),
                },
                products: to_labels(&[
                    "apple juice",
                    "apples",
                    "bread",
                    "butter",
                    "cheddar",
                    "milk",
                    "mozzarella",
                    "oat flakes",
                ]),
            }),
        }
    }

    /// Deletes an account. Not part of [`Repository`]; exists so tests can
    /// exercise sessions whose subject vanished after issuance.
    pub fn remove_user(&self, username: &str) -> bool {
        // ---
        self.lock().users.remove(username).is_some()
    }

    /// Replaces the lookup tables. Test hook for the reload endpoint.
    pub fn set_lookup_tables(&self, tables: LookupTables) {
        // ---
        self.lock().lookups = tables;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // ---
        // Lock poisoning only happens if a holder panicked; propagate it.
        self.inner.lock().expect("memory repository mutex poisoned")
    }
}

impl Default for MemoryRepository {
    // ---
    fn default() -> Self {
        Self::new()
    }
}

fn to_labels(labels: &[&str]) -> Vec<String> {
    // ---
    labels.iter().map(|s| s.to_string()).collect()
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn create_credential(
        &self,
        username: &str,
        password_hash: &[u8],
        salt: &[u8],
    ) -> Result<Credential> {
        // ---
        let mut inner = self.lock();

        if inner.users.contains_key(username) {
            return Err(DuplicateUsername.into());
        }

        let credential = Credential {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_vec(),
            salt: salt.to_vec(),
            created_at: Utc::now(),
        };
        inner.next_user_id += 1;
        inner.users.insert(username.to_string(), credential.clone());

        Ok(credential)
    }

    async fn get_credential_by_username(&self, username: &str) -> Result<Option<Credential>> {
        // ---
        Ok(self.lock().users.get(username).cloned())
    }

    async fn username_exists(&self, username: &str) -> Result<bool> {
        // ---
        Ok(self.lock().users.contains_key(username))
    }

    async fn add_item(&self, item: NewItem) -> Result<i64> {
        // ---
        let mut inner = self.lock();

        let id = inner.next_item_id;
        inner.next_item_id += 1;
        inner.items.push(Item {
            id,
            user_id: item.user_id,
            product_name: item.product_name,
            description: item.description,
            category: item.category,
            storage_condition: item.storage_condition,
            storage_location: item.storage_location,
            date_added: Utc::now(),
            date_purchased: item.date_purchased,
            expiration: item.expiration,
        });

        Ok(id)
    }

    async fn get_items_by_user(&self, user_id: i64) -> Result<Vec<Item>> {
        // ---
        let mut items: Vec<Item> = self
            .lock()
            .items
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.expiration);

        Ok(items)
    }

    async fn load_lookup_tables(&self) -> Result<LookupTables> {
        // ---
        Ok(self.lock().lookups.clone())
    }

    async fn suggest_products(&self, prefix: &str, limit: i64) -> Result<Vec<String>> {
        // ---
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(self
            .lock()
            .products
            .iter()
            .filter(|p| p.starts_with(prefix))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        // ---
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[tokio::test]
    async fn duplicate_insert_loses_to_the_first() {
        // ---
        let repo = MemoryRepository::new();

        let first = repo
            .create_credential("alice", &[1u8; 64], &[2u8; 16])
            .await
            .unwrap();

        let err = repo
            .create_credential("alice", &[9u8; 64], &[9u8; 16])
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<DuplicateUsername>().is_some());

        // First credential is intact.
        let stored = repo
            .get_credential_by_username("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.password_hash, vec![1u8; 64]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_inserts_for_one_username_commit_once() {
        // ---
        let repo = Arc::new(MemoryRepository::new());

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.create_credential("race", &[i; 64], &[i; 16]).await
                })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }

        assert_eq!(wins, 1);
        assert!(repo.username_exists("race").await.unwrap());
    }

    #[tokio::test]
    async fn items_are_scoped_by_user() {
        // ---
        let repo = MemoryRepository::new();
        let now = Utc::now();

        repo.add_item(NewItem {
            user_id: 1,
            product_name: "milk".into(),
            description: String::new(),
            category: 1,
            storage_condition: 2,
            storage_location: 2,
            date_purchased: now,
            expiration: now,
        })
        .await
        .unwrap();

        assert_eq!(repo.get_items_by_user(1).await.unwrap().len(), 1);
        assert!(repo.get_items_by_user(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggestions_respect_prefix_and_limit() {
        // ---
        let repo = MemoryRepository::new();

        let apples = repo.suggest_products("apple", 10).await.unwrap();
        assert_eq!(apples, vec!["apple juice".to_string(), "apples".to_string()]);

        let capped = repo.suggest_products("", 3).await.unwrap();
        assert_eq!(capped.len(), 3);

        assert!(repo.suggest_products("zzz", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn removed_user_no_longer_exists() {
        // ---
        let repo = MemoryRepository::new();

        repo.create_credential("ghost", &[1u8; 64], &[2u8; 16])
            .await
            .unwrap();
        assert!(repo.username_exists("ghost").await.unwrap());

        assert!(repo.remove_user("ghost"));
        assert!(!repo.username_exists("ghost").await.unwrap());
        assert!(!repo.remove_user("ghost"));
    }
}
