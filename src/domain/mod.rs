pub mod auth;
mod metrics;
mod models;
pub mod password;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the persistence abstractions
pub use models::{Credential, Item, LookupTables, NewItem, SessionUser};
pub use repository::{DuplicateUsername, Repository, RepositoryPtr};
