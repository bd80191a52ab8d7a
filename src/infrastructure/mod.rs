mod database;
mod memory;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::{create_postgres_repository, init_database_with_retry};
pub use memory::{create_memory_repository, MemoryRepository};
pub use metrics::{create_noop_metrics, create_prom_metrics};
