//! # hearth-db: Record Stores for Hearth POS
//!
//! Every read and write of users, catalog, customers and orders goes through
//! the [`RecordStore`] trait. Three backends implement it; the server picks
//! one at startup from a [`StoreConfig`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Hearth POS Data Flow                             │
//! │                                                                         │
//! │  HTTP handler → service (catalog, settlement, metrics ...)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     hearth-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  RecordStore  │    │    Backends   │    │  Migrations  │  │   │
//! │  │   │  (store.rs)   │◄───│ memory / csv  │    │  (embedded)  │  │   │
//! │  │   │               │    │ / sqlite      │    │ 001_init.sql │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - The `RecordStore` trait
//! - [`tables`] - In-process tables shared by the memory and CSV backends
//! - [`memory`], [`csv_store`], [`sqlite_store`] - Backends
//! - [`migrations`] - Embedded SQLite migrations
//! - [`seed`] - Default bakery data
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hearth_db::{open_store, seed_defaults, StoreConfig};
//!
//! let store = open_store(&StoreConfig::Csv { dir: "./data".into() }).await?;
//! seed_defaults(store.as_ref()).await?;
//! let products = store.list_products().await?;
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod csv_store;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod seed;
pub mod sqlite_store;
pub mod store;
pub mod tables;

// =============================================================================
// Re-exports
// =============================================================================

pub use csv_store::CsvStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use seed::{seed_defaults, SeedReport};
pub use sqlite_store::{SqliteConfig, SqliteStore};
pub use store::{RecordStore, StoreHealth};

/// Which backend to open, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    /// One CSV file per record kind inside `dir`.
    Csv { dir: PathBuf },
    Sqlite { path: PathBuf },
}

/// Opens the configured backend.
pub async fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn RecordStore>> {
    let store: Arc<dyn RecordStore> = match config {
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
        StoreConfig::Csv { dir } => Arc::new(CsvStore::open(dir).await?),
        StoreConfig::Sqlite { path } => {
            Arc::new(SqliteStore::open(SqliteConfig::new(path)).await?)
        }
    };

    info!(config = ?config, "Record store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_reports_backend() {
        let dir = tempfile::tempdir().unwrap();

        let memory = open_store(&StoreConfig::Memory).await.unwrap();
        assert_eq!(memory.health().await.unwrap().backend, "memory");

        let csv = open_store(&StoreConfig::Csv {
            dir: dir.path().join("csv"),
        })
        .await
        .unwrap();
        assert_eq!(csv.health().await.unwrap().backend, "csv");

        let sqlite = open_store(&StoreConfig::Sqlite {
            path: dir.path().join("db").join("hearth.db"),
        })
        .await
        .unwrap();
        let health = sqlite.health().await.unwrap();
        assert_eq!(health.backend, "sqlite");
        assert_eq!(health.migrations_applied, Some(1));
    }
}
