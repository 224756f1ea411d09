//! Item cache for Readom.
//!
//! This crate provides:
//! - The durable item store (SQLite or PostgreSQL)
//! - The remote item source abstraction
//! - Fetch-through resolution, top-rank marking and the retention sweep

pub mod cache;
pub mod error;
pub mod models;
pub mod postgres;
pub mod repos;
pub mod source;
pub mod store;

pub use cache::{CleanupReport, ItemCache, ItemLookup, RetentionPolicy};
pub use error::{ItemStoreError, ItemStoreResult};
pub use models::{ItemFields, ItemFilter, ItemRow};
pub use postgres::PostgresStore;
pub use repos::ItemRepo;
pub use source::{ItemSource, RemoteItem, SourceError};
pub use store::{ItemStore, SqliteStore};

use readom_core::config::ItemStoreConfig;
use std::sync::Arc;

/// Create an item store from configuration.
pub async fn from_config(config: &ItemStoreConfig) -> ItemStoreResult<Arc<dyn ItemStore>> {
    config.validate().map_err(ItemStoreError::Config)?;

    match config {
        ItemStoreConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn ItemStore>)
        }
        ItemStoreConfig::Postgres {
            url,
            max_connections,
            statement_timeout_ms,
        } => {
            tracing::info!("Connecting to PostgreSQL item store");
            let store = PostgresStore::from_url(url, *max_connections, *statement_timeout_ms).await?;
            Ok(Arc::new(store) as Arc<dyn ItemStore>)
        }
    }
}
