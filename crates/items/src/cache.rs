//! Fetch-through item cache.
//!
//! Locally stored rows with a non-blank title are served as-is. Anything
//! else goes to the remote source; only a payload with a usable title is
//! written back. Unresolvable items leave no row behind.

use crate::error::ItemStoreResult;
use crate::models::{ItemFilter, ItemRow};
use crate::source::ItemSource;
use crate::store::ItemStore;
use readom_core::config::RetentionConfig;
use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

/// How an item lookup was satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemLookup {
    /// Populated row found locally.
    Hit(ItemRow),
    /// Fetched from the remote source and persisted.
    Fetched(ItemRow),
    /// Neither local nor remote had a usable record.
    Unavailable,
}

impl ItemLookup {
    pub fn into_row(self) -> Option<ItemRow> {
        match self {
            Self::Hit(row) | Self::Fetched(row) => Some(row),
            Self::Unavailable => None,
        }
    }

    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hit(_) => "hit",
            Self::Fetched(_) => "fetched",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Retention thresholds for the cleanup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub high_water_mark: u64,
    pub batch_size: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from(&RetentionConfig::default())
    }
}

impl From<&RetentionConfig> for RetentionPolicy {
    fn from(config: &RetentionConfig) -> Self {
        Self {
            high_water_mark: config.high_water_mark,
            batch_size: config.batch_size,
        }
    }
}

/// Outcome of a cleanup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CleanupReport {
    Clean { count: u64, previous_count: u64 },
    Noop,
}

impl CleanupReport {
    pub fn deleted(&self) -> u64 {
        match self {
            Self::Clean {
                count,
                previous_count,
            } => previous_count.saturating_sub(*count),
            Self::Noop => 0,
        }
    }
}

/// Item cache over a durable store and a remote source.
pub struct ItemCache {
    store: Arc<dyn ItemStore>,
    source: Arc<dyn ItemSource>,
}

impl ItemCache {
    pub fn new(store: Arc<dyn ItemStore>, source: Arc<dyn ItemSource>) -> Self {
        Self { store, source }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    pub fn source(&self) -> &Arc<dyn ItemSource> {
        &self.source
    }

    /// Resolve an item, fetching through to the remote source on a miss.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: i64) -> ItemStoreResult<ItemLookup> {
        let existing = self.store.get_item(id).await?;
        if let Some(row) = &existing
            && row.is_populated()
        {
            debug!("Item cache hit");
            return Ok(ItemLookup::Hit(row.clone()));
        }

        let remote = match self.source.fetch_item(id).await {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                debug!("Item not found upstream");
                return Ok(ItemLookup::Unavailable);
            }
            Err(e) => {
                warn!(error = %e, "Upstream item fetch failed");
                return Ok(ItemLookup::Unavailable);
            }
        };

        if remote.is_gone() {
            if existing.is_some() {
                self.store.soft_delete_item(id).await?;
                info!("Item removed upstream, soft-deleted locally");
            }
            return Ok(ItemLookup::Unavailable);
        }

        if !remote.has_title() {
            debug!("Upstream item has no title");
            return Ok(ItemLookup::Unavailable);
        }

        if existing.is_none() {
            self.store.create_item(id).await?;
        }
        let row = self.store.update_item_fields(id, &remote.to_fields()).await?;
        debug!("Item fetched and stored");
        Ok(ItemLookup::Fetched(row))
    }

    /// Populated row for `id`, or `None` if it cannot be resolved right now.
    pub async fn get_or_fetch(&self, id: i64) -> ItemStoreResult<Option<ItemRow>> {
        Ok(self.resolve(id).await?.into_row())
    }

    /// Flag each id as top-ranked, creating placeholder rows as needed.
    ///
    /// Returns how many items were ranked for the first time.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn mark_top_ranked(&self, ids: &[i64]) -> ItemStoreResult<u64> {
        let now = OffsetDateTime::now_utc();
        let mut newly_ranked = 0;
        for &id in ids {
            if self.store.get_item(id).await?.is_none() {
                self.store.create_item(id).await?;
            }
            if self.store.mark_top(id, now).await? {
                newly_ranked += 1;
            }
        }
        debug!(newly_ranked, "Marked top-ranked items");
        Ok(newly_ranked)
    }

    /// List stored items.
    pub async fn list(&self, filter: &ItemFilter) -> ItemStoreResult<Vec<ItemRow>> {
        self.store.list_items(filter).await
    }

    /// Delete the oldest batch once the store grows past the high-water mark.
    #[instrument(skip(self))]
    pub async fn cleanup(&self, policy: &RetentionPolicy) -> ItemStoreResult<CleanupReport> {
        let previous_count = self.store.count_items().await?;
        if previous_count <= policy.high_water_mark {
            debug!(count = previous_count, "Retention sweep: nothing to do");
            return Ok(CleanupReport::Noop);
        }

        let deleted = self.store.delete_oldest_items(policy.batch_size).await?;
        let count = self.store.count_items().await?;
        info!(previous_count, count, deleted, "Retention sweep deleted items");
        Ok(CleanupReport::Clean {
            count,
            previous_count,
        })
    }

    pub async fn health_check(&self) -> ItemStoreResult<()> {
        self.store.health_check().await
    }
}
