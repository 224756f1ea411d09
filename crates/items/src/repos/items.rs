//! Item repository trait.

use crate::error::ItemStoreResult;
use crate::models::{ItemFields, ItemFilter, ItemRow};
use async_trait::async_trait;
use time::OffsetDateTime;

/// Repository for cached items.
#[async_trait]
pub trait ItemRepo: Send + Sync {
    /// Get an item by id, including soft-deleted rows.
    async fn get_item(&self, id: i64) -> ItemStoreResult<Option<ItemRow>>;

    /// Insert an empty placeholder row if none exists and return the row.
    async fn create_item(&self, id: i64) -> ItemStoreResult<ItemRow>;

    /// Overwrite the fetched fields of an existing row.
    async fn update_item_fields(&self, id: i64, fields: &ItemFields) -> ItemStoreResult<ItemRow>;

    /// Total number of rows, soft-deleted ones included.
    async fn count_items(&self) -> ItemStoreResult<u64>;

    /// Hard-delete up to `limit` rows, oldest `created_at` first (ties by id).
    async fn delete_oldest_items(&self, limit: u64) -> ItemStoreResult<u64>;

    /// List items ordered by id ascending.
    async fn list_items(&self, filter: &ItemFilter) -> ItemStoreResult<Vec<ItemRow>>;

    /// Set the top-rank flag. `top_at` is assigned only if unset.
    ///
    /// Returns true if this call assigned `top_at`.
    async fn mark_top(&self, id: i64, now: OffsetDateTime) -> ItemStoreResult<bool>;

    /// Set the soft-delete marker. Returns false if the item does not exist.
    async fn soft_delete_item(&self, id: i64) -> ItemStoreResult<bool>;
}
