//! Database row models.

use readom_core::ItemView;
use readom_core::item::{epoch_seconds, has_title};
use sqlx::FromRow;
use time::OffsetDateTime;

/// A cached item.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItemRow {
    pub id: i64,
    /// Absent or blank until the item has been fetched successfully.
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub score: i64,
    pub posted_at: Option<OffsetDateTime>,
    pub deleted: bool,
    pub is_top: bool,
    /// Set the first time the item is ranked; never overwritten.
    pub top_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl ItemRow {
    /// Whether the row carries a fetched title.
    pub fn is_populated(&self) -> bool {
        has_title(self.title.as_deref())
    }

    /// Client-facing representation.
    pub fn to_view(&self) -> ItemView {
        ItemView {
            id: self.id,
            title: self.title.clone(),
            url: self.url.clone(),
            by: self.author.clone(),
            score: self.score,
            time: epoch_seconds(self.posted_at),
        }
    }
}

impl From<ItemRow> for ItemView {
    fn from(row: ItemRow) -> Self {
        ItemView {
            id: row.id,
            title: row.title,
            url: row.url,
            by: row.author,
            score: row.score,
            time: epoch_seconds(row.posted_at),
        }
    }
}

/// Fields overwritten by a successful remote fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub title: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub score: i64,
    pub posted_at: Option<OffsetDateTime>,
}

/// Filter for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Only items with this top-rank flag.
    pub is_top: Option<bool>,
    /// Include soft-deleted items.
    pub include_deleted: bool,
    pub limit: Option<u32>,
}

impl ItemFilter {
    pub fn top() -> Self {
        Self {
            is_top: Some(true),
            ..Self::default()
        }
    }

    pub(crate) fn limit_value(&self) -> i64 {
        self.limit.map(i64::from).unwrap_or(i64::MAX)
    }
}
