//! Remote item source abstraction.

use crate::models::ItemFields;
use async_trait::async_trait;
use readom_core::Board;
use readom_core::item::has_title;
use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;

/// Failure reported by a remote source.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SourceError(#[from] Box<dyn std::error::Error + Send + Sync>);

impl SourceError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// An item as reported by the remote source. Every field but `id` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub score: Option<i64>,
    /// Unix epoch seconds.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub dead: Option<bool>,
}

impl RemoteItem {
    pub fn has_title(&self) -> bool {
        has_title(self.title.as_deref())
    }

    /// Deleted or flagged dead upstream.
    pub fn is_gone(&self) -> bool {
        self.deleted.unwrap_or(false) || self.dead.unwrap_or(false)
    }

    /// Fields to persist for this item. Out-of-range timestamps are dropped.
    pub fn to_fields(&self) -> ItemFields {
        ItemFields {
            title: self.title.clone(),
            url: self.url.clone(),
            author: self.by.clone(),
            score: self.score.unwrap_or(0),
            posted_at: self
                .time
                .and_then(|t| OffsetDateTime::from_unix_timestamp(t).ok()),
        }
    }
}

/// A remote source of items and board listings.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// Fetch one item. `Ok(None)` means the source has no such item.
    async fn fetch_item(&self, id: i64) -> Result<Option<RemoteItem>, SourceError>;

    /// Fetch the ordered id list of a board.
    async fn fetch_board(&self, board: Board) -> Result<Vec<i64>, SourceError>;
}
