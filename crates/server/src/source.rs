//! Upstream source instrumentation.

use async_trait::async_trait;
use readom_core::Board;
use readom_items::{ItemSource, RemoteItem, SourceError};

use crate::metrics::{UPSTREAM_ERRORS, UPSTREAM_REQUEST_DURATION};

/// Wraps an [`ItemSource`] and records request latency and failures.
pub struct MeteredSource<S> {
    inner: S,
}

impl<S> MeteredSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

fn observe<T>(operation: &str, result: &Result<T, SourceError>) {
    if result.is_err() {
        UPSTREAM_ERRORS.with_label_values(&[operation]).inc();
    }
}

#[async_trait]
impl<S: ItemSource> ItemSource for MeteredSource<S> {
    async fn fetch_item(&self, id: i64) -> Result<Option<RemoteItem>, SourceError> {
        let timer = UPSTREAM_REQUEST_DURATION
            .with_label_values(&["item"])
            .start_timer();
        let result = self.inner.fetch_item(id).await;
        timer.observe_duration();
        observe("item", &result);
        result
    }

    async fn fetch_board(&self, board: Board) -> Result<Vec<i64>, SourceError> {
        let timer = UPSTREAM_REQUEST_DURATION
            .with_label_values(&["board"])
            .start_timer();
        let result = self.inner.fetch_board(board).await;
        timer.observe_duration();
        observe("board", &result);
        result
    }
}
