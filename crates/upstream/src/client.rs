//! HTTP client for the Hacker News Firebase API.

use crate::error::{UpstreamError, UpstreamResult};
use async_trait::async_trait;
use readom_core::Board;
use readom_core::config::UpstreamConfig;
use readom_items::{ItemSource, RemoteItem, SourceError};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::debug;

/// Maximum number of body bytes kept in a status error.
const MAX_ERROR_BODY: usize = 256;

/// Client for `item/{id}.json` and `{board}.json`.
#[derive(Clone)]
pub struct HackerNewsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HackerNewsClient {
    pub fn new(base_url: &str, timeout: Duration) -> UpstreamResult<Self> {
        // Url::join drops the last path segment unless it ends with a slash.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &UpstreamConfig) -> UpstreamResult<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> UpstreamResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> UpstreamResult<T> {
        let started = Instant::now();
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(
            url = %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Upstream request finished"
        );

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| UpstreamError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Fetch one item. A `null` body means the item does not exist.
    pub async fn item(&self, id: i64) -> UpstreamResult<Option<RemoteItem>> {
        let url = self.url(&format!("item/{id}.json"))?;
        self.get_json(url).await
    }

    /// Fetch the ordered id list of a board.
    pub async fn board(&self, board: Board) -> UpstreamResult<Vec<i64>> {
        let url = self.url(&format!("{}.json", board.as_str()))?;
        let ids: Option<Vec<i64>> = self.get_json(url).await?;
        Ok(ids.unwrap_or_default())
    }
}

#[async_trait]
impl ItemSource for HackerNewsClient {
    async fn fetch_item(&self, id: i64) -> Result<Option<RemoteItem>, SourceError> {
        self.item(id).await.map_err(SourceError::new)
    }

    async fn fetch_board(&self, board: Board) -> Result<Vec<i64>, SourceError> {
        self.board(board).await.map_err(SourceError::new)
    }
}
