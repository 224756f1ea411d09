//! Test doubles and request helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use readom_core::Board;
use readom_counter::{CounterError, CounterResult, EstimatorConnection, EstimatorConnector};
use readom_items::{ItemSource, RemoteItem, SourceError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tower::ServiceExt;

/// In-memory upstream with scripted items and boards.
#[derive(Default)]
pub struct FakeSource {
    items: Mutex<HashMap<i64, RemoteItem>>,
    boards: Mutex<HashMap<Board, Vec<i64>>>,
    boards_down: AtomicBool,
    item_fetches: AtomicU32,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_item(&self, item: RemoteItem) {
        self.items.lock().unwrap().insert(item.id, item);
    }

    pub fn set_board(&self, board: Board, ids: Vec<i64>) {
        self.boards.lock().unwrap().insert(board, ids);
    }

    pub fn set_boards_down(&self, down: bool) {
        self.boards_down.store(down, Ordering::SeqCst);
    }

    pub fn item_fetches(&self) -> u32 {
        self.item_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn fetch_item(&self, id: i64) -> Result<Option<RemoteItem>, SourceError> {
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.lock().unwrap().get(&id).cloned())
    }

    async fn fetch_board(&self, board: Board) -> Result<Vec<i64>, SourceError> {
        if self.boards_down.load(Ordering::SeqCst) {
            return Err(SourceError::new("upstream unreachable"));
        }
        Ok(self
            .boards
            .lock()
            .unwrap()
            .get(&board)
            .cloned()
            .unwrap_or_default())
    }
}

pub fn story(id: i64, title: &str) -> RemoteItem {
    RemoteItem {
        id,
        title: Some(title.to_string()),
        url: Some(format!("https://example.com/{id}")),
        by: Some("pg".to_string()),
        score: Some(10),
        time: Some(1_700_000_000),
        ..RemoteItem::default()
    }
}

/// Connector whose backend is always unreachable.
pub struct DownConnector;

#[async_trait]
impl EstimatorConnector for DownConnector {
    async fn connect(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        Err(CounterError::Backend("connection refused".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "down"
    }
}

/// Send a request and decode the JSON response body.
pub async fn json_request(
    router: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let (status, body) = raw_request(router, method, uri, headers).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Send a request and return the response body as text.
pub async fn text_request(router: &Router, uri: &str) -> (StatusCode, String) {
    let (status, body) = raw_request(router, Method::GET, uri, &[]).await;
    (status, String::from_utf8(body).unwrap())
}

async fn raw_request(
    router: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::empty()).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}
