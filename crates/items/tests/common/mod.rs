//! Shared helpers for item cache integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use readom_core::Board;
use readom_items::{ItemCache, ItemStore, ItemSource, RemoteItem, SourceError, SqliteStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

/// Scripted response for one item id.
#[derive(Clone)]
pub enum Scripted {
    Item(RemoteItem),
    Missing,
    Fail,
}

/// In-memory remote source with per-id scripted responses.
#[derive(Default)]
pub struct FakeSource {
    items: Mutex<HashMap<i64, Scripted>>,
    boards: Mutex<HashMap<Board, Vec<i64>>>,
    item_fetches: AtomicU32,
}

impl FakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, id: i64, response: Scripted) {
        self.items.lock().unwrap().insert(id, response);
    }

    pub fn with_item(&self, item: RemoteItem) {
        self.script(item.id, Scripted::Item(item));
    }

    pub fn set_board(&self, board: Board, ids: Vec<i64>) {
        self.boards.lock().unwrap().insert(board, ids);
    }

    pub fn item_fetches(&self) -> u32 {
        self.item_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemSource for FakeSource {
    async fn fetch_item(&self, id: i64) -> Result<Option<RemoteItem>, SourceError> {
        self.item_fetches.fetch_add(1, Ordering::SeqCst);
        let scripted = self.items.lock().unwrap().get(&id).cloned();
        match scripted {
            Some(Scripted::Item(item)) => Ok(Some(item)),
            Some(Scripted::Fail) => Err(SourceError::new("upstream unreachable")),
            Some(Scripted::Missing) | None => Ok(None),
        }
    }

    async fn fetch_board(&self, board: Board) -> Result<Vec<i64>, SourceError> {
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
        score: Some(1),
        ..RemoteItem::default()
    }
}

/// A SQLite-backed cache in a temporary directory.
pub struct TestCache {
    pub cache: ItemCache,
    pub store: Arc<SqliteStore>,
    pub source: Arc<FakeSource>,
    _temp_dir: TempDir,
}

impl TestCache {
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteStore::new(temp_dir.path().join("items.db"))
                .await
                .unwrap(),
        );
        let source = FakeSource::new();
        let cache = ItemCache::new(store.clone(), source.clone());
        Self {
            cache,
            store,
            source,
            _temp_dir: temp_dir,
        }
    }
}

pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "failed to start postgres container";

/// A PostgreSQL container with a migrated store.
pub struct PostgresTestStore {
    _container: ContainerAsync<Postgres>,
    store: Arc<dyn ItemStore>,
}

impl PostgresTestStore {
    pub async fn new() -> Result<Self, String> {
        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .map_err(|e| format!("{POSTGRES_CONTAINER_START_ERR_PREFIX}: {e}"))?;
        let host = container
            .get_host()
            .await
            .map_err(|e| format!("failed to get host: {e}"))?;
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| format!("failed to get port: {e}"))?;

        let url = format!("postgres://postgres:postgres@{host}:{port}/postgres");
        let store = readom_items::PostgresStore::from_url(&url, 5, Some(30_000))
            .await
            .map_err(|e| format!("failed to open store: {e}"))?;
        Ok(Self {
            _container: container,
            store: Arc::new(store),
        })
    }

    pub fn store(&self) -> Arc<dyn ItemStore> {
        self.store.clone()
    }
}

/// Start PostgreSQL, skipping if Docker is unavailable or
/// SKIP_CONTAINER_TESTS is set.
///
/// Only container-start failures cause a skip; setup errors still panic.
pub async fn postgres_or_skip() -> Option<PostgresTestStore> {
    if std::env::var("SKIP_CONTAINER_TESTS").is_ok() {
        return None;
    }
    match PostgresTestStore::new().await {
        Ok(store) => Some(store),
        Err(msg) if msg.contains(POSTGRES_CONTAINER_START_ERR_PREFIX) => {
            eprintln!("Skipping PostgreSQL test (Docker unavailable): {msg}");
            None
        }
        Err(msg) => panic!("PostgreSQL test setup failed: {msg}"),
    }
}
