//! Server test utilities.

use super::fixtures::FakeSource;
use readom_core::config::AppConfig;
use readom_counter::{
    CounterOptions, CounterStore, EstimatorConnector, MemoryConnector, MemoryEstimatorStore,
};
use readom_items::{ItemCache, SqliteStore};
use readom_server::{AppState, create_router};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub source: Arc<FakeSource>,
    pub items: Arc<SqliteStore>,
    pub counter_store: Arc<MemoryEstimatorStore>,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server with an in-memory counter and a temporary SQLite store.
    pub async fn new() -> Self {
        let store = MemoryEstimatorStore::new();
        Self::build(Arc::new(MemoryConnector::with_store(store.clone())), store).await
    }

    /// Create a test server whose counter uses the given connector.
    pub async fn with_connector(connector: Arc<dyn EstimatorConnector>) -> Self {
        Self::build(connector, MemoryEstimatorStore::new()).await
    }

    async fn build(
        connector: Arc<dyn EstimatorConnector>,
        counter_store: Arc<MemoryEstimatorStore>,
    ) -> Self {
        readom_server::metrics::register_metrics();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let items = Arc::new(
            SqliteStore::new(temp_dir.path().join("items.db"))
                .await
                .expect("Failed to create item store"),
        );
        let source = FakeSource::new();

        let options = CounterOptions {
            key_prefix: "test:".to_string(),
            retry_attempts: 2,
            max_jitter: Duration::ZERO,
        };
        let counter = CounterStore::new(connector, options).await;
        let cache = ItemCache::new(items.clone(), source.clone());

        let state = AppState::new(AppConfig::for_testing(), counter, cache);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            source,
            items,
            counter_store,
            _temp_dir: temp_dir,
        }
    }
}
