//! Application state shared across handlers.

use readom_core::config::AppConfig;
use readom_counter::CounterStore;
use readom_items::{ItemCache, RetentionPolicy};
use std::sync::Arc;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Page view and unique visitor counters.
    pub counter: Arc<CounterStore>,
    /// Fetch-through item cache.
    pub items: Arc<ItemCache>,
}

impl AppState {
    pub fn new(config: AppConfig, counter: CounterStore, items: ItemCache) -> Self {
        Self {
            config: Arc::new(config),
            counter: Arc::new(counter),
            items: Arc::new(items),
        }
    }

    /// Retention thresholds from configuration.
    pub fn retention_policy(&self) -> RetentionPolicy {
        RetentionPolicy::from(&self.config.retention)
    }
}
