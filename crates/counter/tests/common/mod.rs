//! Shared helpers for counter store integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use readom_counter::{
    CounterError, CounterOptions, CounterResult, CounterStore, EstimatorConnection,
    EstimatorConnector, MemoryEstimatorStore,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

pub fn test_options() -> CounterOptions {
    CounterOptions {
        key_prefix: "test:".to_string(),
        retry_attempts: 3,
        max_jitter: Duration::ZERO,
    }
}

/// Connector over a shared memory store that can simulate outages.
///
/// While `down` is set, connects fail and every command on an already open
/// connection fails. `refuse_connects` fails the next N connect attempts.
#[derive(Clone)]
pub struct FlakyConnector {
    store: Arc<MemoryEstimatorStore>,
    down: Arc<AtomicBool>,
    refuse_connects: Arc<AtomicU32>,
    connects: Arc<AtomicU32>,
}

impl FlakyConnector {
    pub fn new() -> Self {
        Self {
            store: MemoryEstimatorStore::new(),
            down: Arc::new(AtomicBool::new(false)),
            refuse_connects: Arc::new(AtomicU32::new(0)),
            connects: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn store(&self) -> &Arc<MemoryEstimatorStore> {
        &self.store
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn refuse_next_connects(&self, n: u32) {
        self.refuse_connects.store(n, Ordering::SeqCst);
    }

    /// Total connect attempts, successful or not.
    pub fn connect_attempts(&self) -> u32 {
        self.connects.load(Ordering::SeqCst)
    }

    pub async fn counter_store(&self) -> CounterStore {
        CounterStore::new(Arc::new(self.clone()), test_options()).await
    }
}

#[async_trait]
impl EstimatorConnector for FlakyConnector {
    async fn connect(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            return Err(CounterError::Backend("connection refused".to_string()));
        }
        let refused = self
            .refuse_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(CounterError::Backend("connection refused".to_string()));
        }
        Ok(Arc::new(FlakyConnection {
            store: self.store.clone(),
            down: self.down.clone(),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}

struct FlakyConnection {
    store: Arc<MemoryEstimatorStore>,
    down: Arc<AtomicBool>,
}

impl FlakyConnection {
    fn check(&self) -> CounterResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(CounterError::Backend("connection reset".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EstimatorConnection for FlakyConnection {
    async fn set_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        self.check()?;
        self.store.set_add(key, member).await
    }

    async fn set_members(&self, key: &str) -> CounterResult<HashSet<String>> {
        self.check()?;
        self.store.set_members(key).await
    }

    async fn hash_incr_by(&self, key: &str, field: &str, delta: i64) -> CounterResult<i64> {
        self.check()?;
        self.store.hash_incr_by(key, field, delta).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> CounterResult<Option<String>> {
        self.check()?;
        self.store.hash_get(key, field).await
    }

    async fn pf_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        self.check()?;
        self.store.pf_add(key, member).await
    }

    async fn pf_count(&self, key: &str) -> CounterResult<u64> {
        self.check()?;
        self.store.pf_count(key).await
    }

    async fn ping(&self) -> CounterResult<()> {
        self.check()
    }
}
