//! In-process estimator backend.
//!
//! Suitable for single-instance deployments and tests. State lives as long
//! as the [`MemoryEstimatorStore`] does; every connection handed out by a
//! [`MemoryConnector`] shares it.

use crate::error::{CounterError, CounterResult};
use crate::traits::{EstimatorConnection, EstimatorConnector};
use async_trait::async_trait;
use cardinality_estimator::estimator::CardinalityEstimator;
use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

type VisitorEstimator = CardinalityEstimator<String>;

/// Shared in-memory sets, hashes and estimators.
#[derive(Default)]
pub struct MemoryEstimatorStore {
    sets: DashMap<String, HashSet<String>>,
    hashes: DashMap<String, HashMap<String, i64>>,
    estimators: DashMap<String, VisitorEstimator>,
}

impl fmt::Debug for MemoryEstimatorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryEstimatorStore")
            .field("sets", &self.sets.len())
            .field("hashes", &self.hashes.len())
            .field("estimators", &self.estimators.len())
            .finish()
    }
}

impl MemoryEstimatorStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of keys across all kinds.
    pub fn key_count(&self) -> usize {
        self.sets.len() + self.hashes.len() + self.estimators.len()
    }

    /// Overwrite a hash field. Used to seed state in tests.
    pub fn set_hash_field(&self, key: &str, field: &str, value: i64) {
        self.hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value);
    }
}

#[async_trait]
impl EstimatorConnection for MemoryEstimatorStore {
    async fn set_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        Ok(self
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string()))
    }

    async fn set_members(&self, key: &str) -> CounterResult<HashSet<String>> {
        Ok(self
            .sets
            .get(key)
            .map(|set| set.clone())
            .unwrap_or_default())
    }

    async fn hash_incr_by(&self, key: &str, field: &str, delta: i64) -> CounterResult<i64> {
        let mut hash = self.hashes.entry(key.to_string()).or_default();
        let value = hash.entry(field.to_string()).or_insert(0);
        *value = value.checked_add(delta).ok_or_else(|| {
            CounterError::Backend(format!("increment would overflow {key}/{field}"))
        })?;
        Ok(*value)
    }

    async fn hash_get(&self, key: &str, field: &str) -> CounterResult<Option<String>> {
        Ok(self
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field).map(i64::to_string)))
    }

    /// Reports a change when the estimate moved, as `PFADD` does for Redis.
    async fn pf_add(&self, key: &str, member: &str) -> CounterResult<bool> {
        let mut estimator = self
            .estimators
            .entry(key.to_string())
            .or_insert_with(VisitorEstimator::new);
        let before = estimator.estimate();
        estimator.insert(&member.to_string());
        Ok(estimator.estimate() > before)
    }

    async fn pf_count(&self, key: &str) -> CounterResult<u64> {
        let estimate = self
            .estimators
            .get(key)
            .map(|estimator| estimator.estimate())
            .unwrap_or(0);
        Ok(u64::try_from(estimate).unwrap_or(u64::MAX))
    }

    async fn ping(&self) -> CounterResult<()> {
        Ok(())
    }
}

/// Hands out connections to a shared [`MemoryEstimatorStore`].
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    store: Arc<MemoryEstimatorStore>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::with_store(MemoryEstimatorStore::new())
    }

    pub fn with_store(store: Arc<MemoryEstimatorStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MemoryEstimatorStore> {
        &self.store
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EstimatorConnector for MemoryConnector {
    async fn connect(&self) -> CounterResult<Arc<dyn EstimatorConnection>> {
        let conn: Arc<dyn EstimatorConnection> = self.store.clone();
        Ok(conn)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
