//! Estimator backend trait definitions.
//!
//! The counter store needs five primitives from its backend: string sets,
//! integer hashes, a HyperLogLog-style cardinality estimator, and a liveness
//! probe. Anything that speaks these can back the analytics counters.

use crate::error::CounterResult;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// A live connection to an estimator backend.
#[async_trait]
pub trait EstimatorConnection: Send + Sync {
    /// Add a member to a set. Returns true if it was not already present.
    async fn set_add(&self, key: &str, member: &str) -> CounterResult<bool>;

    /// All members of a set. Missing sets are empty.
    async fn set_members(&self, key: &str) -> CounterResult<HashSet<String>>;

    /// Increment an integer hash field, returning the new value.
    async fn hash_incr_by(&self, key: &str, field: &str, delta: i64) -> CounterResult<i64>;

    /// Read a hash field.
    async fn hash_get(&self, key: &str, field: &str) -> CounterResult<Option<String>>;

    /// Feed a member into an estimator. Returns true if the estimate may have changed.
    async fn pf_add(&self, key: &str, member: &str) -> CounterResult<bool>;

    /// Approximate number of distinct members fed into an estimator.
    async fn pf_count(&self, key: &str) -> CounterResult<u64>;

    /// Liveness probe.
    async fn ping(&self) -> CounterResult<()>;
}

/// Opens connections to an estimator backend.
#[async_trait]
pub trait EstimatorConnector: Send + Sync {
    /// Establish a fresh connection.
    async fn connect(&self) -> CounterResult<Arc<dyn EstimatorConnection>>;

    /// Backend name used in logs.
    fn backend_name(&self) -> &'static str;
}
