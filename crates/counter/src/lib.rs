//! Analytics counters for Readom.
//!
//! This crate provides:
//! - Per-page, per-day page view counts
//! - Unique visitor counts backed by a HyperLogLog estimator, reconciled on read
//! - A self-healing connection with a bounded, jittered retry budget
//! - Backends: Redis and in-process memory

pub mod backends;
pub mod error;
pub mod keys;
pub mod report;
pub mod store;
pub mod traits;

pub use backends::{MemoryConnector, MemoryEstimatorStore, RedisConnector};
pub use error::{CounterError, CounterResult};
pub use keys::KeySpace;
pub use report::{DailyCounts, PageReport, Report};
pub use store::{ConnectionState, CounterOptions, CounterStore, VisitOutcome};
pub use traits::{EstimatorConnection, EstimatorConnector};

use readom_core::config::{CounterBackendConfig, CounterConfig};
use std::sync::Arc;
use std::time::Duration;

/// Build the estimator connector described by configuration.
pub fn connector_from_config(config: &CounterConfig) -> CounterResult<Arc<dyn EstimatorConnector>> {
    config.validate().map_err(CounterError::Config)?;

    match &config.backend {
        CounterBackendConfig::Redis {
            url,
            connect_timeout_ms,
            response_timeout_ms,
        } => {
            let connector = RedisConnector::new(
                url,
                Duration::from_millis(*connect_timeout_ms),
                Duration::from_millis(*response_timeout_ms),
            )?;
            Ok(Arc::new(connector))
        }
        CounterBackendConfig::Memory => Ok(Arc::new(MemoryConnector::new())),
    }
}

/// Create a counter store from configuration and attempt the initial connection.
pub async fn from_config(config: &CounterConfig) -> CounterResult<CounterStore> {
    let connector = connector_from_config(config)?;
    Ok(CounterStore::new(connector, CounterOptions::from(config)).await)
}
