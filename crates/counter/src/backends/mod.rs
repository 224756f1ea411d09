//! Estimator backend implementations.

pub mod memory;
pub mod redis;

pub use memory::{MemoryConnector, MemoryEstimatorStore};
pub use redis::{RedisConnection, RedisConnector};
