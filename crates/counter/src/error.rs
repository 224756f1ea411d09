//! Counter store error types.

use thiserror::Error;

/// Counter store operation errors.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("estimator backend error: {0}")]
    Backend(String),

    #[error("estimator command timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("counter store unavailable after {attempts} connection attempts")]
    Unavailable { attempts: u32 },

    #[error("invalid counter value at {key}/{field}: {value}")]
    InvalidValue {
        key: String,
        field: String,
        value: String,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for counter operations.
pub type CounterResult<T> = std::result::Result<T, CounterError>;
