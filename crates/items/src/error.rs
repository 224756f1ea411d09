//! Item store error types.

use thiserror::Error;

/// Item store operation errors.
#[derive(Debug, Error)]
pub enum ItemStoreError {
    #[error("item not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for item store operations.
pub type ItemStoreResult<T> = std::result::Result<T, ItemStoreError>;
