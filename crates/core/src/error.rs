//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid page tag: {0}")]
    InvalidPageTag(String),

    #[error("unknown board: {0}")]
    UnknownBoard(String),

    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
