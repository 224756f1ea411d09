//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("counter store error: {0}")]
    Counter(#[from] readom_counter::CounterError),

    #[error("item store error: {0}")]
    Items(#[from] readom_items::ItemStoreError),

    #[error("{0}")]
    Core(#[from] readom_core::Error),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Upstream(_) => "upstream_unavailable",
            Self::Counter(_) => "counter_unavailable",
            Self::Items(_) => "item_store_error",
            Self::Core(e) => match e {
                readom_core::Error::InvalidPageTag(_) => "invalid_page_tag",
                readom_core::Error::UnknownBoard(_) => "unknown_board",
                readom_core::Error::InvalidItemId(_) => "invalid_item_id",
                readom_core::Error::Config(_) => "config_error",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Counter(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Items(e) => match e {
                readom_items::ItemStoreError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(e) => match e {
                readom_core::Error::UnknownBoard(_) => StatusCode::NOT_FOUND,
                readom_core::Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(code = self.code(), error = %self, "Request failed");
        }
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
