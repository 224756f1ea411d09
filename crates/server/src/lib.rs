//! HTTP API server for Readom.
//!
//! This crate provides the HTTP surface:
//! - Item and board endpoints backed by the fetch-through item cache
//! - Visit counting per page with best-effort writes
//! - Visit statistics reports
//! - Retention sweeps (on demand and scheduled)
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod source;
pub mod state;
pub mod visitor;

pub use error::ApiError;
pub use routes::create_router;
pub use source::MeteredSource;
pub use state::AppState;
pub use visitor::VisitorId;
