//! Upstream news API client for Readom.

pub mod client;
pub mod error;

pub use client::HackerNewsClient;
pub use error::{UpstreamError, UpstreamResult};
