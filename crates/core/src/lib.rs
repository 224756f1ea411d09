//! Core domain types and shared logic for the Readom API server.
//!
//! This crate defines the data model used across all other crates:
//! - Page tags used as analytics keys (including the `_ALL` aggregate)
//! - Upstream story boards
//! - The normalized item representation served to clients
//! - Application configuration

pub mod board;
pub mod config;
pub mod error;
pub mod item;
pub mod page;

pub use board::Board;
pub use error::{Error, Result};
pub use item::ItemView;
pub use page::PageTag;

/// Default number of ids resolved per board request.
pub const DEFAULT_BOARD_LIMIT: usize = 30;

/// Upper bound on ids resolved per board request.
pub const MAX_BOARD_LIMIT: usize = 500;
