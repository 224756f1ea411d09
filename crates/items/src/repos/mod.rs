//! Repository trait definitions.

pub mod items;

pub use items::ItemRepo;
