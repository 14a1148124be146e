//! Utility functions shared across the tracker crates.

pub mod encoding;
pub mod formatting;

pub use encoding::percent_encode;
pub use formatting::truncate_id;
