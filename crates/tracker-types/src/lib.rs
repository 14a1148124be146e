//! Common types module for the order progress tracker.
//!
//! This module defines the core data types shared by every tracker crate:
//! orders and their statuses, the per-order step vector, delivery details,
//! wire types for the order service, storage keys and configuration
//! validation helpers.

/// Wire types exchanged with the remote order service.
pub mod api;
/// Delivery sub-flow types (carriers, captured delivery details).
pub mod delivery;
/// Order types including status, transaction mode and display attributes.
pub mod order;
/// Step vector types describing the visible fulfillment checklist.
pub mod progress;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Redacting wrapper for access tokens.
pub mod secret_string;
/// Storage key layout for the persisted per-order cache.
pub mod storage;
/// Utility functions for display formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

// Re-export all types for convenient access
pub use api::*;
pub use delivery::*;
pub use order::*;
pub use progress::*;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use utils::{percent_encode, truncate_id};
pub use validation::*;
