//! Shared module - Common types and utilities
//!
//! Types shared across all features: node/edge/matrix models, identifier
//! minting and log timing.

#[macro_use]
pub mod macros;
pub mod models;
pub mod utils;

// Re-exports for convenience
pub use models::*;
pub use utils::id_generator::{IdGenerator, IdentifierStrategy};
pub use utils::timing::LogTimer;
