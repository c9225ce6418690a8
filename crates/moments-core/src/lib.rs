//! Moments Core Library
//!
//! Shared building blocks for the moments upload pipeline: size constants,
//! content-type classification, storage amounts, error metadata and
//! environment-driven configuration.

pub mod amount;
pub mod config;
pub mod constants;
pub mod content_type;
pub mod error;
pub mod network_kind;

// Re-export commonly used types
pub use amount::{Amount, AmountParseError};
pub use config::{Config, NetworkSettings};
pub use content_type::classify;
pub use error::{ErrorMetadata, LogLevel};
pub use network_kind::NetworkKind;
