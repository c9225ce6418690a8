//! Moments Services Library
//!
//! The hybrid upload pipeline: size checks, funding preflight against a
//! pay-per-byte storage network, disk staging for large payloads, and a single
//! primary → secondary fallback for small ones.

pub mod error;
pub mod funding;
pub mod hybrid;
pub mod limits;
pub mod staging;
pub mod types;

// Re-export commonly used types
pub use error::UploadError;
pub use funding::{check_balance, FundingPolicy, FundingPreflight};
pub use hybrid::{HybridUploader, UploadOptions};
pub use limits::UploadLimits;
pub use staging::{StagingArea, StagingFile};
pub use types::{BalanceReport, FundingState, UploadPath, UploadResult};
