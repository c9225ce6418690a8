//! Size thresholds that drive path selection and fallback eligibility.

use moments_core::constants::{
    FALLBACK_CEILING_BYTES, MAX_UPLOAD_BYTES, STREAMING_THRESHOLD_BYTES,
};
use moments_core::Config;

use crate::error::UploadError;
use crate::types::UploadPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Inclusive upper bound on payload size
    pub max_bytes: u64,
    /// Payloads strictly above this are streamed from disk
    pub streaming_threshold_bytes: u64,
    /// Payloads strictly below this may fall back to the secondary network
    pub fallback_ceiling_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadLimits {
            max_bytes: MAX_UPLOAD_BYTES,
            streaming_threshold_bytes: STREAMING_THRESHOLD_BYTES,
            fallback_ceiling_bytes: FALLBACK_CEILING_BYTES,
        }
    }
}

impl UploadLimits {
    pub fn from_config(config: &Config) -> Self {
        UploadLimits {
            max_bytes: config.max_upload_bytes,
            streaming_threshold_bytes: config.streaming_threshold_bytes,
            fallback_ceiling_bytes: config.fallback_ceiling_bytes,
        }
    }

    /// Reject empty and oversized payloads before any I/O
    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size == 0 {
            return Err(UploadError::EmptyPayload);
        }
        if size > self.max_bytes {
            return Err(UploadError::PayloadTooLarge {
                size,
                limit: self.max_bytes,
            });
        }
        Ok(())
    }

    pub fn select_path(&self, size: u64) -> UploadPath {
        if size > self.streaming_threshold_bytes {
            UploadPath::Streaming
        } else {
            UploadPath::Direct
        }
    }

    pub fn fallback_eligible(&self, size: u64) -> bool {
        size < self.fallback_ceiling_bytes
    }
}
