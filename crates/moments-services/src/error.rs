//! Upload pipeline errors
//!
//! Every network failure keeps its source so the caller can log the full chain
//! while mapping the variant onto a client-facing status through
//! [`ErrorMetadata`].

use moments_core::{Amount, ErrorMetadata, LogLevel, NetworkKind};
use moments_storage::NetworkError;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Payload of {size} bytes exceeds the {limit} byte upload limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Payload is empty")]
    EmptyPayload,

    #[error("Failed to query {network}: {source}")]
    NetworkQuery {
        network: NetworkKind,
        #[source]
        source: NetworkError,
    },

    #[error("Funding {network} with {amount} failed: {source}")]
    FundingTransaction {
        network: NetworkKind,
        amount: Amount,
        #[source]
        source: NetworkError,
    },

    #[error("Upload to {network} failed: {source}")]
    Upload {
        network: NetworkKind,
        #[source]
        source: NetworkError,
    },

    #[error("Staging file {action} failed (cleanup attempted): {source}")]
    Staging {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl UploadError {
    pub(crate) fn staging(action: &'static str, source: std::io::Error) -> Self {
        UploadError::Staging { action, source }
    }

    /// The storage network the failure came from, if any
    pub fn network(&self) -> Option<NetworkKind> {
        match self {
            UploadError::NetworkQuery { network, .. }
            | UploadError::FundingTransaction { network, .. }
            | UploadError::Upload { network, .. } => Some(*network),
            _ => None,
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        match self {
            UploadError::PayloadTooLarge { .. } => 413,
            UploadError::EmptyPayload => 400,
            UploadError::NetworkQuery { .. } | UploadError::FundingTransaction { .. } => 503,
            UploadError::Upload { .. } | UploadError::Staging { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            UploadError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            UploadError::EmptyPayload => "EMPTY_PAYLOAD",
            UploadError::NetworkQuery { .. } => "NETWORK_UNAVAILABLE",
            UploadError::FundingTransaction { .. } => "FUNDING_FAILED",
            UploadError::Upload { .. } => "UPLOAD_FAILED",
            UploadError::Staging { .. } => "STAGING_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            UploadError::PayloadTooLarge { .. } | UploadError::EmptyPayload
        )
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            UploadError::PayloadTooLarge { .. } => Some("Reduce file size to 6GB or less"),
            UploadError::EmptyPayload => Some("Select a non-empty file"),
            UploadError::NetworkQuery { .. } => Some("Check network connectivity and retry"),
            UploadError::FundingTransaction { .. } => {
                Some("Check the wallet balance and retry after a short delay")
            }
            UploadError::Upload { .. } | UploadError::Staging { .. } => {
                Some("Retry after a short delay")
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::PayloadTooLarge { size, limit } => format!(
                "File size {} bytes exceeds the {} byte limit",
                size, limit
            ),
            UploadError::EmptyPayload => "No file data received".to_string(),
            UploadError::NetworkQuery { .. } => {
                "Network error - storage network unreachable".to_string()
            }
            UploadError::FundingTransaction { .. } => {
                "Storage account could not be funded".to_string()
            }
            UploadError::Upload { .. } | UploadError::Staging { .. } => {
                "File upload failed".to_string()
            }
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            UploadError::PayloadTooLarge { .. } | UploadError::EmptyPayload => LogLevel::Debug,
            UploadError::NetworkQuery { .. } | UploadError::FundingTransaction { .. } => {
                LogLevel::Warn
            }
            UploadError::Upload { .. } | UploadError::Staging { .. } => LogLevel::Error,
        }
    }
}
