//! Storage network abstraction trait
//!
//! This module defines the StorageNetwork trait that all network adapters must implement.

use async_trait::async_trait;
use bytes::Bytes;
use moments_core::{Amount, NetworkKind};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

use crate::tags::TagSet;

/// Storage network operation errors
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Node responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected node response: {0}")]
    Decode(String),

    #[error("Funding transaction {tx_id} was not confirmed")]
    Unconfirmed { tx_id: String },

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for storage network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Owned async reader handed to streaming uploads.
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Sync + Unpin>>;

/// Confirmation of a completed funding transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundReceipt {
    pub tx_id: String,
    pub amount: Amount,
}

/// Identifier of a stored object, as assigned by the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
}

/// Storage network abstraction trait
///
/// Every adapter prices uploads, reports the account balance, tops the account
/// up, and stores tagged payloads. Only some networks accept streamed bodies;
/// callers check [`StorageNetwork::supports_streaming`] before calling
/// [`StorageNetwork::upload_stream`].
#[async_trait]
pub trait StorageNetwork: Send + Sync {
    /// Which network this handle talks to
    fn kind(&self) -> NetworkKind;

    /// Account address the balance and top-ups apply to
    fn address(&self) -> &str;

    /// Price in atomic units to store `size_bytes` bytes
    async fn get_price(&self, size_bytes: u64) -> NetworkResult<Amount>;

    /// Current spendable balance of the account
    async fn get_balance(&self) -> NetworkResult<Amount>;

    /// Top the account up by `amount` and wait for confirmation
    async fn fund(&self, amount: Amount) -> NetworkResult<FundReceipt>;

    /// Store an in-memory payload
    async fn upload_buffer(&self, data: Bytes, tags: &TagSet) -> NetworkResult<UploadReceipt>;

    /// Whether [`StorageNetwork::upload_stream`] is available
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Store a payload read to EOF from `reader`
    ///
    /// `content_length` is the exact number of bytes the reader will yield.
    async fn upload_stream(
        &self,
        _reader: ByteReader,
        _content_length: u64,
        _tags: &TagSet,
    ) -> NetworkResult<UploadReceipt> {
        Err(NetworkError::Unsupported(format!(
            "{} does not accept streamed uploads",
            self.kind()
        )))
    }

    /// Public gateway URL for a stored object
    fn gateway_url(&self, id: &str) -> String;

    /// Protocol-scheme URI for a stored object
    fn protocol_uri(&self, id: &str) -> String {
        format!("ar://{}", id)
    }
}
