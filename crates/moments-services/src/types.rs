//! Types produced by the upload pipeline

use moments_core::{Amount, NetworkKind};
use moments_storage::FundReceipt;
use serde::Serialize;

/// How a payload reaches the storage network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadPath {
    /// In-memory buffer sent as-is
    Direct,
    /// Staged to disk, then streamed from the staging file
    Streaming,
}

/// Price and balance observed by one funding preflight
///
/// `balance` is the balance before any top-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundingState {
    pub price: Amount,
    pub balance: Amount,
    pub top_up: Option<FundReceipt>,
}

impl FundingState {
    pub fn was_funded(&self) -> bool {
        self.top_up.is_some()
    }
}

/// Side-effect free price/balance comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub network: NetworkKind,
    pub size_bytes: u64,
    pub price: Amount,
    pub balance: Amount,
    pub has_sufficient_funds: bool,
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Public gateway URL
    pub url: String,
    /// Protocol-scheme URI, e.g. `ar://<id>`
    pub uri: String,
    pub transaction_id: String,
    pub network: NetworkKind,
    pub path: UploadPath,
    pub used_fallback: bool,
}
