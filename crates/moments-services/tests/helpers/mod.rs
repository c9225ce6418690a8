//! In-memory storage network for upload pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use moments_core::{Amount, NetworkKind};
use moments_services::{HybridUploader, StagingArea, UploadLimits, UploadOptions};
use moments_storage::{
    ByteReader, FundReceipt, NetworkError, NetworkResult, Networks, StorageNetwork, TagSet,
    UploadReceipt,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;

/// Network operation as observed by [`MockNetwork`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Price(u64),
    Balance,
    Fund(Amount),
    UploadBuffer(usize),
    UploadStream(u64),
}

/// Scriptable storage network recording every call it receives
pub struct MockNetwork {
    kind: NetworkKind,
    upload_id: String,
    price: Amount,
    balance: Mutex<Amount>,
    streaming: bool,
    fail_price: bool,
    fail_balance: bool,
    fail_fund: bool,
    fail_upload: bool,
    calls: Mutex<Vec<Call>>,
    tags: Mutex<Vec<TagSet>>,
    streamed: Mutex<Vec<u8>>,
}

impl MockNetwork {
    pub fn new(kind: NetworkKind, upload_id: &str) -> Self {
        Self {
            kind,
            upload_id: upload_id.to_string(),
            price: Amount::new(100),
            balance: Mutex::new(Amount::new(500)),
            streaming: false,
            fail_price: false,
            fail_balance: false,
            fail_fund: false,
            fail_upload: false,
            calls: Mutex::new(Vec::new()),
            tags: Mutex::new(Vec::new()),
            streamed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_price(mut self, price: u128) -> Self {
        self.price = Amount::new(price);
        self
    }

    pub fn with_balance(self, balance: u128) -> Self {
        *self.balance.lock().unwrap() = Amount::new(balance);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    pub fn failing_price(mut self) -> Self {
        self.fail_price = true;
        self
    }

    pub fn failing_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    pub fn failing_fund(mut self) -> Self {
        self.fail_fund = true;
        self
    }

    /// Both buffered and streamed uploads fail
    pub fn failing_upload(mut self) -> Self {
        self.fail_upload = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fund_calls(&self) -> Vec<Amount> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Fund(amount) => Some(amount),
                _ => None,
            })
            .collect()
    }

    pub fn upload_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::UploadBuffer(_) | Call::UploadStream(_)))
            .count()
    }

    pub fn last_tags(&self) -> Option<TagSet> {
        self.tags.lock().unwrap().last().cloned()
    }

    pub fn streamed_bytes(&self) -> Vec<u8> {
        self.streamed.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unavailable(&self) -> NetworkError {
        NetworkError::Status {
            status: 503,
            body: format!("{} unavailable", self.kind),
        }
    }
}

#[async_trait]
impl StorageNetwork for MockNetwork {
    fn kind(&self) -> NetworkKind {
        self.kind
    }

    fn address(&self) -> &str {
        "0xmock"
    }

    async fn get_price(&self, size_bytes: u64) -> NetworkResult<Amount> {
        self.record(Call::Price(size_bytes));
        if self.fail_price {
            return Err(self.unavailable());
        }
        Ok(self.price)
    }

    async fn get_balance(&self) -> NetworkResult<Amount> {
        self.record(Call::Balance);
        if self.fail_balance {
            return Err(self.unavailable());
        }
        Ok(*self.balance.lock().unwrap())
    }

    async fn fund(&self, amount: Amount) -> NetworkResult<FundReceipt> {
        self.record(Call::Fund(amount));
        if self.fail_fund {
            return Err(NetworkError::Unconfirmed {
                tx_id: "tx-pending".to_string(),
            });
        }
        let mut balance = self.balance.lock().unwrap();
        *balance = balance.saturating_add(amount);
        Ok(FundReceipt {
            tx_id: "tx-fund".to_string(),
            amount,
        })
    }

    async fn upload_buffer(&self, data: Bytes, tags: &TagSet) -> NetworkResult<UploadReceipt> {
        self.record(Call::UploadBuffer(data.len()));
        self.tags.lock().unwrap().push(tags.clone());
        if self.fail_upload {
            return Err(self.unavailable());
        }
        Ok(UploadReceipt {
            id: self.upload_id.clone(),
        })
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    async fn upload_stream(
        &self,
        mut reader: ByteReader,
        content_length: u64,
        tags: &TagSet,
    ) -> NetworkResult<UploadReceipt> {
        self.record(Call::UploadStream(content_length));
        self.tags.lock().unwrap().push(tags.clone());
        if self.fail_upload {
            return Err(self.unavailable());
        }
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await?;
        *self.streamed.lock().unwrap() = body;
        Ok(UploadReceipt {
            id: self.upload_id.clone(),
        })
    }

    fn gateway_url(&self, id: &str) -> String {
        format!("https://gateway.example/{}", id)
    }

    fn protocol_uri(&self, id: &str) -> String {
        format!("ref://{}", id)
    }
}

/// Scaled-down limits so path and fallback boundaries are cheap to cross
pub fn small_limits() -> UploadLimits {
    UploadLimits {
        max_bytes: 64 * 1024,
        streaming_threshold_bytes: 8 * 1024,
        fallback_ceiling_bytes: 4 * 1024,
    }
}

pub async fn build_uploader(
    primary: &Arc<MockNetwork>,
    secondary: Option<&Arc<MockNetwork>>,
    options: UploadOptions,
    scratch: &Path,
) -> HybridUploader {
    let networks = Networks {
        primary: primary.clone() as Arc<dyn StorageNetwork>,
        secondary: secondary.map(|network| network.clone() as Arc<dyn StorageNetwork>),
    };
    let staging = StagingArea::new(scratch).await.unwrap();
    HybridUploader::new(networks, staging, options)
}

pub fn options(limits: UploadLimits) -> UploadOptions {
    UploadOptions {
        limits,
        tag_content_hash: false,
        ..UploadOptions::default()
    }
}

/// Number of entries currently in the scratch directory
pub fn scratch_entries(scratch: &Path) -> usize {
    std::fs::read_dir(scratch).map(|dir| dir.count()).unwrap_or(0)
}
