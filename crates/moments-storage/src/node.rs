//! HTTP client for bundler-node style storage networks.
//!
//! Both network adapters share this client; they differ only in gateway,
//! streaming support and defaults.

use std::time::{Duration, Instant};

use moments_core::{Amount, NetworkKind, NetworkSettings};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Body, Client, Response};
use serde::{Deserialize, Serialize};

use crate::tags::{self, TagSet};
use crate::traits::{FundReceipt, NetworkError, NetworkResult, UploadReceipt};

pub(crate) const TAGS_HEADER: &str = "x-tags";

#[derive(Deserialize)]
struct BalanceResponse {
    balance: Amount,
}

#[derive(Serialize)]
struct FundRequest<'a> {
    address: &'a str,
    amount: Amount,
}

#[derive(Deserialize)]
struct FundResponse {
    tx_id: String,
    confirmed: bool,
}

#[derive(Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Clone)]
pub(crate) struct NodeClient {
    client: Client,
    kind: NetworkKind,
    node_url: String,
    currency: String,
    address: String,
    auth_token: String,
}

impl NodeClient {
    pub(crate) fn new(
        settings: &NetworkSettings,
        address: &str,
        auth_token: &str,
        timeout: Duration,
    ) -> NetworkResult<Self> {
        if settings.node_url.trim().is_empty() {
            return Err(NetworkError::Config(format!(
                "{} node URL is empty",
                settings.kind
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            kind: settings.kind,
            node_url: settings.node_url.trim_end_matches('/').to_string(),
            currency: settings.currency.clone(),
            address: address.to_string(),
            auth_token: auth_token.to_string(),
        })
    }

    pub(crate) fn address(&self) -> &str {
        &self.address
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.node_url, path)
    }

    async fn check(response: Response) -> NetworkResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(NetworkError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Readiness probe; the factory refuses to hand out a handle until it succeeds.
    pub(crate) async fn ping(&self) -> NetworkResult<()> {
        let response = self.client.get(self.url("/info")).send().await?;
        Self::check(response).await?;
        tracing::debug!(network = %self.kind, node = %self.node_url, "Storage node is ready");
        Ok(())
    }

    pub(crate) async fn price(&self, size_bytes: u64) -> NetworkResult<Amount> {
        let url = self.url(&format!("/price/{}/{}", self.currency, size_bytes));
        let response = Self::check(self.client.get(&url).send().await?).await?;
        let body = response.text().await?;
        body.parse()
            .map_err(|e| NetworkError::Decode(format!("price: {}", e)))
    }

    pub(crate) async fn balance(&self) -> NetworkResult<Amount> {
        let url = self.url(&format!("/account/balance/{}", self.currency));
        let response = self
            .client
            .get(&url)
            .query(&[("address", self.address.as_str())])
            .send()
            .await?;
        let body: BalanceResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| NetworkError::Decode(format!("balance: {}", e)))?;
        Ok(body.balance)
    }

    pub(crate) async fn fund(&self, amount: Amount) -> NetworkResult<FundReceipt> {
        let url = self.url(&format!("/account/fund/{}", self.currency));
        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_token))
            .json(&FundRequest {
                address: &self.address,
                amount,
            })
            .send()
            .await?;
        let body: FundResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| NetworkError::Decode(format!("fund: {}", e)))?;

        if !body.confirmed {
            return Err(NetworkError::Unconfirmed { tx_id: body.tx_id });
        }

        tracing::info!(
            network = %self.kind,
            tx_id = %body.tx_id,
            amount = %amount,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Funding transaction confirmed"
        );

        Ok(FundReceipt {
            tx_id: body.tx_id,
            amount,
        })
    }

    pub(crate) async fn upload(
        &self,
        body: Body,
        content_length: u64,
        tags: &TagSet,
    ) -> NetworkResult<UploadReceipt> {
        let url = self.url(&format!("/tx/{}", self.currency));
        let content_type = tags
            .get(tags::CONTENT_TYPE)
            .unwrap_or(moments_core::constants::DEFAULT_CONTENT_TYPE);
        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_token))
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, content_length)
            .header(TAGS_HEADER, tags.to_header_value())
            .body(body)
            .send()
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    network = %self.kind,
                    size_bytes = content_length,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Storage network upload failed"
                );
            })?;

        let receipt: UploadResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| NetworkError::Decode(format!("upload: {}", e)))?;

        tracing::info!(
            network = %self.kind,
            id = %receipt.id,
            size_bytes = content_length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Storage network upload successful"
        );

        Ok(UploadReceipt { id: receipt.id })
    }
}
