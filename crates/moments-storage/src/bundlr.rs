//! Bundlr network adapter (accepts streamed uploads)

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use moments_core::{Amount, NetworkKind, NetworkSettings};
use reqwest::Body;
use tokio_util::io::ReaderStream;

use crate::node::NodeClient;
use crate::tags::TagSet;
use crate::traits::{
    ByteReader, FundReceipt, NetworkError, NetworkResult, StorageNetwork, UploadReceipt,
};

/// Bundlr storage network handle
#[derive(Clone)]
pub struct BundlrNetwork {
    node: NodeClient,
    gateway_url: String,
}

impl BundlrNetwork {
    /// Connect to a Bundlr node and wait until it answers the readiness probe
    ///
    /// # Arguments
    /// * `settings` - Node and gateway URLs plus the funding currency
    /// * `address` - Account address that pays for uploads
    /// * `auth_token` - Bearer token sent with fund and upload requests
    /// * `timeout` - Per-request timeout (uploads of several gigabytes need minutes)
    pub async fn connect(
        settings: &NetworkSettings,
        address: &str,
        auth_token: &str,
        timeout: Duration,
    ) -> NetworkResult<Self> {
        if settings.kind != NetworkKind::Bundlr {
            return Err(NetworkError::Config(format!(
                "Bundlr adapter cannot serve {} settings",
                settings.kind
            )));
        }

        let node = NodeClient::new(settings, address, auth_token, timeout)?;
        node.ping().await?;

        Ok(BundlrNetwork {
            node,
            gateway_url: settings.gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageNetwork for BundlrNetwork {
    fn kind(&self) -> NetworkKind {
        NetworkKind::Bundlr
    }

    fn address(&self) -> &str {
        self.node.address()
    }

    async fn get_price(&self, size_bytes: u64) -> NetworkResult<Amount> {
        self.node.price(size_bytes).await
    }

    async fn get_balance(&self) -> NetworkResult<Amount> {
        self.node.balance().await
    }

    async fn fund(&self, amount: Amount) -> NetworkResult<FundReceipt> {
        self.node.fund(amount).await
    }

    async fn upload_buffer(&self, data: Bytes, tags: &TagSet) -> NetworkResult<UploadReceipt> {
        let size = data.len() as u64;
        self.node.upload(Body::from(data), size, tags).await
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn upload_stream(
        &self,
        reader: ByteReader,
        content_length: u64,
        tags: &TagSet,
    ) -> NetworkResult<UploadReceipt> {
        let body = Body::wrap_stream(ReaderStream::new(reader));
        self.node.upload(body, content_length, tags).await
    }

    fn gateway_url(&self, id: &str) -> String {
        format!("{}/{}", self.gateway_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(url: String) -> NetworkSettings {
        NetworkSettings {
            kind: NetworkKind::Bundlr,
            node_url: url,
            gateway_url: "https://arweave.net/".to_string(),
            currency: "ethereum".to_string(),
        }
    }

    #[tokio::test]
    async fn test_connect_requires_ready_node() {
        let mut server = mockito::Server::new_async().await;
        let _info = server
            .mock("GET", "/info")
            .with_status(502)
            .create_async()
            .await;

        let result =
            BundlrNetwork::connect(&settings(server.url()), "0xabc", "k", Duration::from_secs(5))
                .await;
        assert!(matches!(result, Err(NetworkError::Status { status: 502, .. })));
    }

    #[tokio::test]
    async fn test_stream_upload_sends_reader_contents() {
        let mut server = mockito::Server::new_async().await;
        let _info = server.mock("GET", "/info").create_async().await;
        let upload = server
            .mock("POST", "/tx/ethereum")
            .match_body("streamed payload")
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"stream-1"}"#)
            .create_async()
            .await;

        let network =
            BundlrNetwork::connect(&settings(server.url()), "0xabc", "k", Duration::from_secs(5))
                .await
                .unwrap();
        assert!(network.supports_streaming());

        let data = b"streamed payload".to_vec();
        let len = data.len() as u64;
        let reader: ByteReader = Box::pin(std::io::Cursor::new(data));
        let tags = TagSet::direct("text/plain", "s.txt", None);

        let receipt = network.upload_stream(reader, len, &tags).await.unwrap();
        assert_eq!(receipt.id, "stream-1");
        assert_eq!(network.gateway_url("stream-1"), "https://arweave.net/stream-1");
        assert_eq!(network.protocol_uri("stream-1"), "ar://stream-1");
        upload.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejects_foreign_settings() {
        let mut wrong = settings("http://127.0.0.1:1".to_string());
        wrong.kind = NetworkKind::Irys;
        let result = BundlrNetwork::connect(&wrong, "0xabc", "k", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(NetworkError::Config(_))));
    }
}
