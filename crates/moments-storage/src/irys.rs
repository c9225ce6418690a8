//! Irys network adapter (buffered uploads only)

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use moments_core::{Amount, NetworkKind, NetworkSettings};
use reqwest::Body;

use crate::node::NodeClient;
use crate::tags::TagSet;
use crate::traits::{FundReceipt, NetworkError, NetworkResult, StorageNetwork, UploadReceipt};

/// Irys storage network handle
#[derive(Clone)]
pub struct IrysNetwork {
    node: NodeClient,
    gateway_url: String,
}

impl IrysNetwork {
    /// Connect to an Irys node and wait until it answers the readiness probe
    pub async fn connect(
        settings: &NetworkSettings,
        address: &str,
        auth_token: &str,
        timeout: Duration,
    ) -> NetworkResult<Self> {
        if settings.kind != NetworkKind::Irys {
            return Err(NetworkError::Config(format!(
                "Irys adapter cannot serve {} settings",
                settings.kind
            )));
        }

        let node = NodeClient::new(settings, address, auth_token, timeout)?;
        node.ping().await?;

        Ok(IrysNetwork {
            node,
            gateway_url: settings.gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StorageNetwork for IrysNetwork {
    fn kind(&self) -> NetworkKind {
        NetworkKind::Irys
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

    fn gateway_url(&self, id: &str) -> String {
        format!("{}/{}", self.gateway_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ByteReader;

    #[tokio::test]
    async fn test_stream_upload_is_unsupported() {
        let mut server = mockito::Server::new_async().await;
        let _info = server.mock("GET", "/info").create_async().await;

        let settings = NetworkSettings {
            kind: NetworkKind::Irys,
            node_url: server.url(),
            gateway_url: "https://gateway.irys.xyz".to_string(),
            currency: "ethereum".to_string(),
        };
        let network = IrysNetwork::connect(&settings, "0xabc", "k", Duration::from_secs(5))
            .await
            .unwrap();

        assert!(!network.supports_streaming());
        let reader: ByteReader = Box::pin(std::io::Cursor::new(vec![1u8, 2, 3]));
        let result = network
            .upload_stream(reader, 3, &TagSet::direct("a", "b", None))
            .await;
        assert!(matches!(result, Err(NetworkError::Unsupported(_))));
        assert_eq!(network.gateway_url("xyz"), "https://gateway.irys.xyz/xyz");
    }
}
