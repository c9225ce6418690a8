#[cfg(feature = "network-bundlr")]
use crate::BundlrNetwork;
#[cfg(feature = "network-irys")]
use crate::IrysNetwork;
use crate::{NetworkKind, NetworkResult, StorageNetwork};
use moments_core::{Config, NetworkSettings};
use std::sync::Arc;
use std::time::Duration;

/// Account credentials shared by every network handle
#[derive(Clone)]
pub struct Credentials {
    pub address: String,
    pub auth_token: String,
}

impl Credentials {
    pub fn from_config(config: &Config) -> Self {
        Credentials {
            address: config.wallet_address.clone(),
            auth_token: config.node_auth_token.clone(),
        }
    }
}

/// Ready-to-use primary and (optional) secondary network handles
#[derive(Clone)]
pub struct Networks {
    pub primary: Arc<dyn StorageNetwork>,
    pub secondary: Option<Arc<dyn StorageNetwork>>,
}

/// Connect to one storage network
///
/// Resolves only once the node has answered its readiness probe, so callers
/// never observe a half-initialised handle.
pub async fn create_network(
    settings: &NetworkSettings,
    credentials: &Credentials,
    timeout: Duration,
) -> NetworkResult<Arc<dyn StorageNetwork>> {
    match settings.kind {
        #[cfg(feature = "network-bundlr")]
        NetworkKind::Bundlr => {
            let network = BundlrNetwork::connect(
                settings,
                &credentials.address,
                &credentials.auth_token,
                timeout,
            )
            .await?;
            Ok(Arc::new(network))
        }

        #[cfg(not(feature = "network-bundlr"))]
        NetworkKind::Bundlr => Err(crate::NetworkError::Config(
            "Bundlr adapter not available (network-bundlr feature not enabled)".to_string(),
        )),

        #[cfg(feature = "network-irys")]
        NetworkKind::Irys => {
            let network = IrysNetwork::connect(
                settings,
                &credentials.address,
                &credentials.auth_token,
                timeout,
            )
            .await?;
            Ok(Arc::new(network))
        }

        #[cfg(not(feature = "network-irys"))]
        NetworkKind::Irys => Err(crate::NetworkError::Config(
            "Irys adapter not available (network-irys feature not enabled)".to_string(),
        )),
    }
}

/// Connect to the configured primary and secondary networks
///
/// The primary must be reachable. An unreachable secondary is logged and
/// left out, which disables the fallback rather than the whole uploader.
pub async fn create_networks(config: &Config) -> NetworkResult<Networks> {
    let credentials = Credentials::from_config(config);
    let timeout = Duration::from_secs(config.network_timeout_secs);

    let primary = create_network(&config.primary, &credentials, timeout).await?;

    let secondary = match config.secondary {
        Some(ref settings) => match create_network(settings, &credentials, timeout).await {
            Ok(network) => Some(network),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    network = %settings.kind,
                    "Secondary storage network unavailable, fallback disabled"
                );
                None
            }
        },
        None => None,
    };

    tracing::info!(
        primary = %primary.kind(),
        secondary = ?secondary.as_ref().map(|n| n.kind()),
        "Storage networks ready"
    );

    Ok(Networks { primary, secondary })
}
