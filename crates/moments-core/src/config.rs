//! Configuration module
//!
//! Upload pipeline configuration read from the environment (and `.env` via
//! dotenvy): which storage networks to use, where to stage large payloads, the
//! size thresholds that drive path selection, and funding behaviour.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::PathBuf;

use crate::constants::{
    FALLBACK_CEILING_BYTES, MAX_UPLOAD_BYTES, MIB, NETWORK_TIMEOUT_SECS, STREAMING_THRESHOLD_BYTES,
};
use crate::network_kind::NetworkKind;

const DEFAULT_CURRENCY: &str = "ethereum";
const BUNDLR_NODE_URL: &str = "https://node1.bundlr.network";
const BUNDLR_GATEWAY_URL: &str = "https://arweave.net";
const IRYS_NODE_URL: &str = "https://devnet.irys.xyz";
const IRYS_GATEWAY_URL: &str = "https://gateway.irys.xyz";

/// Connection settings for one storage network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkSettings {
    pub kind: NetworkKind,
    pub node_url: String,
    pub gateway_url: String,
    pub currency: String,
}

impl NetworkSettings {
    fn from_vars<F>(kind: NetworkKind, currency: &str, var: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let (node_key, node_default, gateway_key, gateway_default) = match kind {
            NetworkKind::Bundlr => (
                "BUNDLR_NODE_URL",
                BUNDLR_NODE_URL,
                "BUNDLR_GATEWAY_URL",
                BUNDLR_GATEWAY_URL,
            ),
            NetworkKind::Irys => (
                "IRYS_NODE_URL",
                IRYS_NODE_URL,
                "IRYS_GATEWAY_URL",
                IRYS_GATEWAY_URL,
            ),
        };

        NetworkSettings {
            kind,
            node_url: var(node_key).unwrap_or_else(|| node_default.to_string()),
            gateway_url: var(gateway_key).unwrap_or_else(|| gateway_default.to_string()),
            currency: currency.to_string(),
        }
    }
}

/// Upload pipeline configuration
#[derive(Clone)]
pub struct Config {
    pub primary: NetworkSettings,
    /// `None` disables the small-file fallback.
    pub secondary: Option<NetworkSettings>,
    pub wallet_address: String,
    /// Bearer token for the storage node API. Never a wallet key.
    pub node_auth_token: String,
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub streaming_threshold_bytes: u64,
    pub fallback_ceiling_bytes: u64,
    /// Extra top-up on top of the exact deficit, as a percentage of the price.
    pub funding_margin_percent: u32,
    /// Serialize the balance check and top-up per network.
    pub serialize_funding: bool,
    /// Attach an advisory `Original-MD5` tag on the direct path.
    pub tag_content_hash: bool,
    pub network_timeout_secs: u64,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field("primary", &self.primary)
            .field("secondary", &self.secondary)
            .field("wallet_address", &self.wallet_address)
            .field("node_auth_token", &"<redacted>")
            .field("scratch_dir", &self.scratch_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("streaming_threshold_bytes", &self.streaming_threshold_bytes)
            .field("fallback_ceiling_bytes", &self.fallback_ceiling_bytes)
            .field("funding_margin_percent", &self.funding_margin_percent)
            .field("serialize_funding", &self.serialize_funding)
            .field("tag_content_hash", &self.tag_content_hash)
            .field("network_timeout_secs", &self.network_timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let currency = var("CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let primary_kind = match var("PRIMARY_NETWORK") {
            Some(raw) => raw.parse()?,
            None => NetworkKind::Bundlr,
        };
        let secondary_kind = match var("SECONDARY_NETWORK") {
            Some(raw) if raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(raw.parse::<NetworkKind>()?),
            None => Some(NetworkKind::Irys),
        };

        let megabytes = |key: &str, default: u64| -> Result<u64, anyhow::Error> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| anyhow::anyhow!("{} must be a whole number of megabytes", key))?
                    .checked_mul(MIB)
                    .ok_or_else(|| anyhow::anyhow!("{} is too large", key)),
                None => Ok(default),
            }
        };

        let flag = |key: &str, default: bool| -> Result<bool, anyhow::Error> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .to_lowercase()
                    .parse::<bool>()
                    .map_err(|_| anyhow::anyhow!("{} must be true or false", key)),
                None => Ok(default),
            }
        };

        let scratch_dir = var("UPLOAD_SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| env::temp_dir().join("moments-uploads"));

        let config = Config {
            primary: NetworkSettings::from_vars(primary_kind, &currency, &var),
            secondary: secondary_kind.map(|kind| NetworkSettings::from_vars(kind, &currency, &var)),
            wallet_address: var("WALLET_ADDRESS")
                .ok_or_else(|| anyhow::anyhow!("WALLET_ADDRESS must be set"))?,
            node_auth_token: var("NODE_AUTH_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("NODE_AUTH_TOKEN must be set for storage node auth"))?,
            scratch_dir,
            max_upload_bytes: megabytes("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_BYTES)?,
            streaming_threshold_bytes: megabytes(
                "STREAMING_THRESHOLD_MB",
                STREAMING_THRESHOLD_BYTES,
            )?,
            fallback_ceiling_bytes: megabytes("FALLBACK_CEILING_MB", FALLBACK_CEILING_BYTES)?,
            funding_margin_percent: var("FUNDING_MARGIN_PERCENT")
                .map(|raw| raw.trim().parse::<u32>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("FUNDING_MARGIN_PERCENT must be a whole number"))?
                .unwrap_or(0),
            serialize_funding: flag("SERIALIZE_FUNDING", false)?,
            tag_content_hash: flag("TAG_CONTENT_HASH", true)?,
            network_timeout_secs: var("NETWORK_TIMEOUT_SECS")
                .map(|raw| raw.trim().parse::<u64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("NETWORK_TIMEOUT_SECS must be a whole number of seconds"))?
                .unwrap_or(NETWORK_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.node_auth_token.trim().is_empty() {
            return Err(anyhow::anyhow!("NODE_AUTH_TOKEN must not be empty"));
        }

        if self.streaming_threshold_bytes > self.max_upload_bytes {
            return Err(anyhow::anyhow!(
                "STREAMING_THRESHOLD_MB must not exceed MAX_UPLOAD_SIZE_MB"
            ));
        }

        if self.fallback_ceiling_bytes > self.streaming_threshold_bytes {
            return Err(anyhow::anyhow!(
                "FALLBACK_CEILING_MB must not exceed STREAMING_THRESHOLD_MB: the secondary network only accepts buffered uploads"
            ));
        }

        if let Some(ref secondary) = self.secondary {
            if secondary.kind == self.primary.kind {
                return Err(anyhow::anyhow!(
                    "SECONDARY_NETWORK must differ from PRIMARY_NETWORK ({})",
                    self.primary.kind
                ));
            }
        }

        Ok(())
    }
}
