//! Hybrid upload strategy
//!
//! Small payloads go straight from memory to the primary network. Payloads
//! above the streaming threshold are staged to disk and streamed, so at most
//! one in-memory copy exists. If the primary attempt fails and the payload is
//! under the fallback ceiling, one direct attempt is made on the secondary
//! network; when that fails too, the primary error is what the caller sees.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::Utc;
use md5::{Digest, Md5};
use moments_core::{classify, Config};
use moments_storage::{Networks, StorageNetwork, TagSet, UploadReceipt};
use tokio::sync::OnceCell;

use crate::error::UploadError;
use crate::funding::{FundingPolicy, FundingPreflight};
use crate::limits::UploadLimits;
use crate::staging::{StagingArea, StagingFile};
use crate::types::{UploadPath, UploadResult};

/// Tunables for [`HybridUploader`]
#[derive(Debug, Clone, Copy)]
pub struct UploadOptions {
    pub limits: UploadLimits,
    pub funding: FundingPolicy,
    /// Attach an advisory `Original-MD5` tag on direct uploads
    pub tag_content_hash: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            limits: UploadLimits::default(),
            funding: FundingPolicy::default(),
            tag_content_hash: true,
        }
    }
}

impl UploadOptions {
    pub fn from_config(config: &Config) -> Self {
        UploadOptions {
            limits: UploadLimits::from_config(config),
            funding: FundingPolicy {
                margin_percent: config.funding_margin_percent,
                serialize: config.serialize_funding,
            },
            tag_content_hash: config.tag_content_hash,
        }
    }
}

/// A network handle paired with its own funding preflight
struct Backend {
    network: Arc<dyn StorageNetwork>,
    funding: FundingPreflight,
}

impl Backend {
    fn new(network: Arc<dyn StorageNetwork>, policy: FundingPolicy) -> Self {
        Backend {
            network,
            funding: FundingPreflight::new(policy),
        }
    }
}

/// Upload strategy selector
///
/// Holds no per-request state; one instance serves any number of concurrent
/// uploads.
pub struct HybridUploader {
    primary: Backend,
    secondary: Option<Backend>,
    staging: StagingArea,
    options: UploadOptions,
}

impl HybridUploader {
    pub fn new(networks: Networks, staging: StagingArea, options: UploadOptions) -> Self {
        if !networks.primary.supports_streaming() {
            tracing::warn!(
                network = %networks.primary.kind(),
                "Primary network cannot stream; payloads above the streaming threshold will fail"
            );
        }

        HybridUploader {
            primary: Backend::new(networks.primary, options.funding),
            secondary: networks
                .secondary
                .map(|network| Backend::new(network, options.funding)),
            staging,
            options,
        }
    }

    /// Build an uploader from configuration and already-connected networks
    pub async fn from_config(config: &Config, networks: Networks) -> Result<Self, UploadError> {
        let staging = StagingArea::new(config.scratch_dir.clone()).await?;
        Ok(Self::new(networks, staging, UploadOptions::from_config(config)))
    }

    /// Store `payload` under `filename`, trying the secondary network once if allowed
    pub async fn upload(&self, payload: Bytes, filename: &str) -> Result<UploadResult, UploadError> {
        let size = payload.len() as u64;
        self.options.limits.check_size(size)?;

        let path = self.options.limits.select_path(size);
        let start = Instant::now();
        // Computed at most once per request, shared by the primary and fallback attempts.
        let digest = OnceCell::new();

        tracing::info!(
            filename = %filename,
            size_bytes = size,
            path = ?path,
            primary = %self.primary.network.kind(),
            "Starting upload"
        );

        let attempt = match path {
            UploadPath::Direct => {
                self.upload_direct(&self.primary, &payload, filename, &digest)
                    .await
            }
            UploadPath::Streaming => self.upload_streaming(&payload, filename).await,
        };

        let primary_error = match attempt {
            Ok(receipt) => {
                let result = finish(&self.primary, receipt, path, false);
                tracing::info!(
                    id = %result.transaction_id,
                    url = %result.url,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Upload complete"
                );
                return Ok(result);
            }
            Err(e) => e,
        };

        tracing::error!(
            error = %primary_error,
            network = %self.primary.network.kind(),
            size_bytes = size,
            "Primary upload failed"
        );

        let Some(secondary) = self.secondary.as_ref() else {
            return Err(primary_error);
        };
        if !self.options.limits.fallback_eligible(size) {
            tracing::debug!(
                size_bytes = size,
                ceiling_bytes = self.options.limits.fallback_ceiling_bytes,
                "Payload too large for fallback"
            );
            return Err(primary_error);
        }

        tracing::warn!(
            network = %secondary.network.kind(),
            size_bytes = size,
            "Falling back to secondary network"
        );

        match self
            .upload_direct(secondary, &payload, filename, &digest)
            .await
        {
            Ok(receipt) => {
                let result = finish(secondary, receipt, UploadPath::Direct, true);
                tracing::info!(
                    id = %result.transaction_id,
                    url = %result.url,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Fallback upload complete"
                );
                Ok(result)
            }
            Err(fallback_error) => {
                tracing::error!(
                    error = %fallback_error,
                    network = %secondary.network.kind(),
                    "Fallback upload also failed"
                );
                Err(primary_error)
            }
        }
    }

    /// Funding preflight, then an in-memory upload
    async fn upload_direct(
        &self,
        backend: &Backend,
        payload: &Bytes,
        filename: &str,
        digest: &OnceCell<Option<String>>,
    ) -> Result<UploadReceipt, UploadError> {
        let network = backend.network.as_ref();
        backend
            .funding
            .ensure_funded(network, payload.len() as u64)
            .await?;

        let content_type = classify(filename);
        let md5 = digest
            .get_or_init(|| self.content_md5(payload))
            .await
            .clone();
        let tags = TagSet::direct(content_type, filename, md5);

        network
            .upload_buffer(payload.clone(), &tags)
            .await
            .map_err(|source| UploadError::Upload {
                network: network.kind(),
                source,
            })
    }

    /// Stage to disk, then funding preflight and a streamed upload; the staging
    /// file is removed whatever the outcome
    async fn upload_streaming(
        &self,
        payload: &Bytes,
        filename: &str,
    ) -> Result<UploadReceipt, UploadError> {
        let network = self.primary.network.as_ref();
        if !network.supports_streaming() {
            return Err(UploadError::Upload {
                network: network.kind(),
                source: moments_storage::NetworkError::Unsupported(format!(
                    "{} does not accept streamed uploads",
                    network.kind()
                )),
            });
        }

        let staged = self.staging.stage(payload, filename).await?;
        let outcome = self.stream_staged(&staged, filename).await;

        let staged_path = staged.path().to_path_buf();
        if let Err(e) = staged.remove().await {
            tracing::warn!(
                error = %e,
                path = %staged_path.display(),
                upload_ok = outcome.is_ok(),
                "Failed to remove staging file"
            );
        }

        outcome
    }

    async fn stream_staged(
        &self,
        staged: &StagingFile,
        filename: &str,
    ) -> Result<UploadReceipt, UploadError> {
        let network = self.primary.network.as_ref();
        let size = staged.size();

        self.primary.funding.ensure_funded(network, size).await?;

        let content_type = classify(filename);
        let tags = TagSet::streaming(content_type, filename, size, Utc::now());
        let file = staged.open().await?;

        network
            .upload_stream(Box::pin(file), size, &tags)
            .await
            .map_err(|source| UploadError::Upload {
                network: network.kind(),
                source,
            })
    }

    /// Advisory hash for the `Original-MD5` tag; skipped if disabled or if hashing fails
    async fn content_md5(&self, payload: &Bytes) -> Option<String> {
        if !self.options.tag_content_hash {
            return None;
        }
        let data = payload.clone();
        match tokio::task::spawn_blocking(move || hex::encode(Md5::digest(&data))).await {
            Ok(hash) => Some(hash),
            Err(e) => {
                tracing::warn!(error = %e, "Content hash failed, uploading without MD5 tag");
                None
            }
        }
    }
}

fn finish(
    backend: &Backend,
    receipt: UploadReceipt,
    path: UploadPath,
    used_fallback: bool,
) -> UploadResult {
    let network = backend.network.as_ref();
    UploadResult {
        url: network.gateway_url(&receipt.id),
        uri: network.protocol_uri(&receipt.id),
        network: network.kind(),
        transaction_id: receipt.id,
        path,
        used_fallback,
    }
}
