use anyhow::anyhow;
use moments_core::NetworkKind;
use moments_services::BalanceReport;
use moments_storage::{Networks, StorageNetwork};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Pick the connected network matching `kind`, or the primary when `kind` is `None`.
pub fn select_network(
    networks: &Networks,
    kind: Option<NetworkKind>,
) -> anyhow::Result<Arc<dyn StorageNetwork>> {
    let Some(kind) = kind else {
        return Ok(networks.primary.clone());
    };

    if networks.primary.kind() == kind {
        return Ok(networks.primary.clone());
    }
    match networks.secondary {
        Some(ref secondary) if secondary.kind() == kind => Ok(secondary.clone()),
        _ => Err(anyhow!("{} is not configured or not reachable", kind)),
    }
}

/// Name recorded in the `Filename` tag: the explicit override, else the path's basename.
pub fn upload_filename(path: &Path, name: Option<&str>) -> String {
    match name {
        Some(name) if !name.trim().is_empty() => name.to_string(),
        _ => path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string()),
    }
}

/// Balance report with human-readable ether amounts alongside atomic units
#[derive(Debug, Serialize)]
pub struct BalanceView<'a> {
    #[serde(flatten)]
    pub report: &'a BalanceReport,
    pub price_eth: String,
    pub balance_eth: String,
}

impl<'a> From<&'a BalanceReport> for BalanceView<'a> {
    fn from(report: &'a BalanceReport) -> Self {
        BalanceView {
            report,
            price_eth: report.price.format_ether(),
            balance_eth: report.balance.format_ether(),
        }
    }
}
