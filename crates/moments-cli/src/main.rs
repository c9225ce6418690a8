//! Moments CLI: upload files to, and manage the account on, the configured
//! storage networks.
//!
//! Configuration comes from the environment (or a `.env` file); at minimum
//! WALLET_ADDRESS and NODE_AUTH_TOKEN must be set.

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use moments_cli::{init_tracing, select_network, upload_filename, BalanceView};
use moments_core::{Amount, Config, NetworkKind};
use moments_services::{check_balance, HybridUploader};
use moments_storage::create_networks;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "moments", about = "Permanent storage uploader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file, falling back to the secondary network when allowed
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// Filename recorded on the stored object (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Show price and balance for a payload size
    Balance {
        /// Payload size in bytes
        #[arg(long, default_value = "1")]
        size: u64,
        /// bundlr or irys (defaults to the primary network)
        #[arg(long)]
        network: Option<NetworkKind>,
    },
    /// Top up the account by an amount in atomic units
    Fund {
        amount: Amount,
        /// bundlr or irys (defaults to the primary network)
        #[arg(long)]
        network: Option<NetworkKind>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let networks = create_networks(&config)
        .await
        .context("Failed to connect to the primary storage network")?;

    match cli.command {
        Commands::Upload { file, name } => {
            let filename = upload_filename(&file, name.as_deref());
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let uploader = HybridUploader::from_config(&config, networks)
                .await
                .map_err(|e| anyhow::anyhow!(e.detailed_message()))?;
            let result = uploader
                .upload(Bytes::from(data), &filename)
                .await
                .map_err(|e| anyhow::anyhow!(e.detailed_message()))?;
            print_json(&result)?;
        }
        Commands::Balance { size, network } => {
            let network = select_network(&networks, network)?;
            let report = check_balance(network.as_ref(), size)
                .await
                .map_err(|e| anyhow::anyhow!(e.detailed_message()))?;
            print_json(&BalanceView::from(&report))?;
        }
        Commands::Fund { amount, network } => {
            let network = select_network(&networks, network)?;
            let before = network
                .get_balance()
                .await
                .context("Failed to query balance")?;
            let receipt = network.fund(amount).await.context("Funding failed")?;
            let after = network
                .get_balance()
                .await
                .context("Failed to query balance")?;

            print_json(&serde_json::json!({
                "network": network.kind(),
                "address": network.address(),
                "tx_id": receipt.tx_id,
                "amount": receipt.amount,
                "amount_eth": receipt.amount.format_ether(),
                "balance_before": before,
                "balance_before_eth": before.format_ether(),
                "balance_after": after,
                "balance_after_eth": after.format_ether(),
            }))?;
        }
    }

    Ok(())
}
