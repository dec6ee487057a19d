//! tx-relay command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI (main.rs)
//!     │ broadcast / balance / sign / check-config
//!     ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │ RelayClient (client::facade)                                 │
//!   │   broadcast ──▶ SubmissionEngine (engine::queue)             │
//!   │                   request queue ─▶ dispatcher ─▶ job tasks   │
//!   │                                                   │          │
//!   │                                      Network::broadcast      │
//!   │                                      (blockchain::rpc)       │
//!   │                                                   ▼          │
//!   │   worker thread ◀── poll_next_blocking ◀── receipt queue     │
//!   │        │                                                     │
//!   │        ▼                                                     │
//!   │   callback(receipt)                                          │
//!   └──────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use alloy::primitives::utils::format_ether;
use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde_json::json;
use uuid::Uuid;

use tx_relay::blockchain::Wallet;
use tx_relay::config::{load_config, validation::validate_config};
use tx_relay::observability::{logging, metrics};
use tx_relay::{JobId, RelayClient, RelayConfig};

#[derive(Parser)]
#[command(name = "tx-relay")]
#[command(about = "Broadcast signed transactions asynchronously and report receipts", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Broadcast signed raw transactions and print each receipt as JSON
    Broadcast {
        /// Hex-encoded signed transaction (repeatable)
        #[arg(long = "raw-tx", required = true)]
        raw_tx: Vec<String>,
        /// RPC endpoint (defaults to network.default_endpoint)
        #[arg(long)]
        endpoint: Option<String>,
        /// Seconds to wait for all receipts
        #[arg(long, default_value_t = 120)]
        wait_secs: u64,
    },
    /// Query the native balance of an address
    Balance {
        #[arg(long)]
        address: String,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Sign a message with the key from TX_RELAY_PRIVATE_KEY
    Sign {
        #[arg(long)]
        message: String,
    },
    /// Validate the configuration and print the effective values
    CheckConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    if let Err(e) = logging::init_logging(&config.observability) {
        eprintln!("Logging already initialized: {}", e);
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Broadcast {
            raw_tx,
            endpoint,
            wait_secs,
        } => broadcast(config, raw_tx, endpoint, Duration::from_secs(wait_secs)),
        Commands::Balance { address, endpoint } => balance(config, &address, endpoint),
        Commands::Sign { message } => sign(&config, &message),
        Commands::CheckConfig => check_config(&config),
    }
}

fn broadcast(
    config: RelayConfig,
    raw_txs: Vec<String>,
    endpoint: Option<String>,
    wait: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = RelayClient::new(config)?;
    let endpoint = endpoint.unwrap_or_else(|| client.default_endpoint().to_string());

    let (tx, rx) = mpsc::channel();
    client.set_callback(move |receipt| {
        let _ = tx.send(receipt.clone());
    })?;
    client.start()?;

    let mut expected = 0usize;
    for raw in &raw_txs {
        let bytes = alloy::hex::decode(raw.trim())?;
        let job_id = JobId::new(Uuid::new_v4().to_string());

        match client.broadcast(bytes, &endpoint, job_id.clone()) {
            Ok(()) => {
                expected += 1;
                tracing::info!(job_id = %job_id, endpoint = %endpoint, "Submitted");
            }
            Err(e) => eprintln!("{}", e),
        }
    }

    let deadline = Instant::now() + wait;
    let mut received = 0usize;
    while received < expected {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(receipt) => {
                println!("{}", serde_json::to_string(&receipt)?);
                received += 1;
            }
            Err(_) => {
                tracing::warn!(missing = expected - received, "Timed out waiting for receipts");
                break;
            }
        }
    }

    let stats = client.stats()?;
    client.destroy();
    tracing::info!(
        submitted = stats.submitted,
        rejected = stats.rejected,
        completed = stats.completed,
        "Broadcast finished"
    );
    Ok(())
}

fn balance(
    config: RelayConfig,
    address: &str,
    endpoint: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let address: Address = address.parse()?;
    let client = RelayClient::new(config)?;
    let endpoint = endpoint.unwrap_or_else(|| client.default_endpoint().to_string());

    let wei = client.balance(address, &endpoint)?;
    let output = json!({
        "address": address.to_string(),
        "wei": wei.to_string(),
        "ether": format_ether(wei),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn sign(config: &RelayConfig, message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = Wallet::from_env(config.network.chain_id)?;
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let signature = runtime.block_on(wallet.sign_payload(message.as_bytes()))?;

    let output = json!({
        "address": wallet.address().to_string(),
        "signature": alloy::hex::encode_prefixed(signature),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn check_config(config: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(errors) = validate_config(config) {
        for error in &errors {
            eprintln!("{}", error);
        }
        return Err(format!("{} configuration error(s)", errors.len()).into());
    }

    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
