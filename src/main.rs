//! Bridge Orchestrator CLI
//!
//! Offline tooling around the orchestrator core:
//! - `validate`: checks a request against the configured bridge adapter
//! - `simulate`: runs a full transfer against a ledger snapshot
//! - `selector`: prints the 4-byte selector of a function signature
//!
//! ## Usage
//!
//! ```bash
//! bridge-orchestrator --config config/orchestrator.toml validate --request request.json
//! bridge-orchestrator simulate --request request.json --state ledger.json \
//!     --caller 0x00000000000000000000000000000000000000aa --swaps swaps.json --write
//! bridge-orchestrator selector --signature "swapExactInput(uint256)"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bridge_orchestrator::{
    config::Config, function_selector, BridgeDataValidator, BridgeTransactionRequest, EntryPoint,
    InMemoryAllowlist, Ledger, SimulatedVenue, SwapExecutor, SwapStep, TracingSink, TransferOrchestrator,
    TransferService,
};
use clap::{Parser, Subcommand};
use ethereum_types::Address;
use serde::de::DeserializeOwned;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bridge-orchestrator")]
#[command(about = "Validate, swap and dispatch bridge transfers against a local ledger")]
struct Args {
    /// Path to configuration file (default: config/orchestrator.toml or ORCHESTRATOR_CONFIG_PATH env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a request for the entry point implied by --swaps
    Validate {
        /// JSON file holding a BridgeTransactionRequest
        #[arg(long)]
        request: PathBuf,
        /// JSON file holding the swap steps (selects the swap entry point)
        #[arg(long)]
        swaps: Option<PathBuf>,
    },
    /// Execute a transfer against a ledger snapshot
    Simulate {
        #[arg(long)]
        request: PathBuf,
        /// JSON file holding the ledger snapshot
        #[arg(long)]
        state: PathBuf,
        /// Address the transfer is executed on behalf of
        #[arg(long, value_parser = parse_address)]
        caller: Address,
        #[arg(long)]
        swaps: Option<PathBuf>,
        /// Save the committed ledger back to --state
        #[arg(long)]
        write: bool,
    },
    /// Print the 4-byte selector of a function signature
    Selector {
        #[arg(long)]
        signature: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    match args.command {
        Command::Selector { signature } => {
            println!("0x{}", hex::encode(function_selector(&signature)));
            Ok(())
        }
        Command::Validate { request, swaps } => {
            let config = load_config(args.config.as_deref())?;
            validate(&config, &request, swaps.as_deref())
        }
        Command::Simulate {
            request,
            state,
            caller,
            swaps,
            write,
        } => {
            let config = load_config(args.config.as_deref())?;
            simulate(&config, &request, &state, caller, swaps.as_deref(), write).await
        }
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => info!("Loading configuration from: {}", path),
        None => info!("Loading configuration from default location"),
    }
    let config = Config::load_from_path(path)?;
    info!(
        "Bridge '{}': chain {} -> chain {}",
        config.adapter.bridge_name, config.adapter.source_chain_id, config.adapter.destination_chain_id
    );
    Ok(config)
}

fn validate(config: &Config, request_path: &Path, swaps_path: Option<&Path>) -> Result<()> {
    let request: BridgeTransactionRequest = read_json(request_path)?;
    let swaps: Option<Vec<SwapStep>> = swaps_path.map(read_json::<Vec<SwapStep>>).transpose()?;
    let entry = match swaps {
        Some(_) => EntryPoint::SwapThenTransfer,
        None => EntryPoint::Direct,
    };

    let validator = BridgeDataValidator::new(config.adapter.clone());
    let verdict = validator.validate(&request, entry).and_then(|()| match &swaps {
        Some(steps) => SwapExecutor::check_steps(steps, request.sending_asset_id),
        None => Ok(()),
    });
    match verdict {
        Ok(()) => {
            println!("valid ({:?})", entry);
            Ok(())
        }
        Err(e) => anyhow::bail!("invalid request: {}", e),
    }
}

async fn simulate(
    config: &Config,
    request_path: &Path,
    state_path: &Path,
    caller: Address,
    swaps_path: Option<&Path>,
    write: bool,
) -> Result<()> {
    let request: BridgeTransactionRequest = read_json(request_path)?;
    let ledger: Ledger = read_json(state_path)?;
    let swaps: Option<Vec<SwapStep>> = swaps_path.map(read_json::<Vec<SwapStep>>).transpose()?;

    let allowlist = InMemoryAllowlist::from_parts(
        config.allowlist.contracts.iter().copied(),
        &config.allowlist.function_signatures,
    );
    let orchestrator = TransferOrchestrator::from_config(
        config,
        Arc::new(allowlist),
        Arc::new(SimulatedVenue),
        Arc::new(TracingSink),
    )?;
    let service = TransferService::new(orchestrator, ledger);

    let receipt = match &swaps {
        Some(steps) => service.swap_and_start_bridge_tokens(caller, &request, steps).await,
        None => service.start_bridge_tokens(caller, &request).await,
    }
    .context("transfer aborted")?;

    println!("{}", serde_json::to_string_pretty(&receipt.event)?);
    if !receipt.surplus.is_zero() {
        info!("Surplus retained in custody: {}", receipt.surplus);
    }

    if write {
        let committed = service.snapshot().await;
        std::fs::write(state_path, serde_json::to_string_pretty(&committed)?)
            .with_context(|| format!("Failed to write ledger to {}", state_path.display()))?;
        info!("Committed ledger written to {}", state_path.display());
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_address(raw: &str) -> std::result::Result<Address, String> {
    let stripped = raw.strip_prefix("0x").unwrap_or(raw);
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(stripped, &mut bytes)
        .map_err(|e| format!("invalid address '{}': {}", raw, e))?;
    Ok(Address::from(bytes))
}
