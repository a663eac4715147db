//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the bridge orchestrator.
//! Configuration includes the bridge adapter binding (chains, accepted asset, endpoints),
//! endpoint transfer limits, and the swap allowlist.

use anyhow::Context;
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::types::option_amount;

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all orchestrator settings.
///
/// This structure holds configuration for:
/// - The bridge adapter this orchestrator instance is bound to
/// - Transfer limits enforced by the source-side bridge endpoint
/// - Contracts and function signatures callable during swap steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bridge adapter binding (fixed source/destination pairing and accepted asset)
    pub adapter: BridgeAdapterConfig,
    /// Source-side endpoint limits
    #[serde(default)]
    pub endpoint: EndpointConfig,
    /// Swap allowlist seed
    #[serde(default)]
    pub allowlist: AllowlistConfig,
}

/// The fixed source/destination-chain pairing and accepted-asset configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeAdapterConfig {
    /// Routing tag reported in notifications (e.g. "gnosis")
    pub bridge_name: String,
    /// Chain the orchestrator runs on
    pub source_chain_id: u64,
    /// The single destination chain this adapter delivers to
    pub destination_chain_id: u64,
    /// The only asset the bridge endpoint accepts
    pub accepted_asset: Address,
    /// Asset the receiver gets on the destination chain (zero for the native asset)
    pub receiving_asset_on_destination: Address,
    /// Bridge contract on the source chain (funds are sent here)
    pub source_endpoint: Address,
    /// Bridge contract on the destination chain
    pub destination_endpoint: Address,
    /// Address that holds custody during an invocation
    pub orchestrator_address: Address,
}

/// Per-transaction limits of the source-side endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Smallest amount the endpoint accepts in one transfer
    #[serde(default, with = "option_amount", skip_serializing_if = "Option::is_none")]
    pub min_per_tx: Option<U256>,
    /// Largest amount the endpoint accepts in one transfer
    #[serde(default, with = "option_amount", skip_serializing_if = "Option::is_none")]
    pub max_per_tx: Option<U256>,
}

/// Initial contents of the swap allowlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowlistConfig {
    /// Swap venues that may be called
    #[serde(default)]
    pub contracts: Vec<Address>,
    /// Function signatures whose selectors may be called, e.g. "swap(uint256)"
    #[serde(default)]
    pub function_signatures: Vec<String>,
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// This function:
    /// 1. Uses the provided path, or ORCHESTRATOR_CONFIG_PATH, or config/orchestrator.toml
    /// 2. If the file exists, loads, parses and validates the configuration
    /// 3. If it doesn't exist, returns an error asking user to copy template
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(anyhow::Error)` - File missing, unparsable, or invalid
    pub fn load_from_path(path: Option<&str>) -> anyhow::Result<Self> {
        let config_path = path
            .map(|p| p.to_string())
            .or_else(|| std::env::var("ORCHESTRATOR_CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/orchestrator.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file '{}'", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file '{}'", config_path))?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/orchestrator.template.toml config/orchestrator.toml\n\
                Then edit config/orchestrator.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Loads configuration from the default location (see `load_from_path`).
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(None)
    }

    /// Validates the configuration for consistency.
    ///
    /// Checks:
    /// - Source and destination chains differ
    /// - Accepted asset, endpoints and orchestrator address are non-zero
    /// - The two endpoints differ and neither is the orchestrator itself
    /// - Endpoint limits are ordered (min <= max)
    pub fn validate(&self) -> anyhow::Result<()> {
        let adapter = &self.adapter;

        if adapter.source_chain_id == adapter.destination_chain_id {
            anyhow::bail!(
                "Source and destination chain IDs must differ (both are {})",
                adapter.source_chain_id
            );
        }

        for (name, addr) in [
            ("accepted_asset", adapter.accepted_asset),
            ("source_endpoint", adapter.source_endpoint),
            ("destination_endpoint", adapter.destination_endpoint),
            ("orchestrator_address", adapter.orchestrator_address),
        ] {
            if addr.is_zero() {
                anyhow::bail!("adapter.{} must not be the zero address", name);
            }
        }

        if adapter.source_endpoint == adapter.destination_endpoint {
            anyhow::bail!("Source and destination endpoints must be different addresses");
        }

        if adapter.orchestrator_address == adapter.source_endpoint
            || adapter.orchestrator_address == adapter.destination_endpoint
        {
            anyhow::bail!("orchestrator_address must not equal a bridge endpoint");
        }

        if let (Some(min), Some(max)) = (self.endpoint.min_per_tx, self.endpoint.max_per_tx) {
            if min > max {
                anyhow::bail!("endpoint.min_per_tx ({}) exceeds endpoint.max_per_tx ({})", min, max);
            }
        }

        Ok(())
    }

    /// Creates a configuration bound to the xDai bridge (DAI, Ethereum -> Gnosis).
    ///
    /// The orchestrator address is a placeholder and must be replaced for real use.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self {
            adapter: BridgeAdapterConfig {
                bridge_name: "gnosis".to_string(),
                source_chain_id: 1,
                destination_chain_id: 100,
                // DAI on Ethereum mainnet
                accepted_asset: address_literal("6b175474e89094c44da98b954eedeac495271d0f"),
                // xDAI is the native asset on Gnosis
                receiving_asset_on_destination: Address::zero(),
                // xDai bridge, mainnet side
                source_endpoint: address_literal("4aa42145aa6ebf72e164c9bbc74fbd3788045016"),
                // xDai bridge, Gnosis side
                destination_endpoint: address_literal("7301cfa0e1756b71869e93d4e4dca5c7d0eb0aa6"),
                orchestrator_address: Address::from_low_u64_be(0x1f1),
            },
            endpoint: EndpointConfig::default(),
            allowlist: AllowlistConfig::default(),
        }
    }
}

fn address_literal(hex_str: &str) -> Address {
    let mut bytes = [0u8; 20];
    // Only called with the compile-time literals above.
    hex::decode_to_slice(hex_str, &mut bytes).expect("valid address literal");
    Address::from(bytes)
}
