//! Bridge Dispatch Module
//!
//! Hands the validated (and possibly swapped) asset to the bridge's
//! source-side endpoint and stages the `TransferStarted` notification.

use std::sync::Arc;

use ethereum_types::{Address, U256};
use tracing::info;

use crate::config::{BridgeAdapterConfig, EndpointConfig};
use crate::error::{OrchestratorError, Result};
use crate::events::TransferStarted;
use crate::ledger::Ledger;
use crate::orchestrator::Staging;
use crate::types::BridgeTransactionRequest;

// ============================================================================
// BRIDGE ENDPOINT CAPABILITY
// ============================================================================

/// Fixed-address sink that starts cross-chain delivery for one destination.
pub trait BridgeEndpoint: Send + Sync {
    /// Address funds are transferred to.
    fn address(&self) -> Address;

    /// Takes `amount` of `asset` from `sender` (who has approved the endpoint)
    /// and starts delivery to `receiver` on the destination chain.
    fn relay_tokens(
        &self,
        ledger: &mut Ledger,
        sender: Address,
        asset: Address,
        receiver: Address,
        amount: U256,
    ) -> anyhow::Result<()>;
}

/// Token bridge with a `relayTokens(receiver, amount)` interface and
/// per-transaction limits, modelled on the xDai bridge.
#[derive(Debug, Clone)]
pub struct TokenBridgeEndpoint {
    address: Address,
    min_per_tx: Option<U256>,
    max_per_tx: Option<U256>,
}

impl TokenBridgeEndpoint {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            min_per_tx: None,
            max_per_tx: None,
        }
    }

    pub fn from_config(address: Address, limits: &EndpointConfig) -> Self {
        Self {
            address,
            min_per_tx: limits.min_per_tx,
            max_per_tx: limits.max_per_tx,
        }
    }

    pub fn with_limits(mut self, min_per_tx: Option<U256>, max_per_tx: Option<U256>) -> Self {
        self.min_per_tx = min_per_tx;
        self.max_per_tx = max_per_tx;
        self
    }

    fn within_limit(&self, amount: U256) -> bool {
        self.min_per_tx.map_or(true, |min| amount >= min)
            && self.max_per_tx.map_or(true, |max| amount <= max)
    }
}

impl BridgeEndpoint for TokenBridgeEndpoint {
    fn address(&self) -> Address {
        self.address
    }

    fn relay_tokens(
        &self,
        ledger: &mut Ledger,
        sender: Address,
        asset: Address,
        receiver: Address,
        amount: U256,
    ) -> anyhow::Result<()> {
        if receiver.is_zero() {
            anyhow::bail!("receiver is the zero address");
        }
        if !self.within_limit(amount) {
            anyhow::bail!(
                "amount {} is not within limits (min: {:?}, max: {:?})",
                amount,
                self.min_per_tx.map(|v| v.to_string()),
                self.max_per_tx.map(|v| v.to_string())
            );
        }
        ledger.transfer_from(asset, self.address, sender, self.address, amount)?;
        Ok(())
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

pub struct BridgeDispatcher {
    adapter: BridgeAdapterConfig,
    endpoint: Arc<dyn BridgeEndpoint>,
}

impl BridgeDispatcher {
    pub fn new(adapter: BridgeAdapterConfig, endpoint: Arc<dyn BridgeEndpoint>) -> Self {
        Self { adapter, endpoint }
    }

    /// Transfers `amount` of the request's sending asset from custody into the
    /// bridge endpoint and stages the notification.
    ///
    /// # Arguments
    ///
    /// * `staging` - Staged state of the current invocation
    /// * `request` - The validated request
    /// * `amount` - Amount to bridge (the request's `min_amount`)
    ///
    /// # Returns
    ///
    /// * `Ok(TransferStarted)` - The staged notification
    /// * `Err(BridgeTransferReverted)` - The endpoint refused the transfer
    pub fn dispatch(
        &self,
        staging: &mut Staging,
        request: &BridgeTransactionRequest,
        amount: U256,
    ) -> Result<TransferStarted> {
        let custody = self.adapter.orchestrator_address;
        let endpoint = self.endpoint.address();
        let ledger = staging.ledger_mut();

        ledger.approve(request.sending_asset_id, custody, endpoint, amount);
        self.endpoint
            .relay_tokens(
                ledger,
                custody,
                request.sending_asset_id,
                request.receiver,
                amount,
            )
            .map_err(|e| OrchestratorError::BridgeTransferReverted {
                reason: format!("{:#}", e),
            })?;

        info!(
            "Dispatched {} of {:?} to bridge endpoint {:?} for receiver {:?} on chain {}",
            amount,
            request.sending_asset_id,
            endpoint,
            request.receiver,
            request.destination_chain_id
        );

        let event = TransferStarted {
            transaction_id: request.transaction_id,
            bridge_name: request.bridge_name.clone(),
            sending_asset_id: request.sending_asset_id,
            receiving_asset_id: self.adapter.receiving_asset_on_destination,
            receiver: request.receiver,
            min_amount: amount,
            destination_chain_id: request.destination_chain_id,
            has_source_swaps: request.has_source_swaps,
            has_destination_call: request.has_destination_call,
        };
        staging.emit(event.clone());
        Ok(event)
    }
}
