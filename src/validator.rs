//! Bridge Request Validation Module
//!
//! Structural and business-rule checks on a [`BridgeTransactionRequest`]
//! against the adapter the orchestrator is bound to. Validation is a pure
//! function of the request, the entry point and static configuration.
//!
//! Rules are checked in a fixed order and the first failure is reported:
//!
//! 1. `min_amount > 0`                                  -> `InvalidAmount`
//! 2. receiver non-zero and not a bridge endpoint       -> `InvalidReceiver`
//! 3. destination chain is the adapter's destination    -> `InvalidDestinationChain`
//! 4. sending asset is the adapter's accepted asset     -> `InvalidSendingToken`
//! 5. `has_source_swaps` matches the invoked entry point -> `InvalidCallFlag`

use tracing::debug;

use crate::config::BridgeAdapterConfig;
use crate::error::{OrchestratorError, Result};
use crate::types::{BridgeTransactionRequest, EntryPoint};

#[derive(Debug, Clone)]
pub struct BridgeDataValidator {
    adapter: BridgeAdapterConfig,
}

impl BridgeDataValidator {
    pub fn new(adapter: BridgeAdapterConfig) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &BridgeAdapterConfig {
        &self.adapter
    }

    /// Validates `request` as received through `entry`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The request may proceed
    /// * `Err(OrchestratorError)` - The first rule the request violates
    pub fn validate(&self, request: &BridgeTransactionRequest, entry: EntryPoint) -> Result<()> {
        if request.min_amount.is_zero() {
            return Err(OrchestratorError::InvalidAmount);
        }

        // Sending to either side of the bridge itself would strand the funds.
        if request.receiver.is_zero()
            || request.receiver == self.adapter.source_endpoint
            || request.receiver == self.adapter.destination_endpoint
        {
            return Err(OrchestratorError::InvalidReceiver);
        }

        if request.destination_chain_id != self.adapter.destination_chain_id {
            return Err(OrchestratorError::InvalidDestinationChain);
        }

        if request.sending_asset_id != self.adapter.accepted_asset {
            return Err(OrchestratorError::InvalidSendingToken);
        }

        if request.has_source_swaps != entry.expects_source_swaps() {
            return Err(OrchestratorError::InvalidCallFlag);
        }

        debug!(
            "Request {:?} accepted for {:?} entry point",
            request.transaction_id, entry
        );
        Ok(())
    }
}
