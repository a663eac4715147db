//! Transfer Orchestration Module
//!
//! Composes validation, the optional swap sequence and bridge dispatch into
//! the two public entry points, and owns their all-or-nothing contract.
//!
//! ## Overview
//!
//! Both entry points follow the same state machine:
//!
//! ```text
//! Received -> Validated -> (Swapped) -> Dispatched -> Notified
//!     \___________\____________\____________\______-> Aborted
//! ```
//!
//! Every effect of an invocation (deposits, approvals, swap results, the
//! transfer into the bridge, the notification) is staged on a private copy of
//! the ledger. The copy replaces the caller's ledger, and the notification is
//! published, only once the whole path has succeeded. On the first failure the
//! staging area is dropped and the caller's ledger is left exactly as it was.

use std::sync::Arc;

use ethereum_types::{Address, U256};
use tracing::{debug, info, warn};

use crate::allowlist::AllowlistRegistry;
use crate::config::{BridgeAdapterConfig, Config};
use crate::dispatcher::{BridgeDispatcher, BridgeEndpoint, TokenBridgeEndpoint};
use crate::error::Result;
use crate::events::{NotificationSink, TransferStarted};
use crate::ledger::Ledger;
use crate::swap::{SwapCallInvoker, SwapExecutor};
use crate::types::{BridgeTransactionRequest, EntryPoint, SwapStep};
use crate::validator::BridgeDataValidator;

// ============================================================================
// INVOCATION STATE
// ============================================================================

/// Lifecycle of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Received,
    Validated,
    Swapped,
    Dispatched,
    Notified,
    Aborted,
}

/// Effects of one invocation that are not yet visible outside it.
#[derive(Debug)]
pub struct Staging {
    ledger: Ledger,
    outbox: Vec<TransferStarted>,
}

impl Staging {
    fn new(ledger: Ledger) -> Self {
        Self {
            ledger,
            outbox: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    /// Queues a notification for publication on commit.
    pub fn emit(&mut self, event: TransferStarted) {
        self.outbox.push(event);
    }

    fn into_parts(self) -> (Ledger, Vec<TransferStarted>) {
        (self.ledger, self.outbox)
    }
}

/// Returned to the caller when a transfer has started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    /// The published notification
    pub event: TransferStarted,
    /// Amount of the accepted asset funded for this transfer (swap output on the swap path)
    pub produced_amount: U256,
    /// Swap output above `min_amount`, left in orchestrator custody
    pub surplus: U256,
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct TransferOrchestrator {
    adapter: BridgeAdapterConfig,
    validator: BridgeDataValidator,
    swaps: SwapExecutor,
    dispatcher: BridgeDispatcher,
    sink: Arc<dyn NotificationSink>,
}

impl TransferOrchestrator {
    /// Wires the orchestrator to its collaborators.
    ///
    /// # Arguments
    ///
    /// * `adapter` - Bridge adapter binding
    /// * `allowlist` - Read-only allowlist capability
    /// * `invoker` - Adapter issuing swap calls
    /// * `endpoint` - Source-side bridge endpoint; must sit at `adapter.source_endpoint`
    /// * `sink` - Where committed notifications are published
    ///
    /// # Returns
    ///
    /// * `Ok(TransferOrchestrator)` - Successfully wired
    /// * `Err(anyhow::Error)` - The endpoint does not match the adapter
    pub fn new(
        adapter: BridgeAdapterConfig,
        allowlist: Arc<dyn AllowlistRegistry>,
        invoker: Arc<dyn SwapCallInvoker>,
        endpoint: Arc<dyn BridgeEndpoint>,
        sink: Arc<dyn NotificationSink>,
    ) -> anyhow::Result<Self> {
        if endpoint.address() != adapter.source_endpoint {
            anyhow::bail!(
                "Bridge endpoint at {:?} does not match adapter source endpoint {:?}",
                endpoint.address(),
                adapter.source_endpoint
            );
        }

        info!(
            "Orchestrator bound to bridge '{}': chain {} -> chain {}, asset {:?}",
            adapter.bridge_name,
            adapter.source_chain_id,
            adapter.destination_chain_id,
            adapter.accepted_asset
        );

        Ok(Self {
            validator: BridgeDataValidator::new(adapter.clone()),
            swaps: SwapExecutor::new(adapter.orchestrator_address, allowlist, invoker),
            dispatcher: BridgeDispatcher::new(adapter.clone(), endpoint),
            adapter,
            sink,
        })
    }

    /// Builds an orchestrator whose endpoint is a [`TokenBridgeEndpoint`]
    /// configured from `config`.
    pub fn from_config(
        config: &Config,
        allowlist: Arc<dyn AllowlistRegistry>,
        invoker: Arc<dyn SwapCallInvoker>,
        sink: Arc<dyn NotificationSink>,
    ) -> anyhow::Result<Self> {
        let endpoint =
            TokenBridgeEndpoint::from_config(config.adapter.source_endpoint, &config.endpoint);
        Self::new(
            config.adapter.clone(),
            allowlist,
            invoker,
            Arc::new(endpoint),
            sink,
        )
    }

    pub fn adapter(&self) -> &BridgeAdapterConfig {
        &self.adapter
    }

    pub fn validator(&self) -> &BridgeDataValidator {
        &self.validator
    }

    /// Direct path: pulls `min_amount` from `caller` and bridges it.
    pub fn start_bridge_tokens(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        request: &BridgeTransactionRequest,
    ) -> Result<TransferReceipt> {
        self.run_atomically(ledger, request, EntryPoint::Direct, |staging| {
            let custody = self.adapter.orchestrator_address;
            staging.ledger_mut().transfer_from(
                request.sending_asset_id,
                custody,
                caller,
                custody,
                request.min_amount,
            )?;

            let event = self.dispatcher.dispatch(staging, request, request.min_amount)?;
            transition(request, TransferState::Dispatched);

            Ok(TransferReceipt {
                event,
                produced_amount: request.min_amount,
                surplus: U256::zero(),
            })
        })
    }

    /// Swap path: runs `steps`, then bridges `min_amount` of their output.
    ///
    /// Output above `min_amount` stays in orchestrator custody and is reported
    /// as the receipt's `surplus`.
    pub fn swap_and_start_bridge_tokens(
        &self,
        ledger: &mut Ledger,
        caller: Address,
        request: &BridgeTransactionRequest,
        steps: &[SwapStep],
    ) -> Result<TransferReceipt> {
        self.run_atomically(ledger, request, EntryPoint::SwapThenTransfer, |staging| {
            let produced = self.swaps.execute(
                staging.ledger_mut(),
                steps,
                caller,
                request.sending_asset_id,
                request.min_amount,
            )?;
            transition(request, TransferState::Swapped);

            let surplus = produced - request.min_amount;
            if !surplus.is_zero() {
                info!(
                    "Swap for {:?} left a surplus of {} in custody",
                    request.transaction_id, surplus
                );
            }

            let event = self.dispatcher.dispatch(staging, request, request.min_amount)?;
            transition(request, TransferState::Dispatched);

            Ok(TransferReceipt {
                event,
                produced_amount: produced,
                surplus,
            })
        })
    }

    fn run_atomically<F>(
        &self,
        ledger: &mut Ledger,
        request: &BridgeTransactionRequest,
        entry: EntryPoint,
        body: F,
    ) -> Result<TransferReceipt>
    where
        F: FnOnce(&mut Staging) -> Result<TransferReceipt>,
    {
        info!(
            "Received {:?} transfer {:?}: {} of {:?} to {:?}",
            entry,
            request.transaction_id,
            request.min_amount,
            request.sending_asset_id,
            request.receiver
        );
        transition(request, TransferState::Received);

        let outcome = self
            .validator
            .validate(request, entry)
            .and_then(|()| {
                transition(request, TransferState::Validated);
                let mut staging = Staging::new(ledger.clone());
                body(&mut staging).map(|receipt| (staging, receipt))
            });

        match outcome {
            Ok((staging, receipt)) => {
                let (staged_ledger, outbox) = staging.into_parts();
                *ledger = staged_ledger;
                for event in &outbox {
                    self.sink.publish(event);
                }
                transition(request, TransferState::Notified);
                info!("Transfer {:?} started", request.transaction_id);
                Ok(receipt)
            }
            Err(e) => {
                transition(request, TransferState::Aborted);
                warn!("Transfer {:?} aborted: {}", request.transaction_id, e);
                Err(e)
            }
        }
    }
}

fn transition(request: &BridgeTransactionRequest, state: TransferState) {
    debug!("Transfer {:?} -> {:?}", request.transaction_id, state);
}
