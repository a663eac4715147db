//! Transfer Service
//!
//! Async front of the orchestrator for callers sharing one custody ledger.
//! Each invocation holds the ledger lock from entry to commit, so concurrent
//! callers are serialized and never observe another invocation's staged state.

use std::sync::Arc;

use ethereum_types::Address;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::orchestrator::{TransferOrchestrator, TransferReceipt};
use crate::types::{BridgeTransactionRequest, SwapStep};

/// Shared handle over an orchestrator and the ledger it operates on.
///
/// Cloning is cheap; all clones drive the same ledger.
#[derive(Clone)]
pub struct TransferService {
    orchestrator: Arc<TransferOrchestrator>,
    ledger: Arc<Mutex<Ledger>>,
}

impl TransferService {
    /// Creates a new service.
    ///
    /// # Arguments
    ///
    /// * `orchestrator` - Orchestrator bound to the bridge adapter
    /// * `ledger` - Initial custody state
    pub fn new(orchestrator: TransferOrchestrator, ledger: Ledger) -> Self {
        info!(
            "Transfer service ready for bridge '{}'",
            orchestrator.adapter().bridge_name
        );
        Self {
            orchestrator: Arc::new(orchestrator),
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn orchestrator(&self) -> &TransferOrchestrator {
        &self.orchestrator
    }

    /// Direct transfer on behalf of `caller`.
    pub async fn start_bridge_tokens(
        &self,
        caller: Address,
        request: &BridgeTransactionRequest,
    ) -> Result<TransferReceipt> {
        let mut ledger = self.ledger.lock().await;
        self.orchestrator
            .start_bridge_tokens(&mut ledger, caller, request)
    }

    /// Swap-then-transfer on behalf of `caller`.
    pub async fn swap_and_start_bridge_tokens(
        &self,
        caller: Address,
        request: &BridgeTransactionRequest,
        steps: &[SwapStep],
    ) -> Result<TransferReceipt> {
        let mut ledger = self.ledger.lock().await;
        self.orchestrator
            .swap_and_start_bridge_tokens(&mut ledger, caller, request, steps)
    }

    /// Copy of the current committed ledger.
    pub async fn snapshot(&self) -> Ledger {
        self.ledger.lock().await.clone()
    }

    /// Runs `f` against the ledger between invocations (funding accounts,
    /// granting allowances, seeding venue reserves).
    pub async fn with_ledger<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut Ledger) -> T,
    {
        let mut ledger = self.ledger.lock().await;
        f(&mut ledger)
    }
}
