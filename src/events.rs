//! Transfer notifications.
//!
//! `TransferStarted` is the single externally observable success signal of an
//! invocation. It is published only after the invocation's custody effects are
//! committed.

use std::sync::{Mutex, PoisonError};

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::amount;

/// Emitted once per successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStarted {
    pub transaction_id: H256,
    pub bridge_name: String,
    pub sending_asset_id: Address,
    pub receiving_asset_id: Address,
    pub receiver: Address,
    #[serde(with = "amount")]
    pub min_amount: U256,
    pub destination_chain_id: u64,
    pub has_source_swaps: bool,
    pub has_destination_call: bool,
}

/// Transport for committed notifications.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: &TransferStarted);
}

/// Writes each notification to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, event: &TransferStarted) {
        info!(
            transaction_id = ?event.transaction_id,
            bridge = %event.bridge_name,
            sending_asset_id = ?event.sending_asset_id,
            receiving_asset_id = ?event.receiving_asset_id,
            receiver = ?event.receiver,
            amount = %event.min_amount,
            destination_chain_id = event.destination_chain_id,
            has_source_swaps = event.has_source_swaps,
            has_destination_call = event.has_destination_call,
            "TransferStarted"
        );
    }
}

/// Keeps every published notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TransferStarted>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything published so far.
    pub fn events(&self) -> Vec<TransferStarted> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications published for `transaction_id`.
    pub fn find(&self, transaction_id: &H256) -> Vec<TransferStarted> {
        self.events()
            .into_iter()
            .filter(|event| &event.transaction_id == transaction_id)
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, event: &TransferStarted) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
