//! Error definitions for the bridge orchestrator.
//!
//! Every variant aborts the whole invocation. Callers receive the specific
//! variant so they can tell bad input apart from allowlist problems and from
//! failures at an external swap venue or bridge endpoint.

use ethereum_types::{Address, U256};
use thiserror::Error;

/// Faults raised by the asset custody primitive (the token ledger).
///
/// These are surfaced verbatim through [`OrchestratorError::Custody`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("insufficient balance: {holder:?} holds {balance} of asset {asset:?}, needs {required}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        balance: U256,
        required: U256,
    },

    #[error(
        "insufficient allowance: {spender:?} may move {allowance} of asset {asset:?} from {owner:?}, needs {required}"
    )]
    InsufficientAllowance {
        asset: Address,
        owner: Address,
        spender: Address,
        allowance: U256,
        required: U256,
    },

    #[error("arithmetic overflow crediting {holder:?} with asset {asset:?}")]
    Overflow { asset: Address, holder: Address },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("invalid amount: min_amount must be greater than zero")]
    InvalidAmount,

    #[error("invalid receiver: must be non-zero and must not be a bridge endpoint")]
    InvalidReceiver,

    #[error("invalid destination chain")]
    InvalidDestinationChain,

    #[error("invalid sending token")]
    InvalidSendingToken,

    #[error("has_source_swaps does not match the invoked entry point")]
    InvalidCallFlag,

    #[error("no swap data provided")]
    NoSwapDataProvided,

    #[error("swap step {step} has a zero source amount")]
    NoSwapFromZeroBalance { step: usize },

    #[error("contract call not allowed: step {step} targets {target:?}")]
    AllowlistViolation { step: usize, target: Address },

    #[error("external call to {target:?} reverted at step {step}: {reason}")]
    ExternalCallReverted {
        step: usize,
        target: Address,
        reason: String,
    },

    #[error("insufficient swap output: produced {produced}, required {required}")]
    InsufficientOutput { produced: U256, required: U256 },

    #[error("bridge transfer reverted: {reason}")]
    BridgeTransferReverted { reason: String },

    #[error(transparent)]
    Custody(#[from] CustodyError),
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
