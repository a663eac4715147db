//! Swap Execution Module
//!
//! Executes the ordered swap steps that convert the caller's source asset into
//! the asset the bridge accepts. Every step is staged through orchestrator
//! custody: funds are deposited into custody, an allowance bounded to the
//! step's `source_amount` is granted, and only then is the external call
//! issued. External calls go through the [`SwapCallInvoker`] capability so the
//! executor stays independent of any specific call ABI.
//!
//! ## Security Requirements
//!
//! The allowlist is re-checked on every step, not once per sequence, so a
//! target revoked while a sequence is in flight cannot be used by later steps.
//! Both the call target and the approval target must be allow-listed, and the
//! approval is reset to zero once the call returns.
//!
//! A step may only spend what the current invocation put into custody: its own
//! deposits plus the outputs of earlier steps. Custody balances left behind by
//! other invocations are never reachable.

pub mod venue;

use std::collections::HashMap;
use std::sync::Arc;

use ethereum_types::{Address, U256};
use tracing::{debug, info};

use crate::allowlist::AllowlistRegistry;
use crate::error::{CustodyError, OrchestratorError, Result};
use crate::ledger::Ledger;
use crate::types::SwapStep;

pub use venue::SimulatedVenue;

// ============================================================================
// EXTERNAL CALL CAPABILITY
// ============================================================================

/// Everything an adapter needs to perform one swap call.
#[derive(Debug, Clone, Copy)]
pub struct SwapCall<'a> {
    /// Holder of custody issuing the call
    pub orchestrator: Address,
    pub target: Address,
    /// Spender approved for `source_amount` of `source_asset` just before the call
    pub approval_target: Address,
    pub source_asset: Address,
    pub destination_asset: Address,
    pub source_amount: U256,
    pub payload: &'a [u8],
}

/// Owns the mechanics of issuing a call to an external swap venue.
///
/// An `Err` means the call reverted. Whatever the adapter changed in `ledger`
/// before failing is discarded together with the rest of the invocation.
pub trait SwapCallInvoker: Send + Sync {
    fn invoke(&self, ledger: &mut Ledger, call: &SwapCall<'_>) -> anyhow::Result<()>;
}

// ============================================================================
// SWAP EXECUTOR
// ============================================================================

pub struct SwapExecutor {
    orchestrator: Address,
    allowlist: Arc<dyn AllowlistRegistry>,
    invoker: Arc<dyn SwapCallInvoker>,
}

impl SwapExecutor {
    pub fn new(
        orchestrator: Address,
        allowlist: Arc<dyn AllowlistRegistry>,
        invoker: Arc<dyn SwapCallInvoker>,
    ) -> Self {
        Self {
            orchestrator,
            allowlist,
            invoker,
        }
    }

    /// Structural checks on the step sequence, before anything is touched.
    ///
    /// # Returns
    ///
    /// * `Err(NoSwapDataProvided)` - `steps` is empty
    /// * `Err(NoSwapFromZeroBalance)` - a step consumes nothing
    /// * `Err(InvalidSendingToken)` - the last step does not produce `final_asset`
    pub fn check_steps(steps: &[SwapStep], final_asset: Address) -> Result<()> {
        let last = steps.last().ok_or(OrchestratorError::NoSwapDataProvided)?;

        if let Some(step) = steps.iter().position(|s| s.source_amount.is_zero()) {
            return Err(OrchestratorError::NoSwapFromZeroBalance { step });
        }

        if last.destination_asset != final_asset {
            return Err(OrchestratorError::InvalidSendingToken);
        }

        Ok(())
    }

    /// Runs `steps` in order against `ledger`, pulling deposits from `payer`.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Staged custody state of the current invocation
    /// * `steps` - Swap steps, executed in sequence
    /// * `payer` - Account deposits are pulled from
    /// * `final_asset` - Asset the sequence must produce
    /// * `min_amount` - Least amount of `final_asset` the sequence must produce
    ///
    /// # Returns
    ///
    /// * `Ok(U256)` - Amount of `final_asset` the sequence added to custody
    /// * `Err(OrchestratorError)` - The first failure; the caller must discard `ledger`
    pub fn execute(
        &self,
        ledger: &mut Ledger,
        steps: &[SwapStep],
        payer: Address,
        final_asset: Address,
        min_amount: U256,
    ) -> Result<U256> {
        Self::check_steps(steps, final_asset)?;

        let initial_balance = ledger.balance_of(&final_asset, &self.orchestrator);
        let mut credit = HashMap::new();

        for (index, step) in steps.iter().enumerate() {
            self.execute_step(ledger, &mut credit, index, step, payer)?;
        }

        let produced = ledger
            .balance_of(&final_asset, &self.orchestrator)
            .saturating_sub(initial_balance);

        if produced < min_amount {
            return Err(OrchestratorError::InsufficientOutput {
                produced,
                required: min_amount,
            });
        }

        info!(
            "Swap sequence of {} step(s) produced {} of {:?}",
            steps.len(),
            produced,
            final_asset
        );
        Ok(produced)
    }

    fn execute_step(
        &self,
        ledger: &mut Ledger,
        credit: &mut HashMap<Address, U256>,
        index: usize,
        step: &SwapStep,
        payer: Address,
    ) -> Result<()> {
        if step.requires_deposit {
            debug!(
                "Step {}: depositing {} of {:?} from {:?}",
                index, step.source_amount, step.source_asset, payer
            );
            ledger.transfer_from(
                step.source_asset,
                self.orchestrator,
                payer,
                self.orchestrator,
                step.source_amount,
            )?;
            let held = credit.entry(step.source_asset).or_insert_with(U256::zero);
            *held = held.saturating_add(step.source_amount);
        }

        let available = credit.get(&step.source_asset).copied().unwrap_or_default();
        if available < step.source_amount {
            debug!(
                "Step {}: invocation holds {} of {:?}, step spends {}",
                index, available, step.source_asset, step.source_amount
            );
            return Err(CustodyError::InsufficientBalance {
                asset: step.source_asset,
                holder: self.orchestrator,
                balance: available,
                required: step.source_amount,
            }
            .into());
        }

        self.ensure_allowed(index, step)?;

        let source_before = ledger.balance_of(&step.source_asset, &self.orchestrator);
        let destination_before = ledger.balance_of(&step.destination_asset, &self.orchestrator);

        ledger.approve(
            step.source_asset,
            self.orchestrator,
            step.approval_target,
            step.source_amount,
        );

        let call = SwapCall {
            orchestrator: self.orchestrator,
            target: step.call_target,
            approval_target: step.approval_target,
            source_asset: step.source_asset,
            destination_asset: step.destination_asset,
            source_amount: step.source_amount,
            payload: &step.call_payload,
        };

        debug!(
            "Step {}: calling {:?} ({} -> {:?})",
            index, step.call_target, step.source_amount, step.destination_asset
        );
        self.invoker
            .invoke(ledger, &call)
            .map_err(|e| OrchestratorError::ExternalCallReverted {
                step: index,
                target: step.call_target,
                reason: format!("{:#}", e),
            })?;

        ledger.approve(
            step.source_asset,
            self.orchestrator,
            step.approval_target,
            U256::zero(),
        );

        let spent = source_before
            .saturating_sub(ledger.balance_of(&step.source_asset, &self.orchestrator));
        let received = ledger
            .balance_of(&step.destination_asset, &self.orchestrator)
            .saturating_sub(destination_before);

        let held = credit.entry(step.source_asset).or_insert_with(U256::zero);
        *held = held.saturating_sub(spent);
        let held = credit.entry(step.destination_asset).or_insert_with(U256::zero);
        *held = held.saturating_add(received);

        Ok(())
    }

    fn ensure_allowed(&self, index: usize, step: &SwapStep) -> Result<()> {
        let violation = OrchestratorError::AllowlistViolation {
            step: index,
            target: step.call_target,
        };

        if !self.allowlist.is_contract_allowed(&step.call_target) {
            debug!("Step {}: target {:?} is not allow-listed", index, step.call_target);
            return Err(violation);
        }

        if !self.allowlist.is_contract_allowed(&step.approval_target) {
            debug!(
                "Step {}: approval target {:?} is not allow-listed",
                index, step.approval_target
            );
            return Err(OrchestratorError::AllowlistViolation {
                step: index,
                target: step.approval_target,
            });
        }

        match step.selector() {
            Some(selector) if self.allowlist.is_selector_allowed(selector) => Ok(()),
            Some(selector) => {
                debug!(
                    "Step {}: selector 0x{} is not allow-listed",
                    index,
                    hex::encode(selector)
                );
                Err(violation)
            }
            None => {
                debug!("Step {}: payload carries no selector", index);
                Err(violation)
            }
        }
    }
}
