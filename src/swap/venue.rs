//! In-process swap venue.
//!
//! Stands in for an external exchange when there is no chain to call: dry
//! runs from the CLI and the test-suite. A venue's reserves are simply the
//! ledger balances held at the call target's address.
//!
//! Payload layout: `selector (4 bytes) || amount_out (32 bytes, big-endian)`.

use anyhow::Context;
use ethereum_types::U256;

use super::{SwapCall, SwapCallInvoker};
use crate::allowlist::function_selector;
use crate::ledger::Ledger;

/// Pulls `source_amount` through the approval target's allowance and pays
/// `amount_out` of the destination asset back to the orchestrator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedVenue;

impl SimulatedVenue {
    /// Signature whose selector prefixes payloads built by [`Self::encode_swap`].
    pub const SWAP_SIGNATURE: &'static str = "swapExactInput(uint256)";

    /// Payload asking for exactly `amount_out` of the destination asset.
    pub fn encode_swap(amount_out: U256) -> Vec<u8> {
        Self::encode_with_selector(function_selector(Self::SWAP_SIGNATURE), amount_out)
    }

    pub fn encode_with_selector(selector: [u8; 4], amount_out: U256) -> Vec<u8> {
        let mut payload = selector.to_vec();
        let mut word = [0u8; 32];
        amount_out.to_big_endian(&mut word);
        payload.extend_from_slice(&word);
        payload
    }

    fn decode_amount_out(payload: &[u8]) -> anyhow::Result<U256> {
        let word = payload
            .get(4..36)
            .context("payload too short: expected selector and 32-byte amount_out")?;
        Ok(U256::from_big_endian(word))
    }
}

impl SwapCallInvoker for SimulatedVenue {
    fn invoke(&self, ledger: &mut Ledger, call: &SwapCall<'_>) -> anyhow::Result<()> {
        let amount_out = Self::decode_amount_out(call.payload)?;

        ledger
            .transfer_from(
                call.source_asset,
                call.approval_target,
                call.orchestrator,
                call.target,
                call.source_amount,
            )
            .context("venue could not collect the input amount")?;

        ledger
            .transfer(call.destination_asset, call.target, call.orchestrator, amount_out)
            .context("venue reserves cannot cover the requested output")?;

        Ok(())
    }
}
