//! Request Data Structures
//!
//! This module defines the structured input accepted by both entry points:
//! the bridge transaction request itself and, on the swap path, the ordered
//! swap steps executed before the transfer.

use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Which public entry point an invocation came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPoint {
    /// Caller funds are pulled and bridged as-is
    Direct,
    /// Caller funds are swapped into the accepted asset, then bridged
    SwapThenTransfer,
}

impl EntryPoint {
    /// Value `has_source_swaps` must carry for this entry point.
    pub fn expects_source_swaps(self) -> bool {
        matches!(self, EntryPoint::SwapThenTransfer)
    }
}

// ============================================================================
// BRIDGE TRANSACTION REQUEST
// ============================================================================

/// The transfer intent supplied by the caller.
///
/// Treated as a read-only snapshot for the duration of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransactionRequest {
    /// Caller-supplied correlation identifier (uniqueness is not enforced)
    pub transaction_id: H256,
    /// Routing tag naming the bridge adapter in use
    pub bridge_name: String,
    /// Attribution: integrator name
    pub integrator: String,
    /// Attribution: referrer address
    pub referrer: Address,
    /// Asset transferred into the bridge; must be the adapter's accepted asset
    pub sending_asset_id: Address,
    /// Beneficiary on the destination chain
    pub receiver: Address,
    /// Amount transferred into the bridge
    #[serde(with = "amount")]
    pub min_amount: U256,
    /// Must equal the adapter's fixed destination chain
    pub destination_chain_id: u64,
    /// Selects direct vs swap-then-transfer; must match the entry point
    pub has_source_swaps: bool,
    /// Reserved for destination-side execution, carried into the notification
    pub has_destination_call: bool,
}

// ============================================================================
// SWAP STEPS
// ============================================================================

/// One external call in the pre-bridge swap sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapStep {
    /// Contract the call is issued to (must be allow-listed)
    pub call_target: Address,
    /// Address granted spending rights over `source_amount` before the call
    pub approval_target: Address,
    /// Asset consumed by this step
    pub source_asset: Address,
    /// Asset produced by this step
    pub destination_asset: Address,
    /// Opaque calldata forwarded verbatim to `call_target`
    #[serde(with = "hex_bytes")]
    pub call_payload: Vec<u8>,
    /// Amount of `source_asset` consumed
    #[serde(with = "amount")]
    pub source_amount: U256,
    /// Pull `source_amount` from the caller into custody before the call
    pub requires_deposit: bool,
}

impl SwapStep {
    /// Leading four bytes of the payload, if present.
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.call_payload
            .get(..4)
            .map(|head| [head[0], head[1], head[2], head[3]])
    }
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

/// Amounts as decimal strings; `0x` hex is accepted on input.
pub mod amount {
    use ethereum_types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    /// Parses a decimal or `0x`-prefixed hex amount.
    pub fn parse(raw: &str) -> Result<U256, String> {
        let raw = raw.trim();
        match raw.strip_prefix("0x") {
            Some(hex) => U256::from_str_radix(hex, 16)
                .map_err(|e| format!("invalid hex amount '{}': {:?}", raw, e)),
            None => U256::from_dec_str(raw)
                .map_err(|e| format!("invalid decimal amount '{}': {:?}", raw, e)),
        }
    }
}

/// Optional amounts, same encoding as [`amount`].
pub mod option_amount {
    use ethereum_types::U256;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<U256>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::amount::parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}

/// Byte strings as `0x`-prefixed hex.
pub mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let stripped = raw.strip_prefix("0x").unwrap_or(&raw);
        hex::decode(stripped).map_err(D::Error::custom)
    }
}
