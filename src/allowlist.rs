//! Allowlist Registry Module
//!
//! The swap step may only call contracts, and only functions, that an
//! administrator has approved. The orchestrator depends on the read-only
//! [`AllowlistRegistry`] capability; [`InMemoryAllowlist`] is the in-process
//! registry used by the CLI and tests, including its administrative mutations.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use ethereum_types::Address;
use sha3::{Digest, Keccak256};
use tracing::info;

/// 4-byte function selector at the head of a call payload.
pub type Selector = [u8; 4];

/// Derives the selector of a Solidity-style function signature,
/// e.g. `"transfer(address,uint256)"` -> `0xa9059cbb`.
pub fn function_selector(signature: &str) -> Selector {
    let digest = Keccak256::digest(signature.as_bytes());
    [digest[0], digest[1], digest[2], digest[3]]
}

// ============================================================================
// REGISTRY CAPABILITY
// ============================================================================

/// Read path of the allowlist, as consumed by the swap executor.
///
/// Implementations may be mutated by an external administrative facility at
/// any time; the executor re-checks on every step.
pub trait AllowlistRegistry: Send + Sync {
    /// Whether `target` may be called during a swap step.
    fn is_contract_allowed(&self, target: &Address) -> bool;

    /// Whether a call carrying `selector` may be issued during a swap step.
    fn is_selector_allowed(&self, selector: Selector) -> bool;
}

// ============================================================================
// IN-MEMORY REGISTRY
// ============================================================================

#[derive(Debug, Default)]
struct Entries {
    contracts: HashSet<Address>,
    selectors: HashSet<Selector>,
}

/// Registry held in process memory. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct InMemoryAllowlist {
    entries: RwLock<Entries>,
}

impl InMemoryAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from contract addresses and function signatures.
    pub fn from_parts<C, S>(contracts: C, signatures: S) -> Self
    where
        C: IntoIterator<Item = Address>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let registry = Self::new();
        for contract in contracts {
            registry.add_contract(contract);
        }
        registry.batch_set_selector_approval_by_signature(signatures, true);
        registry
    }

    pub fn add_contract(&self, contract: Address) {
        info!("Allowlist: adding contract {:?}", contract);
        self.write().contracts.insert(contract);
    }

    pub fn remove_contract(&self, contract: &Address) {
        info!("Allowlist: removing contract {:?}", contract);
        self.write().contracts.remove(contract);
    }

    pub fn set_selector_approval(&self, selector: Selector, approved: bool) {
        let mut entries = self.write();
        if approved {
            entries.selectors.insert(selector);
        } else {
            entries.selectors.remove(&selector);
        }
    }

    /// Approves or revokes the selector of every signature in `signatures`.
    pub fn batch_set_selector_approval_by_signature<S>(&self, signatures: S, approved: bool)
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        for signature in signatures {
            let selector = function_selector(signature.as_ref());
            info!(
                "Allowlist: {} selector 0x{} ({})",
                if approved { "approving" } else { "revoking" },
                hex::encode(selector),
                signature.as_ref()
            );
            self.set_selector_approval(selector, approved);
        }
    }

    /// Snapshot of the allowed contracts.
    pub fn contracts(&self) -> Vec<Address> {
        self.read().contracts.iter().copied().collect()
    }

    // A panic while holding the lock cannot leave the sets half-updated, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AllowlistRegistry for InMemoryAllowlist {
    fn is_contract_allowed(&self, target: &Address) -> bool {
        self.read().contracts.contains(target)
    }

    fn is_selector_allowed(&self, selector: Selector) -> bool {
        self.read().selectors.contains(&selector)
    }
}
