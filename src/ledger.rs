//! Asset Custody Ledger
//!
//! In-memory rendering of the token custody primitive the orchestrator
//! consumes: per-asset balances, spending allowances, and the pull / push /
//! approve operations with their failure semantics. Failures are returned as
//! [`CustodyError`] and never degrade into silent no-ops.

use std::collections::BTreeMap;

use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::CustodyError;

/// asset -> holder -> amount
type Balances = BTreeMap<Address, BTreeMap<Address, U256>>;
/// asset -> owner -> spender -> amount
type Allowances = BTreeMap<Address, BTreeMap<Address, BTreeMap<Address, U256>>>;

/// Balances and allowances for every asset, keyed by asset address.
///
/// `Clone` is cheap enough for an invocation to stage its effects on a private
/// copy and swap it in on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    balances: Balances,
    #[serde(default)]
    allowances: Allowances,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance of `holder` in `asset`.
    pub fn balance_of(&self, asset: &Address, holder: &Address) -> U256 {
        self.balances
            .get(asset)
            .and_then(|holders| holders.get(holder))
            .copied()
            .unwrap_or_default()
    }

    /// Amount of `asset` that `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> U256 {
        self.allowances
            .get(asset)
            .and_then(|owners| owners.get(owner))
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or_default()
    }

    /// Creates `amount` of `asset` out of thin air for `to`.
    ///
    /// Used to seed ledgers (fixtures, venue reserves); the orchestrator never mints.
    pub fn mint(&mut self, asset: Address, to: Address, amount: U256) -> Result<(), CustodyError> {
        self.credit(asset, to, amount)
    }

    /// Sets the allowance of `spender` over `owner`'s `asset` to exactly `amount`.
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: U256) {
        self.allowances
            .entry(asset)
            .or_default()
            .entry(owner)
            .or_default()
            .insert(spender, amount);
    }

    /// Push: moves `amount` of `asset` from `from` to `to`.
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CustodyError> {
        let from_balance = self.balance_of(&asset, &from);
        if from_balance < amount {
            return Err(CustodyError::InsufficientBalance {
                asset,
                holder: from,
                balance: from_balance,
                required: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        // Both sides are computed before either is written.
        let to_balance = self
            .balance_of(&asset, &to)
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { asset, holder: to })?;
        let holders = self.balances.entry(asset).or_default();
        holders.insert(from, from_balance - amount);
        holders.insert(to, to_balance);
        Ok(())
    }

    /// Pull: `spender` moves `amount` of `asset` from `from` to `to`, consuming allowance.
    ///
    /// The allowance is checked before the balance, matching the usual token
    /// contract ordering, so an unapproved pull reports an allowance fault even
    /// when the balance is also short.
    pub fn transfer_from(
        &mut self,
        asset: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CustodyError> {
        let allowance = self.allowance(&asset, &from, &spender);
        if allowance < amount {
            return Err(CustodyError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                allowance,
                required: amount,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.approve(asset, from, spender, allowance - amount);
        Ok(())
    }

    fn credit(&mut self, asset: Address, holder: Address, amount: U256) -> Result<(), CustodyError> {
        let balance = self.balance_of(&asset, &holder);
        let updated = balance
            .checked_add(amount)
            .ok_or(CustodyError::Overflow { asset, holder })?;
        self.balances.entry(asset).or_default().insert(holder, updated);
        Ok(())
    }
}
