//! An in-memory asset ledger with ERC20 semantics

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{Amount, AssetId};

use crate::{error::LedgerError, traits::AssetLedger};

/// A mutating ledger operation
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LedgerOp {
    /// `transfer`
    Transfer,
    /// `transferFrom`
    TransferFrom,
    /// `approve`
    Approve,
}

/// A mutating call made through a ledger handle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    /// A `transfer` by `account`
    Transfer {
        /// The handle's account
        account: Address,
        /// The asset
        asset: AssetId,
        /// The receiver
        to: Address,
        /// The amount
        amount: Amount,
    },
    /// A `transferFrom` by `account`
    TransferFrom {
        /// The handle's account, the spender
        account: Address,
        /// The asset
        asset: AssetId,
        /// The account debited
        from: Address,
        /// The receiver
        to: Address,
        /// The amount
        amount: Amount,
    },
    /// An `approve` by `account`
    Approve {
        /// The handle's account, the owner
        account: Address,
        /// The asset
        asset: AssetId,
        /// The approved spender
        spender: Address,
        /// The allowance set
        amount: Amount,
    },
}

impl LedgerCall {
    /// The operation of the call
    pub fn op(&self) -> LedgerOp {
        match self {
            LedgerCall::Transfer { .. } => LedgerOp::Transfer,
            LedgerCall::TransferFrom { .. } => LedgerOp::TransferFrom,
            LedgerCall::Approve { .. } => LedgerOp::Approve,
        }
    }

    /// The account that made the call
    pub fn account(&self) -> Address {
        match *self {
            LedgerCall::Transfer { account, .. }
            | LedgerCall::TransferFrom { account, .. }
            | LedgerCall::Approve { account, .. } => account,
        }
    }

    /// The asset the call touched
    fn asset(&self) -> AssetId {
        match *self {
            LedgerCall::Transfer { asset, .. }
            | LedgerCall::TransferFrom { asset, .. }
            | LedgerCall::Approve { asset, .. } => asset,
        }
    }
}

/// The state behind the ledger lock
#[derive(Default)]
struct LedgerState {
    /// Balances keyed by `(asset, owner)`
    balances: HashMap<(AssetId, Address), Amount>,
    /// Allowances keyed by `(asset, owner, spender)`
    allowances: HashMap<(AssetId, Address, Address), Amount>,
    /// Every mutating call attempted, in order
    calls: Vec<LedgerCall>,
    /// One-shot failures to inject, with the matching calls to let through
    /// before each fires
    failures: Vec<(LedgerOp, AssetId, usize)>,
}

impl LedgerState {
    /// The balance of an owner
    fn balance(&self, asset: AssetId, owner: Address) -> Amount {
        self.balances.get(&(asset, owner)).copied().unwrap_or_default()
    }

    /// The allowance of a spender over an owner's asset
    fn allowance(&self, asset: AssetId, owner: Address, spender: Address) -> Amount {
        self.allowances.get(&(asset, owner, spender)).copied().unwrap_or_default()
    }

    /// Log a call and fail it if a matching failure was injected
    fn begin(&mut self, call: LedgerCall) -> Result<(), LedgerError> {
        let (op, asset) = (call.op(), call.asset());
        self.calls.push(call);

        let mut fired = None;
        for (idx, (fail_op, fail_asset, skip)) in self.failures.iter_mut().enumerate() {
            if (*fail_op, *fail_asset) != (op, asset) {
                continue;
            }

            match skip.checked_sub(1) {
                Some(remaining) => *skip = remaining,
                None => fired = fired.or(Some(idx)),
            }
        }

        match fired {
            Some(idx) => {
                self.failures.remove(idx);
                Err(LedgerError::backend(format!("injected {op:?} failure on {asset}")))
            },
            None => Ok(()),
        }
    }

    /// Move a balance, checking it first
    fn move_balance(
        &mut self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance(asset, from);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                owner: from,
                needed: amount,
                available,
            });
        }

        self.balances.insert((asset, from), available - amount);
        let to_balance = self.balance(asset, to);
        self.balances.insert((asset, to), to_balance + amount);
        Ok(())
    }
}

/// A shared in-memory ledger
///
/// Clones share state; operations are serialized behind a single lock
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    /// The shared state
    inner: Arc<Mutex<LedgerState>>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle acting for `account`
    pub fn account(&self, account: Address) -> LedgerAccount {
        LedgerAccount { ledger: self.clone(), account }
    }

    /// Credit `amount` of `asset` to `owner`
    pub fn mint(&self, asset: AssetId, owner: Address, amount: Amount) {
        let mut state = self.lock();
        let balance = state.balance(asset, owner);
        state.balances.insert((asset, owner), balance + amount);
    }

    /// Set an allowance directly, without logging a call
    pub fn set_allowance(&self, asset: AssetId, owner: Address, spender: Address, amount: Amount) {
        self.lock().allowances.insert((asset, owner, spender), amount);
    }

    /// The balance of `asset` held by `owner`
    pub fn balance(&self, asset: AssetId, owner: Address) -> Amount {
        self.lock().balance(asset, owner)
    }

    /// The allowance `owner` has granted `spender` over `asset`
    pub fn allowance_of(&self, asset: AssetId, owner: Address, spender: Address) -> Amount {
        self.lock().allowance(asset, owner, spender)
    }

    /// Fail the next `op` on `asset` with a backend error
    pub fn fail_next(&self, op: LedgerOp, asset: AssetId) {
        self.fail_after(op, asset, 0);
    }

    /// Fail the `op` on `asset` that follows the next `skip` matching calls
    pub fn fail_after(&self, op: LedgerOp, asset: AssetId, skip: usize) {
        self.lock().failures.push((op, asset, skip));
    }

    /// Every mutating call attempted so far
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.lock().calls.clone()
    }

    /// The mutating calls attempted by one account
    pub fn calls_by(&self, account: Address) -> Vec<LedgerCall> {
        self.calls().into_iter().filter(|call| call.account() == account).collect()
    }

    /// Forget the calls made so far
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Lock the ledger state
    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.inner.lock().expect("ledger lock poisoned")
    }
}

/// A handle to an [`InMemoryLedger`] acting for one account
#[derive(Clone)]
pub struct LedgerAccount {
    /// The shared ledger
    ledger: InMemoryLedger,
    /// The account the handle acts for
    account: Address,
}

#[async_trait]
impl AssetLedger for LedgerAccount {
    fn account(&self) -> Address {
        self.account
    }

    async fn transfer(&self, asset: AssetId, to: Address, amount: Amount) -> Result<(), LedgerError> {
        let mut state = self.ledger.lock();
        state.begin(LedgerCall::Transfer { account: self.account, asset, to, amount })?;
        state.move_balance(asset, self.account, to, amount)
    }

    async fn transfer_from(
        &self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut state = self.ledger.lock();
        let spender = self.account;
        state.begin(LedgerCall::TransferFrom { account: spender, asset, from, to, amount })?;

        let allowance = state.allowance(asset, from, spender);
        if allowance < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                needed: amount,
                available: allowance,
            });
        }

        state.move_balance(asset, from, to, amount)?;
        // An unlimited allowance is never spent down
        if allowance != Amount::MAX {
            state.allowances.insert((asset, from, spender), allowance - amount);
        }
        Ok(())
    }

    async fn approve(
        &self,
        asset: AssetId,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut state = self.ledger.lock();
        state.begin(LedgerCall::Approve { account: self.account, asset, spender, amount })?;
        state.allowances.insert((asset, self.account, spender), amount);
        Ok(())
    }

    async fn balance_of(&self, asset: AssetId, owner: Address) -> Result<Amount, LedgerError> {
        Ok(self.ledger.balance(asset, owner))
    }

    async fn allowance(
        &self,
        asset: AssetId,
        owner: Address,
        spender: Address,
    ) -> Result<Amount, LedgerError> {
        Ok(self.ledger.allowance_of(asset, owner, spender))
    }
}
