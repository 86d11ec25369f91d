//! A per-invocation log of compensating actions
//!
//! As each step of a swap commits an effect that has an inverse, the step
//! records the inverse here. When the router consumes an effect (spending the
//! custodied input, using up the allowance) the corresponding entry is
//! discharged. On failure the remaining entries are executed newest first,
//! returning the orchestrator's custody and allowances to where they began.

use std::fmt::Display;

use alloy_primitives::Address;
use common::types::{Amount, AssetId};
use tracing::{error, warn};

use crate::{error::LedgerError, traits::AssetLedger};

/// An action that undoes a committed effect
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Compensation {
    /// Return an asset held by the orchestrator to its owner
    ReturnCustody {
        /// The asset held
        asset: AssetId,
        /// The owner to return it to
        to: Address,
        /// The amount held
        amount: Amount,
    },
    /// Reset an allowance the orchestrator granted to zero
    RevokeAllowance {
        /// The asset approved
        asset: AssetId,
        /// The approved spender
        spender: Address,
    },
}

impl Compensation {
    /// Execute the compensating action against a ledger
    pub async fn execute<L: AssetLedger + ?Sized>(&self, ledger: &L) -> Result<(), LedgerError> {
        match *self {
            Compensation::ReturnCustody { asset, to, amount } => {
                ledger.transfer(asset, to, amount).await
            },
            Compensation::RevokeAllowance { asset, spender } => {
                ledger.approve(asset, spender, Amount::ZERO).await
            },
        }
    }
}

impl Display for Compensation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compensation::ReturnCustody { asset, to, amount } => {
                write!(f, "return {amount} of {asset} to {to}")
            },
            Compensation::RevokeAllowance { asset, spender } => {
                write!(f, "revoke {spender}'s allowance over {asset}")
            },
        }
    }
}

/// Whether a compensation has nothing to undo
fn is_noop(compensation: &Compensation) -> bool {
    matches!(compensation, Compensation::ReturnCustody { amount, .. } if amount.is_zero())
}

/// The stack of outstanding compensations for one swap invocation
#[derive(Clone, Debug, Default)]
pub struct CompensationLog {
    /// Outstanding compensations, oldest first
    entries: Vec<Compensation>,
}

impl CompensationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any compensation is outstanding
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The outstanding compensations, oldest first
    pub fn entries(&self) -> &[Compensation] {
        &self.entries
    }

    /// Record the inverse of an effect that just committed
    ///
    /// A zero-amount custody return has no effect to undo and is not recorded
    pub fn record(&mut self, compensation: Compensation) {
        if is_noop(&compensation) {
            return;
        }

        self.entries.push(compensation);
    }

    /// Remove an entry whose effect has been consumed or settled
    ///
    /// Returns whether a matching entry was outstanding
    pub fn discharge(&mut self, compensation: &Compensation) -> bool {
        match self.entries.iter().rposition(|entry| entry == compensation) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            },
            None => false,
        }
    }

    /// Replace an outstanding entry in place, keeping its unwind position
    ///
    /// A zero-amount custody return replacing an entry discharges it instead
    pub fn replace(&mut self, old: &Compensation, new: Compensation) -> bool {
        if is_noop(&new) {
            return self.discharge(old);
        }

        match self.entries.iter_mut().rev().find(|entry| *entry == old) {
            Some(entry) => {
                *entry = new;
                true
            },
            None => false,
        }
    }

    /// Execute every outstanding compensation, newest first
    ///
    /// A failing compensation does not stop the unwind; the first failure is
    /// returned once every entry has been attempted
    pub async fn unwind<L: AssetLedger + ?Sized>(&mut self, ledger: &L) -> Result<(), LedgerError> {
        let mut first_err = None;
        while let Some(compensation) = self.entries.pop() {
            warn!("compensating: {compensation}");
            if let Err(e) = compensation.execute(ledger).await {
                error!("compensation failed ({compensation}): {e}");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
