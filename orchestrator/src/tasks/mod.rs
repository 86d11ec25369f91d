//! The swap protocols, expressed as tasks the driver steps to completion
//!
//! The four router entrypoints share two state machines. Exact-input swaps
//! spend their full custody, so they settle by forwarding proceeds alone.
//! Exact-output swaps may leave input unspent, so they reconcile before
//! forwarding. The [`ExactInputSwap`] and [`ExactOutputSwap`] traits bind each
//! request shape to its router entrypoint.

use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{error, info};

use common::types::{Amount, AssetId};

use crate::{
    compensation::{Compensation, CompensationLog},
    error::{LedgerError, SwapError},
    traits::{AssetLedger, SwapRouter},
};

pub mod exact_input;
pub mod exact_output;

pub use exact_input::{ExactInputSwap, ExactInputTask, ExactInputTaskState};
pub use exact_output::{ExactOutputSwap, ExactOutputTask, ExactOutputTaskState};

// ----------------
// | Swap Context |
// ----------------

/// The collaborators and bookkeeping a single swap invocation works with
pub struct SwapContext<L, R> {
    /// The ledger handle acting for the orchestrator's custody account
    ledger: Arc<L>,
    /// The router executing the trade
    router: Arc<R>,
    /// The authenticated caller the swap is executed for
    caller: Address,
    /// The compensations outstanding for this invocation
    log: CompensationLog,
}

impl<L: AssetLedger, R: SwapRouter> SwapContext<L, R> {
    /// Constructor
    pub fn new(ledger: Arc<L>, router: Arc<R>, caller: Address) -> Self {
        Self { ledger, router, caller, log: CompensationLog::new() }
    }

    /// The orchestrator's custody account
    pub fn custodian(&self) -> Address {
        self.ledger.account()
    }

    /// The caller the swap is executed for
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// The router executing the trade
    pub fn router(&self) -> &R {
        &self.router
    }

    /// The outstanding compensations
    pub fn log(&self) -> &CompensationLog {
        &self.log
    }

    /// Pull `amount` of `asset` from the caller into custody
    pub async fn acquire_custody(&mut self, asset: AssetId, amount: Amount) -> Result<(), SwapError> {
        let custodian = self.custodian();
        self.ledger
            .transfer_from(asset, self.caller, custodian, amount)
            .await
            .map_err(SwapError::Custody)?;

        let compensation = self.return_to_caller(asset, amount);
        self.log.record(compensation);
        Ok(())
    }

    /// Approve the router to spend `amount` of the custodied `asset`
    pub async fn grant_allowance(&mut self, asset: AssetId, amount: Amount) -> Result<(), SwapError> {
        let spender = self.router.address();
        self.ledger.approve(asset, spender, amount).await.map_err(SwapError::AllowanceGrant)?;

        self.log.record(Compensation::RevokeAllowance { asset, spender });
        Ok(())
    }

    /// Record that the router consumed the full custody and allowance of
    /// `input`, and delivered `amount_out` of `output` into custody
    pub fn settle_full_spend(
        &mut self,
        input: AssetId,
        custodied: Amount,
        output: AssetId,
        amount_out: Amount,
    ) {
        let revoke = self.revoke_router(input);
        let custody = self.return_to_caller(input, custodied);
        let proceeds = self.return_to_caller(output, amount_out);

        let Some(leftover) = custodied.checked_sub(amount_in) else {
            match self.ledger.balance_of(input, self.custodian()).await {
                Ok(held) => {
                    let held = self.return_to_caller(input, held);
                    self.log.replace(&custody, held);
                },
                Err(e) => error!("failed to read custody of {input} after overspend: {e}"),
            }
            self.log.record(proceeds);

            return Err(SwapError::invariant_violation(format!(
                "router spent {amount_in} of {input}, more than the {custodied} approved"
            )));
        };

        if leftover.is_zero() {
            self.log.discharge(&revoke);
        }
        let unspent = self.return_to_caller(input, leftover);
        self.log.replace(&custody, unspent);
        self.log.record(proceeds);

        Ok(leftover)
    }

    /// Revoke the router's residual allowance over `asset` and refund the
    /// unspent `leftover` to the caller
    ///
    /// Makes no ledger calls when nothing is left over. Each entry is
    /// discharged only once its action succeeds, so a failed step is retried
    /// by the unwind
    pub async fn reconcile(&mut self, asset: AssetId, leftover: Amount) -> Result<(), SwapError> {
        if leftover.is_zero() {
            return Ok(());
        }

        let revoke = self.revoke_router(asset);
        revoke.execute(self.ledger.as_ref()).await.map_err(SwapError::Reconciliation)?;
        self.log.discharge(&revoke);

        let refund = self.return_to_caller(asset, leftover);
        refund.execute(self.ledger.as_ref()).await.map_err(SwapError::Reconciliation)?;
        self.log.discharge(&refund);

        info!("refunded {leftover} of {asset} to {}", self.caller);
        Ok(())
    }

    /// Forward `amount` of `asset` from custody to the caller
    ///
    /// The forward is attempted once; on failure the amount stays in custody
    /// and is reported in the error
    pub async fn forward_proceeds(&mut self, asset: AssetId, amount: Amount) -> Result<(), SwapError> {
        let forward = self.return_to_caller(asset, amount);
        self.log.discharge(&forward);
        if amount.is_zero() {
            return Ok(());
        }

        forward
            .execute(self.ledger.as_ref())
            .await
            .map_err(|source| SwapError::Forwarding { asset, amount, source })
    }

    /// Run every outstanding compensation
    pub async fn unwind(&mut self) -> Result<(), LedgerError> {
        self.log.unwind(self.ledger.as_ref()).await
    }

    /// The compensation returning custodied `asset` to the caller
    fn return_to_caller(&self, asset: AssetId, amount: Amount) -> Compensation {
        Compensation::ReturnCustody { asset, to: self.caller, amount }
    }

    /// The compensation revoking the router's allowance over `asset`
    fn revoke_router(&self, asset: AssetId) -> Compensation {
        Compensation::RevokeAllowance { asset, spender: self.router.address() }
    }
}
