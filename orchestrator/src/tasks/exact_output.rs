//! The exact-output protocols: receive a fixed output, spending at most a
//! bounded input
//!
//! 1. take custody of the maximum input from the caller
//! 2. approve the router for the maximum input
//! 3. execute the trade, delivering the exact output into custody
//! 4. if the router spent less than the maximum, revoke its residual
//!    allowance and refund the difference
//! 5. forward the output to the caller

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{
    Amount, AssetId,
    outcome::SwapOutcome,
    request::{ExactOutputRequest, ExactOutputSingleRequest, SwapKind},
    router_params::{ExactOutputParams, ExactOutputSingleParams},
};

use super::SwapContext;
use crate::{
    driver::Task,
    error::{LedgerError, RouterError, SwapError},
    traits::{AssetLedger, SwapRouter},
};

// --------------------
// | Request Bindings |
// --------------------

/// A request that receives an exact output through the router
#[async_trait]
pub trait ExactOutputSwap: Send + Sync {
    /// The router entrypoint the request targets
    const KIND: SwapKind;

    /// The asset spent
    fn input_asset(&self) -> AssetId;
    /// The asset received
    fn output_asset(&self) -> AssetId;
    /// The exact amount received
    fn amount_out(&self) -> Amount;
    /// The most the caller will spend
    fn max_amount_in(&self) -> Amount;
    /// Execute the request on the router, delivering to `recipient`, and
    /// return the input spent
    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError>;
}

#[async_trait]
impl ExactOutputSwap for ExactOutputSingleRequest {
    const KIND: SwapKind = SwapKind::ExactOutputSingle;

    fn input_asset(&self) -> AssetId {
        self.input_asset
    }

    fn output_asset(&self) -> AssetId {
        self.output_asset
    }

    fn amount_out(&self) -> Amount {
        self.amount_out
    }

    fn max_amount_in(&self) -> Amount {
        self.max_amount_in
    }

    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError> {
        router.exact_output_single(ExactOutputSingleParams::from_request(self, recipient)).await
    }
}

#[async_trait]
impl ExactOutputSwap for ExactOutputRequest {
    const KIND: SwapKind = SwapKind::ExactOutput;

    fn input_asset(&self) -> AssetId {
        ExactOutputRequest::input_asset(self)
    }

    fn output_asset(&self) -> AssetId {
        ExactOutputRequest::output_asset(self)
    }

    fn amount_out(&self) -> Amount {
        self.amount_out
    }

    fn max_amount_in(&self) -> Amount {
        self.max_amount_in
    }

    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError> {
        router.exact_output(ExactOutputParams::from_request(self, recipient)).await
    }
}

// --------------
// | Task State |
// --------------

/// The state of an exact-output swap
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExactOutputTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is pulling the caller's maximum input into custody
    AcquiringCustody,
    /// The task is approving the router to spend the custodied input
    GrantingAllowance,
    /// The task is executing the trade on the router
    ExecutingSwap,
    /// The task is revoking the residual allowance and refunding unspent
    /// input
    Reconciling {
        /// The input the router spent
        amount_in: Amount,
        /// The input left in custody
        leftover: Amount,
    },
    /// The task is forwarding the output to the caller
    ForwardingProceeds {
        /// The input the router spent
        amount_in: Amount,
    },
    /// The task has finished
    Completed {
        /// The input the router spent
        amount_in: Amount,
    },
}

impl Display for ExactOutputTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Reconciling { .. } => write!(f, "Reconciling"),
            Self::ForwardingProceeds { .. } => write!(f, "ForwardingProceeds"),
            Self::Completed { .. } => write!(f, "Completed"),
            _ => write!(f, "{self:?}"),
        }
    }
}

// -------------------
// | Task Definition |
// -------------------

/// Drives an exact-output request through custody, approval, execution,
/// reconciliation, and forwarding
pub struct ExactOutputTask<L, R, S> {
    /// The collaborators and compensation log of the invocation
    ctx: SwapContext<L, R>,
    /// The request being executed
    swap: S,
    /// The state of the task
    task_state: ExactOutputTaskState,
}

impl<L, R, S> ExactOutputTask<L, R, S> {
    /// Constructor
    pub fn new(ctx: SwapContext<L, R>, swap: S) -> Self {
        Self { ctx, swap, task_state: ExactOutputTaskState::Pending }
    }
}

#[async_trait]
impl<L, R, S> Task for ExactOutputTask<L, R, S>
where
    L: AssetLedger + 'static,
    R: SwapRouter + 'static,
    S: ExactOutputSwap + 'static,
{
    type State = ExactOutputTaskState;

    async fn step(&mut self) -> Result<(), SwapError> {
        let input = self.swap.input_asset();
        let output = self.swap.output_asset();
        let max_amount_in = self.swap.max_amount_in();

        match self.state() {
            ExactOutputTaskState::Pending => {
                self.task_state = ExactOutputTaskState::AcquiringCustody;
            },
            ExactOutputTaskState::AcquiringCustody => {
                self.ctx.acquire_custody(input, max_amount_in).await?;
                self.task_state = ExactOutputTaskState::GrantingAllowance;
            },
            ExactOutputTaskState::GrantingAllowance => {
                self.ctx.grant_allowance(input, max_amount_in).await?;
                self.task_state = ExactOutputTaskState::ExecutingSwap;
            },
            ExactOutputTaskState::ExecutingSwap => {
                let recipient = self.ctx.custodian();
                let amount_in = self.swap.execute(self.ctx.router(), recipient).await?;
                let leftover = self.ctx.settle_partial_spend(
                    input,
                    max_amount_in,
                    amount_in,
                    output,
                    self.swap.amount_out(),
                )
                .await?;
                self.task_state = ExactOutputTaskState::Reconciling { amount_in, leftover };
            },
            ExactOutputTaskState::Reconciling { amount_in, leftover } => {
                self.ctx.reconcile(input, leftover).await?;
                self.task_state = ExactOutputTaskState::ForwardingProceeds { amount_in };
            },
            ExactOutputTaskState::ForwardingProceeds { amount_in } => {
                self.ctx.forward_proceeds(output, self.swap.amount_out()).await?;
                self.task_state = ExactOutputTaskState::Completed { amount_in };
            },
            ExactOutputTaskState::Completed { .. } => {
                return Err(SwapError::invariant_violation("step() called in state Completed"));
            },
        }

        Ok(())
    }

    // Return custody, revoke the allowance, and deliver any settled output
    // if the task fails
    async fn cleanup(&mut self) -> Result<(), LedgerError> {
        self.ctx.unwind().await
    }

    fn completed(&self) -> bool {
        matches!(self.task_state, ExactOutputTaskState::Completed { .. })
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }

    fn name(&self) -> String {
        S::KIND.to_string()
    }

    fn outcome(&self) -> Option<SwapOutcome> {
        match self.task_state {
            ExactOutputTaskState::Completed { amount_in } => Some(SwapOutcome {
                kind: S::KIND,
                input_asset: self.swap.input_asset(),
                output_asset: self.swap.output_asset(),
                amount_in,
                amount_out: self.swap.amount_out(),
                refunded: self.swap.max_amount_in().saturating_sub(amount_in),
            }),
            _ => None,
        }
    }
}
