//! The exact-input protocols: spend a fixed input, forward whatever the
//! router yields
//!
//! 1. take custody of the exact input from the caller
//! 2. approve the router for exactly that input
//! 3. execute the trade, delivering output into custody
//! 4. forward the output to the caller

use std::fmt::{Display, Formatter, Result as FmtResult};

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{
    Amount, AssetId,
    outcome::SwapOutcome,
    request::{ExactInputRequest, ExactInputSingleRequest, SwapKind},
    router_params::{ExactInputParams, ExactInputSingleParams},
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

/// A request that spends an exact input through the router
#[async_trait]
pub trait ExactInputSwap: Send + Sync {
    /// The router entrypoint the request targets
    const KIND: SwapKind;

    /// The asset spent
    fn input_asset(&self) -> AssetId;
    /// The asset received
    fn output_asset(&self) -> AssetId;
    /// The exact amount spent
    fn amount_in(&self) -> Amount;
    /// Execute the request on the router, delivering to `recipient`, and
    /// return the output realized
    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError>;
}

#[async_trait]
impl ExactInputSwap for ExactInputSingleRequest {
    const KIND: SwapKind = SwapKind::ExactInputSingle;

    fn input_asset(&self) -> AssetId {
        self.input_asset
    }

    fn output_asset(&self) -> AssetId {
        self.output_asset
    }

    fn amount_in(&self) -> Amount {
        self.amount_in
    }

    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError> {
        router.exact_input_single(ExactInputSingleParams::from_request(self, recipient)).await
    }
}

#[async_trait]
impl ExactInputSwap for ExactInputRequest {
    const KIND: SwapKind = SwapKind::ExactInput;

    fn input_asset(&self) -> AssetId {
        ExactInputRequest::input_asset(self)
    }

    fn output_asset(&self) -> AssetId {
        ExactInputRequest::output_asset(self)
    }

    fn amount_in(&self) -> Amount {
        self.amount_in
    }

    async fn execute<R: SwapRouter + ?Sized>(
        &self,
        router: &R,
        recipient: Address,
    ) -> Result<Amount, RouterError> {
        router.exact_input(ExactInputParams::from_request(self, recipient)).await
    }
}

// --------------
// | Task State |
// --------------

/// The state of an exact-input swap
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExactInputTaskState {
    /// The task is awaiting scheduling
    Pending,
    /// The task is pulling the caller's input into custody
    AcquiringCustody,
    /// The task is approving the router to spend the custodied input
    GrantingAllowance,
    /// The task is executing the trade on the router
    ExecutingSwap,
    /// The task is forwarding the realized output to the caller
    ForwardingProceeds {
        /// The output the router delivered
        amount_out: Amount,
    },
    /// The task has finished
    Completed {
        /// The output forwarded to the caller
        amount_out: Amount,
    },
}

impl Display for ExactInputTaskState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ForwardingProceeds { .. } => write!(f, "ForwardingProceeds"),
            Self::Completed { .. } => write!(f, "Completed"),
            _ => write!(f, "{self:?}"),
        }
    }
}

// -------------------
// | Task Definition |
// -------------------

/// Drives an exact-input request through custody, approval, execution, and
/// forwarding
pub struct ExactInputTask<L, R, S> {
    /// The collaborators and compensation log of the invocation
    ctx: SwapContext<L, R>,
    /// The request being executed
    swap: S,
    /// The state of the task
    task_state: ExactInputTaskState,
}

impl<L, R, S> ExactInputTask<L, R, S> {
    /// Constructor
    pub fn new(ctx: SwapContext<L, R>, swap: S) -> Self {
        Self { ctx, swap, task_state: ExactInputTaskState::Pending }
    }
}

#[async_trait]
impl<L, R, S> Task for ExactInputTask<L, R, S>
where
    L: AssetLedger + 'static,
    R: SwapRouter + 'static,
    S: ExactInputSwap + 'static,
{
    type State = ExactInputTaskState;

    async fn step(&mut self) -> Result<(), SwapError> {
        let input = self.swap.input_asset();
        let output = self.swap.output_asset();
        let amount_in = self.swap.amount_in();

        match self.state() {
            ExactInputTaskState::Pending => {
                self.task_state = ExactInputTaskState::AcquiringCustody;
            },
            ExactInputTaskState::AcquiringCustody => {
                self.ctx.acquire_custody(input, amount_in).await?;
                self.task_state = ExactInputTaskState::GrantingAllowance;
            },
            ExactInputTaskState::GrantingAllowance => {
                self.ctx.grant_allowance(input, amount_in).await?;
                self.task_state = ExactInputTaskState::ExecutingSwap;
            },
            ExactInputTaskState::ExecutingSwap => {
                let recipient = self.ctx.custodian();
                let amount_out = self.swap.execute(self.ctx.router(), recipient).await?;
                self.ctx.settle_full_spend(input, amount_in, output, amount_out);
                self.task_state = ExactInputTaskState::ForwardingProceeds { amount_out };
            },
            ExactInputTaskState::ForwardingProceeds { amount_out } => {
                self.ctx.forward_proceeds(output, amount_out).await?;
                self.task_state = ExactInputTaskState::Completed { amount_out };
            },
            ExactInputTaskState::Completed { .. } => {
                return Err(SwapError::invariant_violation("step() called in state Completed"));
            },
        }

        Ok(())
    }

    // Return custody and revoke the allowance if the task fails
    async fn cleanup(&mut self) -> Result<(), LedgerError> {
        self.ctx.unwind().await
    }

    fn completed(&self) -> bool {
        matches!(self.task_state, ExactInputTaskState::Completed { .. })
    }

    fn state(&self) -> Self::State {
        self.task_state.clone()
    }

    fn name(&self) -> String {
        S::KIND.to_string()
    }

    fn outcome(&self) -> Option<SwapOutcome> {
        match self.task_state {
            ExactInputTaskState::Completed { amount_out } => Some(SwapOutcome {
                kind: S::KIND,
                input_asset: self.swap.input_asset(),
                output_asset: self.swap.output_asset(),
                amount_in: self.swap.amount_in(),
                amount_out,
                refunded: Amount::ZERO,
            }),
            _ => None,
        }
    }
}
