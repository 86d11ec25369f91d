//! The collaborators a swap protocol composes
//!
//! Both traits describe handles bound to an identity: an [`AssetLedger`]
//! moves assets on behalf of [`AssetLedger::account`], and a [`SwapRouter`]
//! pulls input from the account that calls it. The orchestrator's custody
//! address is the ledger handle's account.

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{
    Amount, AssetId,
    router_params::{
        ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
    },
};

use crate::error::{LedgerError, RouterError};

/// The asset transfer primitive
///
/// Every mutating call either applies in full or fails; none may silently
/// no-op on an insufficient balance or allowance
#[async_trait]
pub trait AssetLedger: Send + Sync {
    /// The account this handle acts for
    fn account(&self) -> Address;

    /// Move `amount` of `asset` from this handle's account to `to`
    async fn transfer(&self, asset: AssetId, to: Address, amount: Amount)
    -> Result<(), LedgerError>;

    /// Move `amount` of `asset` from `from` to `to`, spending the allowance
    /// `from` granted this handle's account
    async fn transfer_from(
        &self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Set the allowance `spender` holds over this handle's `asset`
    async fn approve(
        &self,
        asset: AssetId,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// The balance of `asset` held by `owner`
    async fn balance_of(&self, asset: AssetId, owner: Address) -> Result<Amount, LedgerError>;

    /// The allowance `owner` has granted `spender` over `asset`
    async fn allowance(
        &self,
        asset: AssetId,
        owner: Address,
        spender: Address,
    ) -> Result<Amount, LedgerError>;
}

/// The execution engine that prices and settles trades against pools
///
/// The router pulls input from its caller via the allowance the caller
/// granted, and delivers output to the `recipient` of the parameters
#[async_trait]
pub trait SwapRouter: Send + Sync {
    /// The address the caller must approve to spend its input
    fn address(&self) -> Address;

    /// Spend an exact input through one pool, returning the output realized
    async fn exact_input_single(&self, params: ExactInputSingleParams)
    -> Result<Amount, RouterError>;

    /// Receive an exact output through one pool, returning the input spent
    async fn exact_output_single(
        &self,
        params: ExactOutputSingleParams,
    ) -> Result<Amount, RouterError>;

    /// Spend an exact input along a forward-encoded route, returning the
    /// output realized
    async fn exact_input(&self, params: ExactInputParams) -> Result<Amount, RouterError>;

    /// Receive an exact output along a reverse-encoded route, returning the
    /// input spent
    async fn exact_output(&self, params: ExactOutputParams) -> Result<Amount, RouterError>;
}
