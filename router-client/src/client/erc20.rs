//! An asset ledger over ERC20 token contracts

use alloy_contract::CallDecoder;
use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{Amount, AssetId};
use orchestrator::{error::LedgerError, traits::AssetLedger};
use tracing::debug;

use super::{RouterClient, SwapCallBuilder, SwapProvider};
use crate::{abi::IERC20::IERC20Instance, errors::RouterClientError};

/// A ledger moving ERC20 tokens on behalf of the router client's signer
#[derive(Clone)]
pub struct Erc20Ledger {
    /// The client whose provider and signer the ledger uses
    client: RouterClient,
}

impl Erc20Ledger {
    /// Constructor
    pub fn new(client: RouterClient) -> Self {
        Self { client }
    }

    /// Get the ticker of a given erc20 token
    pub async fn ticker(&self, asset: AssetId) -> Result<String, RouterClientError> {
        self.token(asset).symbol().call().await.map_err(RouterClientError::erc20)
    }

    /// Get the decimals of a given erc20 token
    pub async fn decimals(&self, asset: AssetId) -> Result<u8, RouterClientError> {
        self.token(asset).decimals().call().await.map_err(RouterClientError::erc20)
    }

    /// Get an instance of an erc20 contract client
    fn token(&self, asset: AssetId) -> IERC20Instance<SwapProvider> {
        IERC20Instance::new(asset, self.client.provider().clone())
    }

    /// Simulate a token call, failing if it reports `false`, then submit it
    async fn submit<'a, C>(
        &self,
        op: &'static str,
        asset: AssetId,
        call: SwapCallBuilder<'a, C>,
    ) -> Result<(), LedgerError>
    where
        C: CallDecoder<CallOutput = bool> + Send + Sync,
    {
        let call = call.from(self.client.account());
        if !self.client.simulate(&call).await? {
            return Err(LedgerError::Rejected { op, asset });
        }

        let receipt = self.client.send_tx(call).await?;
        debug!("{op} of {asset} settled in tx {:#x}", receipt.transaction_hash);
        Ok(())
    }

    /// Check that `owner` holds at least `amount` of `asset`
    async fn check_balance(
        &self,
        asset: AssetId,
        owner: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(asset, owner).await?;
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                asset,
                owner,
                needed: amount,
                available,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AssetLedger for Erc20Ledger {
    fn account(&self) -> Address {
        self.client.account()
    }

    async fn transfer(&self, asset: AssetId, to: Address, amount: Amount) -> Result<(), LedgerError> {
        self.check_balance(asset, self.account(), amount).await?;

        let token = self.token(asset);
        self.submit("transfer", asset, token.transfer(to, amount)).await
    }

    async fn transfer_from(
        &self,
        asset: AssetId,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let spender = self.account();
        let available = self.allowance(asset, from, spender).await?;
        if available < amount {
            return Err(LedgerError::InsufficientAllowance {
                asset,
                owner: from,
                spender,
                needed: amount,
                available,
            });
        }
        self.check_balance(asset, from, amount).await?;

        let token = self.token(asset);
        self.submit("transferFrom", asset, token.transferFrom(from, to, amount)).await
    }

    async fn approve(
        &self,
        asset: AssetId,
        spender: Address,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let token = self.token(asset);
        self.submit("approve", asset, token.approve(spender, amount)).await
    }

    async fn balance_of(&self, asset: AssetId, owner: Address) -> Result<Amount, LedgerError> {
        let balance = self.token(asset).balanceOf(owner).call().await;
        Ok(balance.map_err(RouterClientError::erc20)?)
    }

    async fn allowance(
        &self,
        asset: AssetId,
        owner: Address,
        spender: Address,
    ) -> Result<Amount, LedgerError> {
        let allowance = self.token(asset).allowance(owner, spender).call().await;
        Ok(allowance.map_err(RouterClientError::erc20)?)
    }
}
