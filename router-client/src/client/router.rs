//! The router client's implementation of the orchestrator's router interface
//!
//! Each trade is simulated first, surfacing reverts before gas is spent, and
//! then submitted. The amount reported is the one the mined transaction
//! realized, read from the token `Transfer` events in its receipt

use alloy::rpc::types::TransactionReceipt;
use alloy_contract::CallDecoder;
use alloy_primitives::{Address, Log};
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use common::types::{
    Amount, AssetId,
    router_params::{
        ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
    },
};
use orchestrator::{error::RouterError, traits::SwapRouter};
use tracing::{info, warn};

use super::{RouterClient, SwapCallBuilder};
use crate::{
    abi::{IERC20::Transfer, ISwapRouter},
    errors::RouterClientError,
};

/// The token movement a trade's counter-amount is read from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Leg {
    /// The input `token` pulled out of `payer`
    Paid {
        /// The token spent
        token: AssetId,
        /// The account the router pulled from
        payer: Address,
    },
    /// The output `token` delivered to `recipient`
    Received {
        /// The token received
        token: AssetId,
        /// The account the router delivered to
        recipient: Address,
    },
}

impl Leg {
    /// The token the leg moves
    fn token(&self) -> AssetId {
        match *self {
            Leg::Paid { token, .. } | Leg::Received { token, .. } => token,
        }
    }

    /// Whether a transfer of the leg's token belongs to the leg
    fn matches(&self, from: Address, to: Address) -> bool {
        match *self {
            Leg::Paid { payer, .. } => from == payer,
            Leg::Received { recipient, .. } => to == recipient,
        }
    }
}

/// Sum the transfers belonging to `leg` across a transaction's logs
fn settled_amount<'a, I>(logs: I, leg: Leg) -> Result<Amount, RouterClientError>
where
    I: IntoIterator<Item = &'a Log>,
{
    let mut total = Amount::ZERO;
    for log in logs {
        if log.address != leg.token() || log.topics().first() != Some(&Transfer::SIGNATURE_HASH) {
            continue;
        }

        let event = Transfer::decode_log(log)?;
        if leg.matches(event.from, event.to) {
            total = total.saturating_add(event.value);
        }
    }

    Ok(total)
}

impl RouterClient {
    /// Simulate a router call, submit it, and return the amount the mined
    /// transaction moved along `leg`
    async fn simulate_and_send<'a, C>(
        &self,
        call: SwapCallBuilder<'a, C>,
        leg: Leg,
    ) -> Result<Amount, RouterClientError>
    where
        C: CallDecoder<CallOutput = Amount> + Send + Sync,
    {
        let call = call.from(self.account());
        let simulated = self.simulate(&call).await?;
        let receipt = self.send_tx(call).await?;
        info!("swap settled in tx {:#x}", receipt.transaction_hash);

        let realized = realized_amount(&receipt, leg)?;
        if realized != simulated {
            warn!("swap realized {realized} of {}, simulated {simulated}", leg.token());
        }

        Ok(realized)
    }

    /// The leg paying the input out of the signer's account
    fn paid(&self, token: AssetId) -> Leg {
        Leg::Paid { token, payer: self.account() }
    }
}

/// The amount a mined transaction moved along `leg`
fn realized_amount(receipt: &TransactionReceipt, leg: Leg) -> Result<Amount, RouterClientError> {
    let logs: Vec<Log> = receipt.logs().iter().cloned().map(Log::from).collect();
    settled_amount(&logs, leg)
}

#[async_trait]
impl SwapRouter for RouterClient {
    fn address(&self) -> Address {
        self.router_addr()
    }

    async fn exact_input_single(
        &self,
        params: ExactInputSingleParams,
    ) -> Result<Amount, RouterError> {
        let leg = Leg::Received { token: params.output_asset, recipient: params.recipient };
        let params = ISwapRouter::ExactInputSingleParams::try_from(&params)
            .map_err(RouterClientError::from)?;
        let amount_out = self.simulate_and_send(self.router().exactInputSingle(params), leg).await?;
        Ok(amount_out)
    }

    async fn exact_output_single(
        &self,
        params: ExactOutputSingleParams,
    ) -> Result<Amount, RouterError> {
        let leg = self.paid(params.input_asset);
        let params = ISwapRouter::ExactOutputSingleParams::try_from(&params)
            .map_err(RouterClientError::from)?;
        let amount_in = self.simulate_and_send(self.router().exactOutputSingle(params), leg).await?;
        Ok(amount_in)
    }

    async fn exact_input(&self, params: ExactInputParams) -> Result<Amount, RouterError> {
        let leg =
            Leg::Received { token: params.route.output_asset(), recipient: params.recipient };
        let params = ISwapRouter::ExactInputParams::from(&params);
        let amount_out = self.simulate_and_send(self.router().exactInput(params), leg).await?;
        Ok(amount_out)
    }

    async fn exact_output(&self, params: ExactOutputParams) -> Result<Amount, RouterError> {
        let leg = self.paid(params.route.input_asset());
        let params = ISwapRouter::ExactOutputParams::from(&params);
        let amount_in = self.simulate_and_send(self.router().exactOutput(params), leg).await?;
        Ok(amount_in)
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::{U256, address};

    use super::*;
    use crate::abi::IERC20::Approval;

    /// The signer's account
    const ACCOUNT: Address = address!("0x00000000000000000000000000000000000000c0");
    /// A liquidity pool
    const POOL: Address = address!("0x00000000000000000000000000000000000000b0");
    /// The input token
    const TOKEN_IN: Address = address!("0x1111111111111111111111111111111111111111");
    /// The output token
    const TOKEN_OUT: Address = address!("0x2222222222222222222222222222222222222222");

    /// A `Transfer` log emitted by `token`
    fn transfer(token: Address, from: Address, to: Address, value: u64) -> Log {
        let event = Transfer { from, to, value: U256::from(value) };
        Log { address: token, data: event.encode_log_data() }
    }

    /// Tests reading the output delivered to the recipient
    #[test]
    fn test_received_amount() {
        let logs = vec![
            transfer(TOKEN_IN, ACCOUNT, POOL, 1_000),
            transfer(TOKEN_OUT, POOL, ACCOUNT, 1_980),
            // A transfer of the output elsewhere is not counted
            transfer(TOKEN_OUT, POOL, TOKEN_IN, 7),
        ];

        let leg = Leg::Received { token: TOKEN_OUT, recipient: ACCOUNT };
        assert_eq!(settled_amount(&logs, leg).unwrap(), U256::from(1_980u64));
    }

    /// Tests reading the input pulled from the payer, ignoring other events
    #[test]
    fn test_paid_amount() {
        let approval = Approval { owner: ACCOUNT, spender: POOL, value: U256::ZERO };
        let logs = vec![
            transfer(TOKEN_OUT, POOL, ACCOUNT, 2),
            transfer(TOKEN_IN, ACCOUNT, POOL, 1_005),
            Log { address: TOKEN_IN, data: approval.encode_log_data() },
        ];

        let leg = Leg::Paid { token: TOKEN_IN, payer: ACCOUNT };
        assert_eq!(settled_amount(&logs, leg).unwrap(), U256::from(1_005u64));
    }

    /// Tests that a receipt without a matching transfer settles nothing
    #[test]
    fn test_no_matching_transfer() {
        let logs = vec![transfer(TOKEN_OUT, POOL, ACCOUNT, 2)];
        let leg = Leg::Paid { token: TOKEN_IN, payer: ACCOUNT };
        assert_eq!(settled_amount(&logs, leg).unwrap(), U256::ZERO);
    }
}
