//! The definition of the router client, which holds the configuration
//! details along with a handle for the router contract

use std::time::Duration;

use alloy::{
    contract::Error as ContractError,
    providers::{
        DynProvider, Provider, ProviderBuilder,
        fillers::{ChainIdFiller, GasFiller},
    },
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::{TransportError, http::reqwest::Url},
};
use alloy_contract::{CallBuilder, CallDecoder};
use alloy_primitives::{Address, BlockNumber, ChainId};
use alloy_sol_types::decode_revert_reason;
use tracing::info;
use util::err_str;

use crate::{
    abi::ISwapRouter::ISwapRouterInstance,
    errors::{RouterClientConfigError, RouterClientError},
};

mod erc20;
mod router;

pub use erc20::Erc20Ledger;

// -------------
// | Constants |
// -------------

/// The timeout for awaiting the receipt of a pending transaction
const TX_RECEIPT_TIMEOUT: Duration = Duration::from_secs(15);

/// The multiple of the gas price estimate we use for submitting a transaction
const GAS_PRICE_MULTIPLIER: u128 = 2;

/// The RPC client: a provider over HTTP with a signer derived from a raw
/// private key
pub type SwapProvider = DynProvider;
/// A call builder on the swap provider
pub type SwapCallBuilder<'a, C> = CallBuilder<&'a SwapProvider, C>;

/// A configuration struct for the router client, consists of the router
/// address, an endpoint for setting up an RPC client, and a private key for
/// signing transactions
#[derive(Clone)]
pub struct RouterClientConfig {
    /// The address of the swap router contract
    pub router_addr: Address,
    /// HTTP-addressable RPC endpoint for the client to connect to
    pub rpc_url: String,
    /// The private key of the account to use for signing transactions
    ///
    /// This account is the orchestrator's custody account
    pub private_key: PrivateKeySigner,
    /// The interval at which to poll for pending transactions
    pub block_polling_interval: Duration,
}

impl RouterClientConfig {
    /// Constructs RPC clients capable of signing transactions from the
    /// configuration
    fn get_provider(&self) -> Result<SwapProvider, RouterClientConfigError> {
        let url = Url::parse(&self.rpc_url)
            .map_err(err_str!(RouterClientConfigError::RpcClientInitialization))?;
        let key = self.private_key.clone();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .with_simple_nonce_management()
            .filler(ChainIdFiller::default())
            .filler(GasFiller)
            .wallet(key)
            .connect_http(url);
        provider.client().set_poll_interval(self.block_polling_interval);

        Ok(DynProvider::new(provider))
    }
}

/// The router client, executing trades on the router contract on behalf of
/// the signer's account
#[derive(Clone)]
pub struct RouterClient {
    /// The router contract instance
    router: ISwapRouterInstance<SwapProvider>,
    /// The address of the signer
    account: Address,
}

impl RouterClient {
    /// Constructs a new router client from the given configuration
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(config: RouterClientConfig) -> Result<Self, RouterClientError> {
        let provider = config.get_provider()?;
        let router = ISwapRouterInstance::new(config.router_addr, provider);
        Ok(Self { router, account: config.private_key.address() })
    }

    /// Get a reference to the router contract instance
    pub fn router(&self) -> &ISwapRouterInstance<SwapProvider> {
        &self.router
    }

    /// Get the address of the router contract
    pub fn router_addr(&self) -> Address {
        *self.router.address()
    }

    /// Get the address transactions are signed for
    pub fn account(&self) -> Address {
        self.account
    }

    /// Get a reference to the underlying RPC client
    pub fn provider(&self) -> &SwapProvider {
        self.router.provider()
    }

    /// A ledger moving tokens on behalf of the signer's account
    pub fn ledger(&self) -> Erc20Ledger {
        Erc20Ledger::new(self.clone())
    }

    /// Get the chain ID
    pub async fn chain_id(&self) -> Result<ChainId, RouterClientError> {
        self.provider().get_chain_id().await.map_err(err_str!(RouterClientError::Rpc))
    }

    /// Get the current block number
    pub async fn block_number(&self) -> Result<BlockNumber, RouterClientError> {
        self.provider().get_block_number().await.map_err(err_str!(RouterClientError::Rpc))
    }

    // ----------------
    // | Transactions |
    // ----------------

    /// Simulate a call and return its decoded result
    ///
    /// The call should be built `from` the signer's account so that it sees
    /// the allowances and balances the transaction will
    pub(crate) async fn simulate<'a, C>(
        &self,
        tx: &SwapCallBuilder<'a, C>,
    ) -> Result<C::CallOutput, RouterClientError>
    where
        C: CallDecoder + Send + Sync,
    {
        tx.call().await.map_err(|e| RouterClientError::contract_interaction(describe(e)))
    }

    /// Send a transaction and return the receipt
    pub(crate) async fn send_tx<'a, C>(
        &self,
        tx: SwapCallBuilder<'a, C>,
    ) -> Result<TransactionReceipt, RouterClientError>
    where
        C: CallDecoder + Send + Sync,
    {
        let gas_price = self.get_adjusted_gas_price().await?;
        let pending_tx = tx
            .gas_price(gas_price)
            .send()
            .await
            .map_err(|e| RouterClientError::contract_interaction(describe(e)))?;

        info!("Pending tx hash: {:#x}", pending_tx.tx_hash());
        let receipt = pending_tx
            .with_timeout(Some(TX_RECEIPT_TIMEOUT))
            .get_receipt()
            .await
            .map_err(RouterClientError::contract_interaction)?;

        // Check for failure
        if !receipt.status() {
            let error_msg = format!("tx ({:#x}) failed with status 0", receipt.transaction_hash);
            return Err(RouterClientError::contract_interaction(error_msg));
        }

        Ok(receipt)
    }

    /// Get the adjusted gas price for submitting a transaction
    ///
    /// We double the latest basefee to prevent reverts
    async fn get_adjusted_gas_price(&self) -> Result<u128, RouterClientError> {
        let gas_price = self.provider().get_gas_price().await.map_err(RouterClientError::rpc)?;
        Ok(gas_price * GAS_PRICE_MULTIPLIER)
    }
}

/// Describe a contract error, decoding the revert reason if there is one
fn describe(err: ContractError) -> String {
    match err {
        ContractError::TransportError(TransportError::ErrorResp(payload)) => {
            let reason = payload.as_revert_data().and_then(|data| decode_revert_reason(&data));
            match reason {
                Some(reason) => format!("reverted: {reason}"),
                None => format!("{} (code {})", payload.message, payload.code),
            }
        },
        e => e.to_string(),
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use alloy_primitives::address;
    use orchestrator::traits::AssetLedger;

    use super::*;

    /// A well-known development key
    const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    /// The router address used in tests
    const ROUTER: Address = address!("0xE592427A0AEce92De3Edee1F18E0157C05861564");

    /// Build a config against the given RPC url
    fn config(rpc_url: &str) -> RouterClientConfig {
        RouterClientConfig {
            router_addr: ROUTER,
            rpc_url: rpc_url.to_string(),
            private_key: PrivateKeySigner::from_str(DEV_KEY).unwrap(),
            block_polling_interval: Duration::from_millis(100),
        }
    }

    /// Tests that the client acts for the signer's account
    #[test]
    fn test_client_identity() {
        let client = RouterClient::new(config("http://localhost:8545")).unwrap();
        assert_eq!(client.router_addr(), ROUTER);
        assert_eq!(client.account(), address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"));
        assert_eq!(client.ledger().account(), client.account());
    }

    /// Tests that a malformed RPC url is rejected
    #[test]
    fn test_invalid_rpc_url() {
        let res = RouterClient::new(config("not a url"));
        assert!(matches!(
            res,
            Err(RouterClientError::Config(RouterClientConfigError::RpcClientInitialization(_)))
        ));
    }
}
