//! The swap CLI and config definitions

use std::time::Duration;

use alloy::signers::local::PrivateKeySigner;
use alloy_primitives::{Address, U256, aliases::U160};
use clap::{Parser, Subcommand};
use common::types::{
    fee::FeeTier,
    request::{SlippagePolicy, SwapRequest},
    route::Route,
};
use constants::{DEFAULT_BLOCK_POLLING_INTERVAL_MS, DEFAULT_DEADLINE_OFFSET_SECS};
use tracing::level_filters::LevelFilter;

// -------
// | CLI |
// -------

/// Executes a single swap through a router on behalf of a caller
#[derive(Debug, Parser)]
#[command(author, about, long_about = None, args_override_self = true)]
#[rustfmt::skip]
pub struct Cli {
    // ---------------
    // | Config File |
    // ---------------
    /// A TOML config file to read options from
    ///
    /// Keys are option names without the leading dashes, e.g. `rpc-url`
    #[arg(long)]
    pub config_file: Option<String>,

    // -------------------
    // | Chain & Signing |
    // -------------------
    /// The HTTP RPC endpoint of the chain
    #[arg(long, env = "RPC_URL")]
    pub rpc_url: String,
    /// The address of the swap router contract
    #[arg(long, env = "ROUTER_ADDRESS")]
    pub router_address: Address,
    /// The private key of the orchestrator's custody account, hex encoded
    #[arg(long, env = "PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
    /// The account the swap is executed for
    ///
    /// The caller must have approved the custody account to spend its input.
    /// Defaults to the custody account itself
    #[arg(long)]
    pub caller: Option<Address>,
    /// The interval at which to poll for pending transactions, in milliseconds
    #[arg(long, default_value_t = DEFAULT_BLOCK_POLLING_INTERVAL_MS)]
    pub block_polling_interval_ms: u64,

    // -----------------
    // | Swap Defaults |
    // -----------------
    /// The fee tier of single-hop swaps that do not name one
    #[arg(long, default_value_t = FeeTier::MEDIUM)]
    pub default_fee_tier: FeeTier,
    /// How far in the future, in seconds, the swap's deadline is set
    #[arg(long, default_value_t = DEFAULT_DEADLINE_OFFSET_SECS)]
    pub deadline_offset_secs: u64,
    /// Execute swaps with a zero minimum output or an unlimited maximum input
    ///
    /// Such swaps can be sandwiched for their full value
    #[arg(long)]
    pub allow_unbounded_slippage: bool,

    // -------------
    // | Telemetry |
    // -------------
    /// The verbosity of logs
    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    /// The swap to execute
    #[command(subcommand)]
    pub command: SwapCommand,
}

/// The swap to execute, one per router entrypoint
///
/// Amounts are given in the asset's base units
#[derive(Clone, Debug, Subcommand)]
pub enum SwapCommand {
    /// Spend an exact input through one pool
    ExactInputSingle {
        /// The asset spent
        #[arg(long)]
        input: Address,
        /// The asset received
        #[arg(long)]
        output: Address,
        /// The fee tier of the pool, in hundredths of a basis point
        #[arg(long)]
        fee: Option<FeeTier>,
        /// The exact amount spent
        #[arg(long)]
        amount_in: U256,
        /// The least output accepted
        #[arg(long)]
        min_amount_out: U256,
        /// The sqrt price (Q64.96) at which the pool stops trading
        #[arg(long, default_value = "0")]
        sqrt_price_limit_x96: U160,
    },
    /// Receive an exact output through one pool
    ExactOutputSingle {
        /// The asset spent
        #[arg(long)]
        input: Address,
        /// The asset received
        #[arg(long)]
        output: Address,
        /// The fee tier of the pool, in hundredths of a basis point
        #[arg(long)]
        fee: Option<FeeTier>,
        /// The exact amount received
        #[arg(long)]
        amount_out: U256,
        /// The most input spent
        #[arg(long)]
        max_amount_in: U256,
        /// The sqrt price (Q64.96) at which the pool stops trading
        #[arg(long, default_value = "0")]
        sqrt_price_limit_x96: U160,
    },
    /// Spend an exact input along a route
    ExactInput {
        /// The route in execution order, e.g. `0xA..:3000:0xC..:500:0xB..`
        #[arg(long)]
        route: Route,
        /// The exact amount spent
        #[arg(long)]
        amount_in: U256,
        /// The least output accepted
        #[arg(long)]
        min_amount_out: U256,
    },
    /// Receive an exact output along a route
    ExactOutput {
        /// The route in execution order, e.g. `0xA..:3000:0xC..:500:0xB..`
        #[arg(long)]
        route: Route,
        /// The exact amount received
        #[arg(long)]
        amount_out: U256,
        /// The most input spent
        #[arg(long)]
        max_amount_in: U256,
    },
}

// ----------
// | Config |
// ----------

/// The parsed config of a swap invocation
#[derive(Clone, Debug)]
pub struct SwapConfig {
    /// The HTTP RPC endpoint of the chain
    pub rpc_url: String,
    /// The address of the swap router contract
    pub router_address: Address,
    /// The signer of the orchestrator's custody account
    pub private_key: PrivateKeySigner,
    /// The account the swap is executed for
    pub caller: Address,
    /// The interval at which to poll for pending transactions
    pub block_polling_interval: Duration,
    /// The slippage bounds the request must meet
    pub slippage_policy: SlippagePolicy,
    /// The verbosity of logs
    pub log_level: LevelFilter,
    /// Whether to emit logs as JSON
    pub json_logs: bool,
    /// The swap to execute, with its deadline resolved
    pub request: SwapRequest,
}
