//! The entrypoint to the swap binary
//!
//! Executes a single swap through the configured router on behalf of the
//! configured caller, using the signer's account as the orchestrator's
//! custody account

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use config::{SwapConfig, parse_command_line_args};
use eyre::{Result, eyre};
use orchestrator::{SwapOrchestrator, traits::AssetLedger};
use router_client::{RouterClient, RouterClientConfig};
use tracing::info;
use util::logging::{setup_json_logger, setup_system_logger};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let config = parse_command_line_args().map_err(|e| eyre!(e))?;
    if config.json_logs {
        setup_json_logger(config.log_level);
    } else {
        setup_system_logger(config.log_level);
    }

    run_swap(config).await
}

/// Wire the on-chain collaborators into an orchestrator and execute the
/// configured swap
async fn run_swap(config: SwapConfig) -> Result<()> {
    let client = RouterClient::new(RouterClientConfig {
        router_addr: config.router_address,
        rpc_url: config.rpc_url.clone(),
        private_key: config.private_key.clone(),
        block_polling_interval: config.block_polling_interval,
    })?;
    let chain_id = client.chain_id().await?;

    let ledger = client.ledger();
    info!(
        chain_id,
        custodian = %ledger.account(),
        caller = %config.caller,
        router = %client.router_addr(),
        "executing {} swap",
        config.request.kind(),
    );

    let orchestrator = SwapOrchestrator::new(ledger, client, config.slippage_policy);
    let outcome = orchestrator.execute(config.caller, config.request).await?;
    info!("{outcome}");

    Ok(())
}
