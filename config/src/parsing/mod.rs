//! Parsing logic for the swap config

use std::{env, str::FromStr, time::Duration};

use alloy::signers::local::PrivateKeySigner;
use clap::Parser;
use common::types::{
    Deadline,
    fee::FeeTier,
    request::{
        ExactInputRequest, ExactInputSingleRequest, ExactOutputRequest, ExactOutputSingleRequest,
        SlippagePolicy, SwapRequest,
    },
};
use util::deadline_from_now;

use crate::{
    Cli, SwapCommand, SwapConfig, parsing::config_file::config_file_args,
    validation::validate_config,
};

pub mod config_file;

/// Parses command line args into the swap config
///
/// Options may come from both a config file and the command line. The config
/// file's options are placed before the command line's, and the CLI lets an
/// option override earlier occurrences of itself, so command line values
/// take precedence
pub fn parse_command_line_args() -> Result<SwapConfig, String> {
    let command_line_args: Vec<String> = env::args().collect();
    let full_args = merge_config_file_args(command_line_args)?;

    let cli = Cli::parse_from(full_args);
    let config = parse_config_from_args(cli)?;
    validate_config(&config)?;
    Ok(config)
}

/// Insert the options of the config file named in the args, if any, between
/// the executable name and the remaining args
pub fn merge_config_file_args(mut command_line_args: Vec<String>) -> Result<Vec<String>, String> {
    let config_file_args = config_file_args(&command_line_args)?;
    if command_line_args.is_empty() {
        return Ok(config_file_args);
    }

    let mut full_args = vec![command_line_args.remove(0)];
    full_args.extend(config_file_args);
    full_args.extend(command_line_args);
    Ok(full_args)
}

/// Parse the config from a set of command line arguments
///
/// The swap's deadline is resolved against the current time here
pub fn parse_config_from_args(cli_args: Cli) -> Result<SwapConfig, String> {
    let private_key =
        PrivateKeySigner::from_str(&cli_args.private_key).map_err(|e| e.to_string())?;
    let caller = cli_args.caller.unwrap_or_else(|| private_key.address());

    let deadline = deadline_from_now(cli_args.deadline_offset_secs);
    let request = build_request(cli_args.command, cli_args.default_fee_tier, deadline);

    Ok(SwapConfig {
        rpc_url: cli_args.rpc_url,
        router_address: cli_args.router_address,
        private_key,
        caller,
        block_polling_interval: Duration::from_millis(cli_args.block_polling_interval_ms),
        slippage_policy: SlippagePolicy { allow_unbounded: cli_args.allow_unbounded_slippage },
        log_level: cli_args.log_level,
        json_logs: cli_args.json_logs,
        request,
    })
}

/// Build the swap request named by a subcommand
fn build_request(
    command: SwapCommand,
    default_fee: FeeTier,
    deadline: Deadline,
) -> SwapRequest {
    match command {
        SwapCommand::ExactInputSingle {
            input,
            output,
            fee,
            amount_in,
            min_amount_out,
            sqrt_price_limit_x96,
        } => SwapRequest::ExactInputSingle(ExactInputSingleRequest {
            input_asset: input,
            output_asset: output,
            fee: fee.unwrap_or(default_fee),
            deadline,
            amount_in,
            min_amount_out,
            sqrt_price_limit_x96,
        }),
        SwapCommand::ExactOutputSingle {
            input,
            output,
            fee,
            amount_out,
            max_amount_in,
            sqrt_price_limit_x96,
        } => SwapRequest::ExactOutputSingle(ExactOutputSingleRequest {
            input_asset: input,
            output_asset: output,
            fee: fee.unwrap_or(default_fee),
            deadline,
            amount_out,
            max_amount_in,
            sqrt_price_limit_x96,
        }),
        SwapCommand::ExactInput { route, amount_in, min_amount_out } => {
            SwapRequest::ExactInput(ExactInputRequest {
                route: route.forward(),
                deadline,
                amount_in,
                min_amount_out,
            })
        },
        // Routes are given in execution order; the router expects exact-output
        // routes encoded from the output back
        SwapCommand::ExactOutput { route, amount_out, max_amount_in } => {
            SwapRequest::ExactOutput(ExactOutputRequest {
                route: route.reverse(),
                deadline,
                amount_out,
                max_amount_in,
            })
        },
    }
}
