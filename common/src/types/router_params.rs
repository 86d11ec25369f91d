//! The parameter sets of the router's four entrypoints
//!
//! These mirror the requests with the recipient resolved

use alloy_primitives::{Address, aliases::U160};
use serde::{Deserialize, Serialize};

use super::{
    Amount, AssetId, Deadline,
    fee::FeeTier,
    request::{
        ExactInputRequest, ExactInputSingleRequest, ExactOutputRequest, ExactOutputSingleRequest,
    },
    route::{ForwardRoute, ReverseRoute},
};

/// Parameters of the exact-input single-hop entrypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputSingleParams {
    /// The asset spent
    pub input_asset: AssetId,
    /// The asset received
    pub output_asset: AssetId,
    /// The fee tier of the pool
    pub fee: FeeTier,
    /// Where the router delivers the output
    pub recipient: Address,
    /// The time after which the router rejects the trade
    pub deadline: Deadline,
    /// The exact input amount
    pub amount_in: Amount,
    /// The least acceptable output
    pub min_amount_out: Amount,
    /// The sqrt price limit, zero for none
    pub sqrt_price_limit_x96: U160,
}

impl ExactInputSingleParams {
    /// Build the router parameters for a request
    pub fn from_request(req: &ExactInputSingleRequest, recipient: Address) -> Self {
        Self {
            input_asset: req.input_asset,
            output_asset: req.output_asset,
            fee: req.fee,
            recipient,
            deadline: req.deadline,
            amount_in: req.amount_in,
            min_amount_out: req.min_amount_out,
            sqrt_price_limit_x96: req.sqrt_price_limit_x96,
        }
    }
}

/// Parameters of the exact-output single-hop entrypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputSingleParams {
    /// The asset spent
    pub input_asset: AssetId,
    /// The asset received
    pub output_asset: AssetId,
    /// The fee tier of the pool
    pub fee: FeeTier,
    /// Where the router delivers the output
    pub recipient: Address,
    /// The time after which the router rejects the trade
    pub deadline: Deadline,
    /// The exact output amount
    pub amount_out: Amount,
    /// The most input the router may pull
    pub max_amount_in: Amount,
    /// The sqrt price limit, zero for none
    pub sqrt_price_limit_x96: U160,
}

impl ExactOutputSingleParams {
    /// Build the router parameters for a request
    pub fn from_request(req: &ExactOutputSingleRequest, recipient: Address) -> Self {
        Self {
            input_asset: req.input_asset,
            output_asset: req.output_asset,
            fee: req.fee,
            recipient,
            deadline: req.deadline,
            amount_out: req.amount_out,
            max_amount_in: req.max_amount_in,
            sqrt_price_limit_x96: req.sqrt_price_limit_x96,
        }
    }
}

/// Parameters of the exact-input multi-hop entrypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputParams {
    /// The route in execution order
    pub route: ForwardRoute,
    /// Where the router delivers the output
    pub recipient: Address,
    /// The time after which the router rejects the trade
    pub deadline: Deadline,
    /// The exact input amount
    pub amount_in: Amount,
    /// The least acceptable output
    pub min_amount_out: Amount,
}

impl ExactInputParams {
    /// Build the router parameters for a request
    pub fn from_request(req: &ExactInputRequest, recipient: Address) -> Self {
        Self {
            route: req.route.clone(),
            recipient,
            deadline: req.deadline,
            amount_in: req.amount_in,
            min_amount_out: req.min_amount_out,
        }
    }
}

/// Parameters of the exact-output multi-hop entrypoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputParams {
    /// The route from the output back to the input
    pub route: ReverseRoute,
    /// Where the router delivers the output
    pub recipient: Address,
    /// The time after which the router rejects the trade
    pub deadline: Deadline,
    /// The exact output amount
    pub amount_out: Amount,
    /// The most input the router may pull
    pub max_amount_in: Amount,
}

impl ExactOutputParams {
    /// Build the router parameters for a request
    pub fn from_request(req: &ExactOutputRequest, recipient: Address) -> Self {
        Self {
            route: req.route.clone(),
            recipient,
            deadline: req.deadline,
            amount_out: req.amount_out,
            max_amount_in: req.max_amount_in,
        }
    }
}
