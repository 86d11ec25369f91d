//! Swap requests as supplied by a caller of the orchestrator
//!
//! Requests carry no recipient: the orchestrator always has the router
//! deliver into its own custody and forwards the proceeds to the caller it
//! authenticated.

use std::fmt::Display;

use alloy_primitives::aliases::U160;
use serde::{Deserialize, Serialize};

use super::{
    Amount, AssetId, Deadline,
    fee::FeeTier,
    route::{ForwardRoute, ReverseRoute, RouteError},
};

/// Errors validating a swap request
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The exact amount of the request is zero
    #[error("{0} must be non-zero")]
    ZeroAmount(&'static str),
    /// The request accepts any output amount
    #[error("minimum output amount is zero; supply a slippage bound")]
    UnboundedMinOutput,
    /// The request accepts spending any input amount
    #[error("maximum input amount is unbounded; supply a slippage bound")]
    UnboundedMaxInput,
    /// The route of the request is malformed
    #[error("invalid route: {0}")]
    Route(#[from] RouteError),
}

/// The slippage requirements a request must meet before it is executed
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippagePolicy {
    /// Whether to execute requests whose slippage bound is the permissive
    /// extreme, i.e. a zero minimum output or a `U256::MAX` maximum input
    ///
    /// Unsafe outside of tests; such a trade can be sandwiched for its full
    /// value
    pub allow_unbounded: bool,
}

impl SlippagePolicy {
    /// A policy that rejects permissive slippage bounds
    pub fn strict() -> Self {
        Self { allow_unbounded: false }
    }

    /// A policy that accepts permissive slippage bounds
    pub fn permissive() -> Self {
        Self { allow_unbounded: true }
    }

    /// Check a minimum output bound
    fn check_min_output(&self, min_amount_out: Amount) -> Result<(), RequestError> {
        if min_amount_out.is_zero() && !self.allow_unbounded {
            return Err(RequestError::UnboundedMinOutput);
        }
        Ok(())
    }

    /// Check a maximum input bound
    fn check_max_input(&self, max_amount_in: Amount) -> Result<(), RequestError> {
        if max_amount_in == Amount::MAX && !self.allow_unbounded {
            return Err(RequestError::UnboundedMaxInput);
        }
        Ok(())
    }
}

/// Check that an amount is non-zero
fn check_non_zero(amount: Amount, name: &'static str) -> Result<(), RequestError> {
    if amount.is_zero() {
        return Err(RequestError::ZeroAmount(name));
    }
    Ok(())
}

/// Check that a single-hop request trades between distinct assets
fn check_distinct(input: AssetId, output: AssetId) -> Result<(), RequestError> {
    if input == output {
        return Err(RouteError::SameAssetHop(input).into());
    }
    Ok(())
}

// -------------
// | Swap Kind |
// -------------

/// The four router entrypoints
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapKind {
    /// Spend an exact input through a single pool
    ExactInputSingle,
    /// Receive an exact output through a single pool
    ExactOutputSingle,
    /// Spend an exact input along a multi-hop route
    ExactInput,
    /// Receive an exact output along a multi-hop route
    ExactOutput,
}

impl SwapKind {
    /// Whether the caller fixes the output amount
    pub fn is_exact_output(&self) -> bool {
        matches!(self, Self::ExactOutputSingle | Self::ExactOutput)
    }
}

impl Display for SwapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapKind::ExactInputSingle => write!(f, "exact-input-single"),
            SwapKind::ExactOutputSingle => write!(f, "exact-output-single"),
            SwapKind::ExactInput => write!(f, "exact-input"),
            SwapKind::ExactOutput => write!(f, "exact-output"),
        }
    }
}

// ------------
// | Requests |
// ------------

/// Spend exactly `amount_in` of the input asset through one pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputSingleRequest {
    /// The asset spent
    pub input_asset: AssetId,
    /// The asset received
    pub output_asset: AssetId,
    /// The fee tier of the pool to trade through
    pub fee: FeeTier,
    /// The time after which the router must reject the trade
    pub deadline: Deadline,
    /// The exact amount of the input asset to spend
    pub amount_in: Amount,
    /// The least output the caller accepts
    pub min_amount_out: Amount,
    /// The sqrt price (Q64.96) at which the pool stops trading, zero for none
    pub sqrt_price_limit_x96: U160,
}

impl ExactInputSingleRequest {
    /// Validate the request against a slippage policy
    pub fn validate(&self, policy: &SlippagePolicy) -> Result<(), RequestError> {
        check_distinct(self.input_asset, self.output_asset)?;
        check_non_zero(self.amount_in, "input amount")?;
        policy.check_min_output(self.min_amount_out)
    }
}

/// Receive exactly `amount_out` of the output asset through one pool
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputSingleRequest {
    /// The asset spent
    pub input_asset: AssetId,
    /// The asset received
    pub output_asset: AssetId,
    /// The fee tier of the pool to trade through
    pub fee: FeeTier,
    /// The time after which the router must reject the trade
    pub deadline: Deadline,
    /// The exact amount of the output asset to receive
    pub amount_out: Amount,
    /// The most input the caller is willing to spend
    pub max_amount_in: Amount,
    /// The sqrt price (Q64.96) at which the pool stops trading, zero for none
    pub sqrt_price_limit_x96: U160,
}

impl ExactOutputSingleRequest {
    /// Validate the request against a slippage policy
    pub fn validate(&self, policy: &SlippagePolicy) -> Result<(), RequestError> {
        check_distinct(self.input_asset, self.output_asset)?;
        check_non_zero(self.amount_out, "output amount")?;
        check_non_zero(self.max_amount_in, "maximum input amount")?;
        policy.check_max_input(self.max_amount_in)
    }
}

/// Spend exactly `amount_in` of the route's input asset along a multi-hop
/// route
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputRequest {
    /// The route, encoded in execution order
    pub route: ForwardRoute,
    /// The time after which the router must reject the trade
    pub deadline: Deadline,
    /// The exact amount of the input asset to spend
    pub amount_in: Amount,
    /// The least output the caller accepts
    pub min_amount_out: Amount,
}

impl ExactInputRequest {
    /// The asset spent
    pub fn input_asset(&self) -> AssetId {
        self.route.input_asset()
    }

    /// The asset received
    pub fn output_asset(&self) -> AssetId {
        self.route.output_asset()
    }

    /// Validate the request against a slippage policy
    pub fn validate(&self, policy: &SlippagePolicy) -> Result<(), RequestError> {
        self.route.decode()?;
        check_non_zero(self.amount_in, "input amount")?;
        policy.check_min_output(self.min_amount_out)
    }
}

/// Receive exactly `amount_out` of the route's output asset along a multi-hop
/// route
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputRequest {
    /// The route, encoded from the output back to the input
    pub route: ReverseRoute,
    /// The time after which the router must reject the trade
    pub deadline: Deadline,
    /// The exact amount of the output asset to receive
    pub amount_out: Amount,
    /// The most input the caller is willing to spend
    pub max_amount_in: Amount,
}

impl ExactOutputRequest {
    /// The asset spent
    pub fn input_asset(&self) -> AssetId {
        self.route.input_asset()
    }

    /// The asset received
    pub fn output_asset(&self) -> AssetId {
        self.route.output_asset()
    }

    /// Validate the request against a slippage policy
    pub fn validate(&self, policy: &SlippagePolicy) -> Result<(), RequestError> {
        self.route.decode()?;
        check_non_zero(self.amount_out, "output amount")?;
        check_non_zero(self.max_amount_in, "maximum input amount")?;
        policy.check_max_input(self.max_amount_in)
    }
}

/// Any one of the four request shapes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "request", rename_all = "kebab-case")]
pub enum SwapRequest {
    /// An exact-input single-hop request
    ExactInputSingle(ExactInputSingleRequest),
    /// An exact-output single-hop request
    ExactOutputSingle(ExactOutputSingleRequest),
    /// An exact-input multi-hop request
    ExactInput(ExactInputRequest),
    /// An exact-output multi-hop request
    ExactOutput(ExactOutputRequest),
}

impl SwapRequest {
    /// The entrypoint this request targets
    pub fn kind(&self) -> SwapKind {
        match self {
            SwapRequest::ExactInputSingle(_) => SwapKind::ExactInputSingle,
            SwapRequest::ExactOutputSingle(_) => SwapKind::ExactOutputSingle,
            SwapRequest::ExactInput(_) => SwapKind::ExactInput,
            SwapRequest::ExactOutput(_) => SwapKind::ExactOutput,
        }
    }

    /// Validate the request against a slippage policy
    pub fn validate(&self, policy: &SlippagePolicy) -> Result<(), RequestError> {
        match self {
            SwapRequest::ExactInputSingle(req) => req.validate(policy),
            SwapRequest::ExactOutputSingle(req) => req.validate(policy),
            SwapRequest::ExactInput(req) => req.validate(policy),
            SwapRequest::ExactOutput(req) => req.validate(policy),
        }
    }
}
