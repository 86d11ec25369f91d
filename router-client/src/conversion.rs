//! Conversions from the orchestrator's router parameters to the router
//! contract's calldata types

use alloy_primitives::{U256, aliases::U24};
use common::types::{
    Deadline,
    fee::FeeTier,
    router_params::{
        ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
    },
};

use crate::{abi::ISwapRouter, errors::ConversionError};

/// Convert a fee tier to the contract's `uint24`
pub fn fee_to_contract(fee: FeeTier) -> Result<U24, ConversionError> {
    U24::try_from(u64::from(fee.value()))
        .map_err(|_| ConversionError::InvalidUint(format!("fee {fee} exceeds uint24")))
}

/// Convert a deadline in unix seconds to the contract's `uint256`
pub fn deadline_to_contract(deadline: Deadline) -> U256 {
    U256::from(deadline)
}

impl TryFrom<&ExactInputSingleParams> for ISwapRouter::ExactInputSingleParams {
    type Error = ConversionError;

    fn try_from(params: &ExactInputSingleParams) -> Result<Self, Self::Error> {
        Ok(Self {
            tokenIn: params.input_asset,
            tokenOut: params.output_asset,
            fee: fee_to_contract(params.fee)?,
            recipient: params.recipient,
            deadline: deadline_to_contract(params.deadline),
            amountIn: params.amount_in,
            amountOutMinimum: params.min_amount_out,
            sqrtPriceLimitX96: params.sqrt_price_limit_x96,
        })
    }
}

impl TryFrom<&ExactOutputSingleParams> for ISwapRouter::ExactOutputSingleParams {
    type Error = ConversionError;

    fn try_from(params: &ExactOutputSingleParams) -> Result<Self, Self::Error> {
        Ok(Self {
            tokenIn: params.input_asset,
            tokenOut: params.output_asset,
            fee: fee_to_contract(params.fee)?,
            recipient: params.recipient,
            deadline: deadline_to_contract(params.deadline),
            amountOut: params.amount_out,
            amountInMaximum: params.max_amount_in,
            sqrtPriceLimitX96: params.sqrt_price_limit_x96,
        })
    }
}

impl From<&ExactInputParams> for ISwapRouter::ExactInputParams {
    fn from(params: &ExactInputParams) -> Self {
        Self {
            path: params.route.as_bytes().clone(),
            recipient: params.recipient,
            deadline: deadline_to_contract(params.deadline),
            amountIn: params.amount_in,
            amountOutMinimum: params.min_amount_out,
        }
    }
}

impl From<&ExactOutputParams> for ISwapRouter::ExactOutputParams {
    fn from(params: &ExactOutputParams) -> Self {
        Self {
            path: params.route.as_bytes().clone(),
            recipient: params.recipient,
            deadline: deadline_to_contract(params.deadline),
            amountOut: params.amount_out,
            amountInMaximum: params.max_amount_in,
        }
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::{Address, address, aliases::U160};
    use common::types::route::{Hop, Route};

    use super::*;

    /// Asset A
    const A: Address = address!("0x1111111111111111111111111111111111111111");
    /// Asset B
    const B: Address = address!("0x2222222222222222222222222222222222222222");
    /// Asset C
    const C: Address = address!("0x3333333333333333333333333333333333333333");

    /// Tests converting fee tiers, including the largest representable one
    #[test]
    fn test_fee_conversion() {
        assert_eq!(fee_to_contract(FeeTier::MEDIUM).unwrap(), U24::from(3000u64));
        let max = FeeTier::new((1 << 24) - 1).unwrap();
        assert_eq!(fee_to_contract(max).unwrap(), U24::MAX);
    }

    /// Tests that single-hop parameters map field for field
    #[test]
    fn test_single_params() {
        let params = ExactInputSingleParams {
            input_asset: A,
            output_asset: B,
            fee: FeeTier::LOW,
            recipient: C,
            deadline: 1_700_000_000,
            amount_in: U256::from(10u64),
            min_amount_out: U256::from(9u64),
            sqrt_price_limit_x96: U160::ZERO,
        };

        let sol = ISwapRouter::ExactInputSingleParams::try_from(&params).unwrap();
        assert_eq!(sol.tokenIn, A);
        assert_eq!(sol.tokenOut, B);
        assert_eq!(sol.fee, U24::from(500u64));
        assert_eq!(sol.recipient, C);
        assert_eq!(sol.deadline, U256::from(1_700_000_000u64));
        assert_eq!(sol.amountOutMinimum, U256::from(9u64));
    }

    /// Tests that a reverse route is passed through in its encoded order
    #[test]
    fn test_multi_hop_path_passthrough() {
        let route = Route::new(A, vec![Hop::new(FeeTier::MEDIUM, C), Hop::new(FeeTier::LOW, B)]);
        let reverse = route.unwrap().reverse();
        let params = ExactOutputParams {
            route: reverse.clone(),
            recipient: C,
            deadline: 1,
            amount_out: U256::from(1u64),
            max_amount_in: U256::from(2u64),
        };

        let sol = ISwapRouter::ExactOutputParams::from(&params);
        assert_eq!(&sol.path, reverse.as_bytes());
        // The path of an exact-output trade starts at the output asset
        assert_eq!(&sol.path[..20], B.as_slice());
    }
}
