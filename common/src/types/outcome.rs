//! The result of a completed swap

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{Amount, AssetId, request::SwapKind};

/// The settled amounts of a completed swap, from the caller's point of view
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    /// The entrypoint the swap went through
    pub kind: SwapKind,
    /// The asset the caller spent
    pub input_asset: AssetId,
    /// The asset the caller received
    pub output_asset: AssetId,
    /// The amount of the input asset the router consumed
    pub amount_in: Amount,
    /// The amount of the output asset forwarded to the caller
    pub amount_out: Amount,
    /// The amount of the input asset returned to the caller unspent
    pub refunded: Amount,
}

impl Display for SwapOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: spent {} of {}, received {} of {}",
            self.kind, self.amount_in, self.input_asset, self.amount_out, self.output_asset
        )?;
        if !self.refunded.is_zero() {
            write!(f, ", refunded {}", self.refunded)?;
        }
        Ok(())
    }
}
