//! Type definitions shared by the orchestrator, the on-chain client, and the
//! config layer

use alloy_primitives::{Address, U256};

pub mod fee;
pub mod outcome;
pub mod request;
pub mod route;
pub mod router_params;

/// An asset identifier, the address of the token contract
pub type AssetId = Address;
/// An amount of an asset, denominated in the asset's base units
pub type Amount = U256;
/// A unix timestamp in seconds after which a swap must not execute
pub type Deadline = u64;
