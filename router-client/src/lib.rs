//! A client for a Uniswap-V3-style swap router and the ERC20 tokens it
//! trades
//!
//! [`RouterClient`] implements the orchestrator's `SwapRouter` against the
//! router contract, and [`Erc20Ledger`] implements its `AssetLedger` against
//! token contracts, both acting for the account of the configured signer.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod abi;
pub mod client;
pub mod conversion;
pub mod errors;

pub use client::{Erc20Ledger, RouterClient, RouterClientConfig};
