//! Orchestrates swaps of one asset for another through an external router
//!
//! Each of the four swap protocols takes custody of the caller's input asset,
//! grants the router an allowance, executes the trade, and reconciles the
//! result: forwarding proceeds, refunding unspent input, and revoking any
//! allowance left over. Every effect with an inverse is recorded in a
//! compensation log so that a failure at any step leaves nothing stranded in
//! the orchestrator's custody.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::needless_pass_by_ref_mut)]

pub mod compensation;
pub mod driver;
pub mod error;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
mod orchestrator;
pub mod tasks;
pub mod traits;

pub use orchestrator::SwapOrchestrator;
