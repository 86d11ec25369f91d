//! In-memory collaborators for exercising the swap protocols without a chain
//!
//! The [`InMemoryLedger`] keeps ERC20-style balances and allowances and logs
//! every mutating call; the [`MockRouter`] prices trades from fixed per-pool
//! rates and settles them against that ledger.

mod ledger;
mod router;

pub use ledger::{InMemoryLedger, LedgerAccount, LedgerCall, LedgerOp};
pub use router::{MockRouter, Rate, RouterCall};
