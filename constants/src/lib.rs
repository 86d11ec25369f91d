//! Defines system-wide constants for swap orchestration

#![deny(unsafe_code)]
#![deny(clippy::missing_docs_in_private_items)]
#![deny(missing_docs)]

// ---------------------
// | Encoding Constants |
// ---------------------

/// The width in bytes of an asset identifier in an encoded route
pub const ASSET_WIDTH: usize = 20;

/// The width in bytes of a fee tier in an encoded route
pub const FEE_WIDTH: usize = 3;

/// The width in bytes of a single `fee, asset` hop in an encoded route
pub const HOP_WIDTH: usize = ASSET_WIDTH + FEE_WIDTH;

/// The largest fee tier representable in an encoded route, i.e. `2^24 - 1`
pub const MAX_FEE_TIER: u32 = (1 << (FEE_WIDTH * 8)) - 1;

// ------------------------
// | Well-Known Fee Tiers |
// ------------------------

/// The 0.01% fee tier, in hundredths of a basis point
pub const FEE_TIER_LOWEST: u32 = 100;

/// The 0.05% fee tier, in hundredths of a basis point
pub const FEE_TIER_LOW: u32 = 500;

/// The 0.3% fee tier, in hundredths of a basis point
pub const FEE_TIER_MEDIUM: u32 = 3_000;

/// The 1% fee tier, in hundredths of a basis point
pub const FEE_TIER_HIGH: u32 = 10_000;

// ----------------------
// | Execution Defaults |
// ----------------------

/// The default number of seconds after submission at which a swap expires
pub const DEFAULT_DEADLINE_OFFSET_SECS: u64 = 300;

/// The default interval at which to poll for pending transactions
pub const DEFAULT_BLOCK_POLLING_INTERVAL_MS: u64 = 100;
