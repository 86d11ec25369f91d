//! Defines one-off utility functions used throughout the workspace
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

use std::time::{SystemTime, UNIX_EPOCH};

pub mod errors;
pub mod logging;

/// Returns the current unix timestamp in seconds, represented as u64
pub fn get_current_time_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("negative timestamp").as_secs()
}

/// Returns the unix timestamp `offset_secs` seconds from now
pub fn deadline_from_now(offset_secs: u64) -> u64 {
    get_current_time_seconds().saturating_add(offset_secs)
}
