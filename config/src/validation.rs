//! Config validation

use alloy_primitives::Address;
use url::Url;

use crate::SwapConfig;

/// Validate a parsed config
pub fn validate_config(config: &SwapConfig) -> Result<(), String> {
    let url = Url::parse(&config.rpc_url).map_err(|e| format!("invalid `rpc-url`: {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("`rpc-url` must be an http(s) endpoint".to_string());
    }

    if config.router_address == Address::ZERO {
        return Err("`router-address` must be non-zero".to_string());
    }
    if config.caller == Address::ZERO {
        return Err("`caller` must be non-zero".to_string());
    }
    if config.block_polling_interval.is_zero() {
        return Err("`block-polling-interval-ms` must be non-zero".to_string());
    }

    config
        .request
        .validate(&config.slippage_policy)
        .map_err(|e| format!("invalid swap: {e}"))
}
