//! Possible errors thrown by the router client

use alloy_sol_types::Error as SolError;
use orchestrator::error::{LedgerError, RouterError};

/// The error type returned by the router client
#[derive(Clone, Debug, thiserror::Error)]
pub enum RouterClientError {
    /// Error thrown when the router client configuration fails
    #[error("router client configuration error: {0}")]
    Config(#[from] RouterClientConfigError),
    /// Error thrown when converting between orchestrator and contract types
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),
    /// Error thrown when a contract call or transaction fails
    #[error("contract interaction error: {0}")]
    ContractInteraction(String),
    /// An error interacting with an erc20 contract
    #[error("ERC20 error: {0}")]
    Erc20(String),
    /// An error interacting with the lower level rpc client
    #[error("RPC error: {0}")]
    Rpc(String),
}

impl RouterClientError {
    /// Create a new contract interaction error
    #[allow(clippy::needless_pass_by_value)]
    pub fn contract_interaction<T: ToString>(msg: T) -> Self {
        Self::ContractInteraction(msg.to_string())
    }

    /// Create a new erc20 error
    #[allow(clippy::needless_pass_by_value)]
    pub fn erc20<T: ToString>(msg: T) -> Self {
        Self::Erc20(msg.to_string())
    }

    /// Create a new RPC error
    #[allow(clippy::needless_pass_by_value)]
    pub fn rpc<T: ToString>(msg: T) -> Self {
        Self::Rpc(msg.to_string())
    }
}

impl From<SolError> for RouterClientError {
    fn from(e: SolError) -> Self {
        Self::ContractInteraction(e.to_string())
    }
}

impl From<RouterClientError> for RouterError {
    fn from(e: RouterClientError) -> Self {
        RouterError::backend(e)
    }
}

impl From<RouterClientError> for LedgerError {
    fn from(e: RouterClientError) -> Self {
        LedgerError::backend(e)
    }
}

/// The error type returned by the router client configuration interface
#[derive(Clone, Debug, thiserror::Error)]
pub enum RouterClientConfigError {
    /// Error thrown when the RPC client fails to initialize
    #[error("RPC client initialization error: {0}")]
    RpcClientInitialization(String),
}

/// Errors generated when converting orchestrator types to contract types
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Error thrown when a value does not fit the contract's uint width
    #[error("invalid uint: {0}")]
    InvalidUint(String),
}
