//! Errors raised by the orchestrator and its collaborators

use alloy_primitives::Address;
use common::types::{
    Amount, AssetId, Deadline, fee::FeeTier, request::RequestError, route::RouteError,
};

/// The error type returned by an asset ledger
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The owner does not hold enough of the asset
    #[error("insufficient balance of {asset} for {owner}: need {needed}, have {available}")]
    InsufficientBalance {
        /// The asset moved
        asset: AssetId,
        /// The account debited
        owner: Address,
        /// The amount requested
        needed: Amount,
        /// The amount held
        available: Amount,
    },
    /// The spender is not approved for enough of the owner's asset
    #[error(
        "insufficient allowance of {asset} from {owner} to {spender}: need {needed}, have {available}"
    )]
    InsufficientAllowance {
        /// The asset moved
        asset: AssetId,
        /// The account debited
        owner: Address,
        /// The account moving the owner's asset
        spender: Address,
        /// The amount requested
        needed: Amount,
        /// The amount approved
        available: Amount,
    },
    /// The token reported failure without reverting
    #[error("{op} of {asset} rejected by token")]
    Rejected {
        /// The operation attempted
        op: &'static str,
        /// The asset
        asset: AssetId,
    },
    /// An error in the ledger's backing store or transport
    #[error("ledger backend error: {0}")]
    Backend(String),
}

impl LedgerError {
    /// Create a new backend error
    #[allow(clippy::needless_pass_by_value)]
    pub fn backend<T: ToString>(msg: T) -> Self {
        Self::Backend(msg.to_string())
    }
}

/// The error type returned by a router
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// The trade was submitted after its deadline
    #[error("deadline {deadline} elapsed at {now}")]
    DeadlineElapsed {
        /// The request's deadline
        deadline: Deadline,
        /// The time of execution
        now: u64,
    },
    /// The trade would yield less than the caller's minimum
    #[error("too little received: {amount_out} < {min_amount_out}")]
    TooLittleReceived {
        /// The caller's bound
        min_amount_out: Amount,
        /// The realized output
        amount_out: Amount,
    },
    /// The trade would cost more than the caller's maximum
    #[error("too much requested: {amount_in} > {max_amount_in}")]
    TooMuchRequested {
        /// The caller's bound
        max_amount_in: Amount,
        /// The required input
        amount_in: Amount,
    },
    /// The pool price crossed the caller's price limit
    #[error("price limit reached")]
    PriceLimitReached,
    /// No pool exists for a hop of the route
    #[error("no pool for {input} -[{fee}]-> {output}")]
    UnknownPool {
        /// The asset the hop consumes
        input: AssetId,
        /// The fee tier of the hop
        fee: FeeTier,
        /// The asset the hop yields
        output: AssetId,
    },
    /// The pools cannot fill the trade
    #[error("insufficient liquidity of {asset}: need {needed}, have {available}")]
    InsufficientLiquidity {
        /// The asset short
        asset: AssetId,
        /// The amount the trade needs
        needed: Amount,
        /// The amount available
        available: Amount,
    },
    /// The route could not be decoded
    #[error("malformed route: {0}")]
    MalformedRoute(#[from] RouteError),
    /// The router failed to move assets while settling the trade
    #[error("settlement failed: {0}")]
    Settlement(#[from] LedgerError),
    /// An error in the router's transport or execution environment
    #[error("router backend error: {0}")]
    Backend(String),
}

impl RouterError {
    /// Create a new backend error
    #[allow(clippy::needless_pass_by_value)]
    pub fn backend<T: ToString>(msg: T) -> Self {
        Self::Backend(msg.to_string())
    }
}

/// The error type returned by a swap protocol invocation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    /// The request failed validation before any effect was applied
    #[error("invalid request: {0}")]
    Request(#[from] RequestError),
    /// The caller's input could not be taken into custody
    #[error("custody acquisition failed: {0}")]
    Custody(LedgerError),
    /// The router could not be granted an allowance
    #[error("allowance grant failed: {0}")]
    AllowanceGrant(LedgerError),
    /// The router rejected or failed to execute the trade
    #[error("router failed: {0}")]
    Router(#[from] RouterError),
    /// Unspent input could not be refunded or its allowance revoked
    #[error("reconciliation failed: {0}")]
    Reconciliation(LedgerError),
    /// The proceeds could not be forwarded to the caller and remain in the
    /// orchestrator's custody
    #[error("forwarding {amount} of {asset} failed: {source}")]
    Forwarding {
        /// The asset stranded
        asset: AssetId,
        /// The amount stranded
        amount: Amount,
        /// The underlying failure
        source: LedgerError,
    },
    /// A collaborator reported a result that breaks the protocol's invariants
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    /// A step failed and undoing its predecessors failed too
    #[error("{failure}; compensation also failed: {cleanup}")]
    Compensation {
        /// The step failure that triggered compensation
        failure: Box<SwapError>,
        /// The first compensation failure
        cleanup: LedgerError,
    },
}

impl SwapError {
    /// Create a new invariant violation error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invariant_violation<T: ToString>(msg: T) -> Self {
        Self::InvariantViolation(msg.to_string())
    }

    /// The underlying step failure, looking through any compensation failure
    pub fn root_cause(&self) -> &SwapError {
        match self {
            SwapError::Compensation { failure, .. } => failure.root_cause(),
            other => other,
        }
    }
}
