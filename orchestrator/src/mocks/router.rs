//! A fixed-rate router settling against an [`InMemoryLedger`]

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use alloy_primitives::Address;
use async_trait::async_trait;
use common::types::{
    Amount, AssetId, Deadline,
    fee::FeeTier,
    request::SwapKind,
    route::Route,
    router_params::{
        ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
    },
};

use super::ledger::{InMemoryLedger, LedgerAccount};
use crate::{
    error::RouterError,
    traits::{AssetLedger, SwapRouter},
};

/// The price of a pool: `num` of the output per `den` of the input
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rate {
    /// The numerator
    pub num: Amount,
    /// The denominator
    pub den: Amount,
}

impl Rate {
    /// The output an input buys, rounded down
    fn output_for(&self, amount_in: Amount) -> Result<Amount, RouterError> {
        let scaled = amount_in.checked_mul(self.num).ok_or_else(overflow)?;
        Ok(scaled / self.den)
    }

    /// The input an output costs, rounded up
    fn input_for(&self, amount_out: Amount) -> Result<Amount, RouterError> {
        let scaled = amount_out.checked_mul(self.den).ok_or_else(overflow)?;
        Ok(scaled.div_ceil(self.num))
    }
}

/// The error for a quote that does not fit in 256 bits
fn overflow() -> RouterError {
    RouterError::backend("quote overflow")
}

/// A call made to the router
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouterCall {
    /// The entrypoint called
    pub kind: SwapKind,
    /// The recipient of the output
    pub recipient: Address,
    /// The deadline of the trade
    pub deadline: Deadline,
}

/// The state behind the router lock
#[derive(Default)]
struct RouterState {
    /// Pool rates keyed by `(input, fee, output)`
    rates: HashMap<(AssetId, FeeTier, AssetId), Rate>,
    /// The router's clock
    now: u64,
    /// A failure to return from the next call
    failure: Option<RouterError>,
    /// An amount to report from the next call in place of the real one
    misreport: Option<Amount>,
    /// Every call made, in order
    calls: Vec<RouterCall>,
}

/// A router that prices every pool at a fixed rate
///
/// All pools share one liquidity account. Input is pulled from `payer`
/// with the allowance it granted the router, and output is paid from the
/// pool account to the recipient
pub struct MockRouter {
    /// The router's ledger handle, spending the payer's allowance
    router: LedgerAccount,
    /// The pool liquidity's ledger handle
    pool: LedgerAccount,
    /// The account the router pulls input from
    payer: Address,
    /// Mutable router state
    state: Mutex<RouterState>,
}

impl MockRouter {
    /// Constructor
    pub fn new(ledger: &InMemoryLedger, address: Address, pool: Address, payer: Address) -> Self {
        Self {
            router: ledger.account(address),
            pool: ledger.account(pool),
            payer,
            state: Mutex::default(),
        }
    }

    /// Open a pool trading `input` for `output` at `num / den`
    ///
    /// The reverse direction is priced at the inverse rate
    pub fn set_rate(&self, input: AssetId, fee: FeeTier, output: AssetId, num: u128, den: u128) {
        let (num, den) = (Amount::from(num), Amount::from(den));
        let mut state = self.lock();
        state.rates.insert((input, fee, output), Rate { num, den });
        state.rates.insert((output, fee, input), Rate { num: den, den: num });
    }

    /// Set the router's clock
    pub fn set_time(&self, now: u64) {
        self.lock().now = now;
    }

    /// Fail the next call with `err`, before any settlement
    pub fn fail_next(&self, err: RouterError) {
        self.lock().failure = Some(err);
    }

    /// Report `amount` from the next call instead of the amount settled
    pub fn misreport_next(&self, amount: Amount) {
        self.lock().misreport = Some(amount);
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<RouterCall> {
        self.lock().calls.clone()
    }

    /// Lock the router state
    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().expect("router lock poisoned")
    }

    /// Log a call and check it against injected failures and the deadline
    fn begin(
        &self,
        kind: SwapKind,
        recipient: Address,
        deadline: Deadline,
    ) -> Result<(), RouterError> {
        let mut state = self.lock();
        state.calls.push(RouterCall { kind, recipient, deadline });
        if let Some(err) = state.failure.take() {
            return Err(err);
        }

        if state.now > deadline {
            return Err(RouterError::DeadlineElapsed { deadline, now: state.now });
        }
        Ok(())
    }

    /// The rate of one pool
    fn rate(&self, input: AssetId, fee: FeeTier, output: AssetId) -> Result<Rate, RouterError> {
        self.lock()
            .rates
            .get(&(input, fee, output))
            .copied()
            .ok_or(RouterError::UnknownPool { input, fee, output })
    }

    /// Quote the output of spending `amount_in` along a route
    fn quote_exact_input(&self, route: &Route, amount_in: Amount) -> Result<Amount, RouterError> {
        route.pools().try_fold(amount_in, |amount, (input, fee, output)| {
            self.rate(input, fee, output)?.output_for(amount)
        })
    }

    /// Quote the input needed to receive `amount_out` along a route
    fn quote_exact_output(&self, route: &Route, amount_out: Amount) -> Result<Amount, RouterError> {
        let pools = route.pools().collect::<Vec<_>>();
        pools.into_iter().rev().try_fold(amount_out, |amount, (input, fee, output)| {
            self.rate(input, fee, output)?.input_for(amount)
        })
    }

    /// Move the trade's assets and report `realized`, unless a misreport is
    /// pending
    async fn settle(
        &self,
        route: &Route,
        amount_in: Amount,
        amount_out: Amount,
        recipient: Address,
        realized: Amount,
    ) -> Result<Amount, RouterError> {
        let (input, output) = (route.input_asset(), route.output_asset());
        let available = self.pool.balance_of(output, self.pool.account()).await?;
        if available < amount_out {
            return Err(RouterError::InsufficientLiquidity {
                asset: output,
                needed: amount_out,
                available,
            });
        }

        self.router.transfer_from(input, self.payer, self.pool.account(), amount_in).await?;
        self.pool.transfer(output, recipient, amount_out).await?;

        Ok(self.lock().misreport.take().unwrap_or(realized))
    }

    /// Spend an exact input along a route
    async fn exact_input_route(
        &self,
        route: &Route,
        recipient: Address,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Result<Amount, RouterError> {
        let amount_out = self.quote_exact_input(route, amount_in)?;
        if amount_out < min_amount_out {
            return Err(RouterError::TooLittleReceived { min_amount_out, amount_out });
        }

        self.settle(route, amount_in, amount_out, recipient, amount_out).await
    }

    /// Receive an exact output along a route
    async fn exact_output_route(
        &self,
        route: &Route,
        recipient: Address,
        amount_out: Amount,
        max_amount_in: Amount,
    ) -> Result<Amount, RouterError> {
        let amount_in = self.quote_exact_output(route, amount_out)?;
        if amount_in > max_amount_in {
            return Err(RouterError::TooMuchRequested { max_amount_in, amount_in });
        }

        self.settle(route, amount_in, amount_out, recipient, amount_in).await
    }
}

#[async_trait]
impl SwapRouter for MockRouter {
    fn address(&self) -> Address {
        self.router.account()
    }

    async fn exact_input_single(
        &self,
        params: ExactInputSingleParams,
    ) -> Result<Amount, RouterError> {
        self.begin(SwapKind::ExactInputSingle, params.recipient, params.deadline)?;
        let route = Route::single(params.input_asset, params.fee, params.output_asset)?;
        self.exact_input_route(&route, params.recipient, params.amount_in, params.min_amount_out)
            .await
    }

    async fn exact_output_single(
        &self,
        params: ExactOutputSingleParams,
    ) -> Result<Amount, RouterError> {
        self.begin(SwapKind::ExactOutputSingle, params.recipient, params.deadline)?;
        let route = Route::single(params.input_asset, params.fee, params.output_asset)?;
        self.exact_output_route(&route, params.recipient, params.amount_out, params.max_amount_in)
            .await
    }

    async fn exact_input(&self, params: ExactInputParams) -> Result<Amount, RouterError> {
        self.begin(SwapKind::ExactInput, params.recipient, params.deadline)?;
        let route = params.route.decode()?;
        self.exact_input_route(&route, params.recipient, params.amount_in, params.min_amount_out)
            .await
    }

    async fn exact_output(&self, params: ExactOutputParams) -> Result<Amount, RouterError> {
        self.begin(SwapKind::ExactOutput, params.recipient, params.deadline)?;
        let route = params.route.decode()?;
        self.exact_output_route(&route, params.recipient, params.amount_out, params.max_amount_in)
            .await
    }
}
