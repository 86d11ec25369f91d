//! The orchestrator's public entrypoints
//!
//! Each entrypoint validates a request, builds the task for its protocol,
//! and drives the task to completion for the authenticated caller

use std::sync::Arc;

use alloy_primitives::Address;
use common::types::{
    outcome::SwapOutcome,
    request::{
        ExactInputRequest, ExactInputSingleRequest, ExactOutputRequest, ExactOutputSingleRequest,
        SlippagePolicy, SwapRequest,
    },
};
use tracing::instrument;

use crate::{
    driver::run_task_to_completion,
    error::SwapError,
    tasks::{ExactInputTask, ExactOutputTask, SwapContext},
    traits::{AssetLedger, SwapRouter},
};

/// Swaps assets through a router on behalf of callers
///
/// The orchestrator holds no state between invocations; anything it takes
/// into custody during a swap is forwarded, refunded, or returned before the
/// swap resolves
pub struct SwapOrchestrator<L, R> {
    /// The ledger handle acting for the orchestrator's custody account
    ledger: Arc<L>,
    /// The router trades are executed on
    router: Arc<R>,
    /// The slippage bounds requests must meet
    policy: SlippagePolicy,
}

impl<L, R> Clone for SwapOrchestrator<L, R> {
    fn clone(&self) -> Self {
        Self { ledger: self.ledger.clone(), router: self.router.clone(), policy: self.policy }
    }
}

impl<L: AssetLedger + 'static, R: SwapRouter + 'static> SwapOrchestrator<L, R> {
    /// Constructor
    pub fn new(ledger: L, router: R, policy: SlippagePolicy) -> Self {
        Self::from_shared(Arc::new(ledger), Arc::new(router), policy)
    }

    /// Construct an orchestrator over collaborators shared with other owners
    pub fn from_shared(ledger: Arc<L>, router: Arc<R>, policy: SlippagePolicy) -> Self {
        Self { ledger, router, policy }
    }

    /// The orchestrator's custody address, which callers approve to spend
    /// their input
    pub fn address(&self) -> Address {
        self.ledger.account()
    }

    /// The slippage policy requests are checked against
    pub fn policy(&self) -> &SlippagePolicy {
        &self.policy
    }

    /// Spend exactly `amount_in` of the input asset through one pool
    #[instrument(
        skip_all, err,
        fields(caller = %caller, input = %req.input_asset, output = %req.output_asset, amount_in = %req.amount_in)
    )]
    pub async fn exact_input_single(
        &self,
        caller: Address,
        req: ExactInputSingleRequest,
    ) -> Result<SwapOutcome, SwapError> {
        req.validate(&self.policy)?;
        run_task_to_completion(ExactInputTask::new(self.context(caller), req)).await
    }

    /// Receive exactly `amount_out` of the output asset through one pool
    #[instrument(
        skip_all, err,
        fields(caller = %caller, input = %req.input_asset, output = %req.output_asset, amount_out = %req.amount_out)
    )]
    pub async fn exact_output_single(
        &self,
        caller: Address,
        req: ExactOutputSingleRequest,
    ) -> Result<SwapOutcome, SwapError> {
        req.validate(&self.policy)?;
        run_task_to_completion(ExactOutputTask::new(self.context(caller), req)).await
    }

    /// Spend exactly `amount_in` of the input asset along a route
    #[instrument(
        skip_all, err,
        fields(caller = %caller, input = %req.input_asset(), output = %req.output_asset(), amount_in = %req.amount_in)
    )]
    pub async fn exact_input(
        &self,
        caller: Address,
        req: ExactInputRequest,
    ) -> Result<SwapOutcome, SwapError> {
        req.validate(&self.policy)?;
        run_task_to_completion(ExactInputTask::new(self.context(caller), req)).await
    }

    /// Receive exactly `amount_out` of the output asset along a route
    #[instrument(
        skip_all, err,
        fields(caller = %caller, input = %req.input_asset(), output = %req.output_asset(), amount_out = %req.amount_out)
    )]
    pub async fn exact_output(
        &self,
        caller: Address,
        req: ExactOutputRequest,
    ) -> Result<SwapOutcome, SwapError> {
        req.validate(&self.policy)?;
        run_task_to_completion(ExactOutputTask::new(self.context(caller), req)).await
    }

    /// Execute a request of any shape
    pub async fn execute(
        &self,
        caller: Address,
        req: SwapRequest,
    ) -> Result<SwapOutcome, SwapError> {
        match req {
            SwapRequest::ExactInputSingle(req) => self.exact_input_single(caller, req).await,
            SwapRequest::ExactOutputSingle(req) => self.exact_output_single(caller, req).await,
            SwapRequest::ExactInput(req) => self.exact_input(caller, req).await,
            SwapRequest::ExactOutput(req) => self.exact_output(caller, req).await,
        }
    }

    /// A fresh context for one invocation
    fn context(&self, caller: Address) -> SwapContext<L, R> {
        SwapContext::new(self.ledger.clone(), self.router.clone(), caller)
    }
}

#[cfg(test)]
mod test {
    use alloy_primitives::{U256, address, aliases::U160};
    use common::types::{
        AssetId,
        fee::FeeTier,
        request::RequestError,
        route::{Hop, Route},
    };

    use super::*;
    use crate::{
        error::{LedgerError, RouterError},
        mocks::{InMemoryLedger, LedgerAccount, LedgerCall, LedgerOp, MockRouter},
    };

    /// The orchestrator's custody account
    const CUSTODIAN: Address = address!("0x00000000000000000000000000000000000000c0");
    /// The caller
    const CALLER: Address = address!("0x00000000000000000000000000000000000000ca");
    /// The router
    const ROUTER: Address = address!("0x00000000000000000000000000000000000000f0");
    /// The router's pool liquidity
    const POOL: Address = address!("0x00000000000000000000000000000000000000b0");
    /// Asset A
    const A: AssetId = address!("0x1111111111111111111111111111111111111111");
    /// Asset B
    const B: AssetId = address!("0x2222222222222222222222222222222222222222");
    /// Asset C
    const C: AssetId = address!("0x3333333333333333333333333333333333333333");

    /// The deadline of every request
    const DEADLINE: u64 = 1_000;

    /// `n` whole units of an 18-decimal asset
    fn units(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    /// The collaborators of a test orchestrator
    struct Harness {
        /// The shared ledger
        ledger: InMemoryLedger,
        /// The router
        router: Arc<MockRouter>,
        /// The orchestrator under test
        orchestrator: SwapOrchestrator<LedgerAccount, MockRouter>,
    }

    impl Harness {
        /// The balance of an account
        fn balance(&self, asset: AssetId, owner: Address) -> U256 {
            self.ledger.balance(asset, owner)
        }

        /// The operations the custody account performed
        fn custodian_ops(&self) -> Vec<LedgerOp> {
            self.ledger.calls_by(CUSTODIAN).iter().map(LedgerCall::op).collect()
        }

        /// Whether the orchestrator holds nothing and has approved nothing
        fn custody_clear(&self) -> bool {
            [A, B, C].into_iter().all(|asset| {
                self.balance(asset, CUSTODIAN).is_zero()
                    && self.ledger.allowance_of(asset, CUSTODIAN, ROUTER).is_zero()
            })
        }
    }

    /// Set up a funded caller, a funded pool, and an orchestrator with the
    /// given policy
    fn setup_with_policy(policy: SlippagePolicy) -> Harness {
        let ledger = InMemoryLedger::new();
        ledger.mint(A, CALLER, units(10_000));
        for asset in [A, B, C] {
            ledger.mint(asset, POOL, units(10_000));
        }
        ledger.set_allowance(A, CALLER, CUSTODIAN, units(10_000));

        let router = Arc::new(MockRouter::new(&ledger, ROUTER, POOL, CUSTODIAN));
        let orchestrator =
            SwapOrchestrator::from_shared(Arc::new(ledger.account(CUSTODIAN)), router.clone(), policy);

        Harness { ledger, router, orchestrator }
    }

    /// Set up a harness with a strict slippage policy
    fn setup() -> Harness {
        setup_with_policy(SlippagePolicy::strict())
    }

    /// A request to spend 1000 A for at least 1.9 B
    fn sell_a_for_b() -> ExactInputSingleRequest {
        ExactInputSingleRequest {
            input_asset: A,
            output_asset: B,
            fee: FeeTier::MEDIUM,
            deadline: DEADLINE,
            amount_in: units(1_000),
            min_amount_out: units(19) / U256::from(10u64),
            sqrt_price_limit_x96: U160::ZERO,
        }
    }

    /// A request to buy 2 B for at most `max` A
    fn buy_b_with_a(max: U256) -> ExactOutputSingleRequest {
        ExactOutputSingleRequest {
            input_asset: A,
            output_asset: B,
            fee: FeeTier::MEDIUM,
            deadline: DEADLINE,
            amount_out: units(2),
            max_amount_in: max,
            sqrt_price_limit_x96: U160::ZERO,
        }
    }

    /// The route A -[3000]-> C -[500]-> B
    fn route_a_c_b() -> Route {
        Route::new(A, vec![Hop::new(FeeTier::MEDIUM, C), Hop::new(FeeTier::LOW, B)]).unwrap()
    }

    // --------------------
    // | Successful Swaps |
    // --------------------

    /// Tests a single-hop exact-input swap
    #[tokio::test]
    async fn test_exact_input_single() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);

        let outcome = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await.unwrap();
        let expected_out = units(198) / U256::from(100u64);

        assert_eq!(outcome.amount_in, units(1_000));
        assert_eq!(outcome.amount_out, expected_out);
        assert_eq!(outcome.refunded, U256::ZERO);
        assert_eq!(h.balance(A, CALLER), units(9_000));
        assert_eq!(h.balance(B, CALLER), expected_out);
        assert!(h.custody_clear());

        // The router always delivers into custody
        let calls = h.router.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].recipient, CUSTODIAN);
        assert_eq!(calls[0].deadline, DEADLINE);
    }

    /// Tests a single-hop exact-output swap that spends less than its maximum
    #[tokio::test]
    async fn test_exact_output_single_refund() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);

        let outcome = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_010))).await;
        let outcome = outcome.unwrap();

        assert_eq!(outcome.amount_in, units(1_005));
        assert_eq!(outcome.amount_out, units(2));
        assert_eq!(outcome.refunded, units(5));
        assert_eq!(h.balance(A, CALLER), units(8_995));
        assert_eq!(h.balance(B, CALLER), units(2));
        assert!(h.custody_clear());
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Approve,
            LedgerOp::Transfer,
            LedgerOp::Transfer,
        ]);
    }

    /// Tests that an exact-output swap spending its full maximum makes no
    /// reconciliation calls
    #[tokio::test]
    async fn test_exact_output_single_no_leftover() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);

        let outcome = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_005))).await;
        let outcome = outcome.unwrap();

        assert_eq!(outcome.refunded, U256::ZERO);
        assert_eq!(h.balance(A, CALLER), units(8_995));
        assert!(h.custody_clear());
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Transfer,
        ]);
    }

    /// Tests a multi-hop exact-input swap
    #[tokio::test]
    async fn test_exact_input_multi_hop() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, C, 2, 1);
        h.router.set_rate(C, FeeTier::LOW, B, 97, 100_000);

        let req = ExactInputRequest {
            route: route_a_c_b().forward(),
            deadline: DEADLINE,
            amount_in: units(500),
            min_amount_out: units(9) / U256::from(10u64),
        };
        let outcome = h.orchestrator.exact_input(CALLER, req).await.unwrap();
        let expected_out = units(97) / U256::from(100u64);

        assert_eq!(outcome.input_asset, A);
        assert_eq!(outcome.output_asset, B);
        assert_eq!(outcome.amount_out, expected_out);
        assert_eq!(h.balance(A, CALLER), units(9_500));
        assert_eq!(h.balance(B, CALLER), expected_out);
        assert_eq!(h.balance(C, CALLER), U256::ZERO);
        assert!(h.custody_clear());
    }

    /// Tests a multi-hop exact-output swap
    #[tokio::test]
    async fn test_exact_output_multi_hop() {
        let h = setup();
        // 1 B costs 4 C, which costs 2 A
        h.router.set_rate(A, FeeTier::MEDIUM, C, 2, 1);
        h.router.set_rate(C, FeeTier::LOW, B, 1, 4);

        let req = ExactOutputRequest {
            route: route_a_c_b().reverse(),
            deadline: DEADLINE,
            amount_out: units(1),
            max_amount_in: units(3),
        };
        let outcome = h.orchestrator.exact_output(CALLER, req).await.unwrap();

        assert_eq!(outcome.amount_in, units(2));
        assert_eq!(outcome.refunded, units(1));
        assert_eq!(h.balance(A, CALLER), units(9_998));
        assert_eq!(h.balance(B, CALLER), units(1));
        assert!(h.custody_clear());
    }

    /// Tests dispatching a request of any shape
    #[tokio::test]
    async fn test_execute_dispatch() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);

        let req = SwapRequest::ExactInputSingle(sell_a_for_b());
        let outcome = h.orchestrator.execute(CALLER, req).await.unwrap();
        assert_eq!(outcome.amount_out, units(198) / U256::from(100u64));
    }

    // -------------------
    // | Rejected Swaps |
    // -------------------

    /// Tests that permissive slippage bounds are rejected before any effect
    #[tokio::test]
    async fn test_unbounded_slippage_rejected() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);

        let req = ExactInputSingleRequest { min_amount_out: U256::ZERO, ..sell_a_for_b() };
        let res = h.orchestrator.exact_input_single(CALLER, req).await;
        assert_eq!(res, Err(SwapError::Request(RequestError::UnboundedMinOutput)));

        let res = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(U256::MAX)).await;
        assert_eq!(res, Err(SwapError::Request(RequestError::UnboundedMaxInput)));

        assert!(h.ledger.calls().is_empty());
        assert!(h.router.calls().is_empty());
    }

    /// Tests that a permissive policy executes unbounded requests
    #[tokio::test]
    async fn test_unbounded_slippage_permitted() {
        let h = setup_with_policy(SlippagePolicy::permissive());
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);

        let req = ExactInputSingleRequest { min_amount_out: U256::ZERO, ..sell_a_for_b() };
        let outcome = h.orchestrator.exact_input_single(CALLER, req).await.unwrap();
        assert_eq!(outcome.amount_out, units(198) / U256::from(100u64));
    }

    /// Tests that a trade past its deadline leaves balances untouched
    #[tokio::test]
    async fn test_deadline_elapsed() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);
        h.router.set_time(DEADLINE + 1);

        let res = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await;
        assert!(matches!(res, Err(SwapError::Router(RouterError::DeadlineElapsed { .. }))));
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert_eq!(h.balance(B, CALLER), U256::ZERO);
        assert!(h.custody_clear());
    }

    /// Tests that a trade below its minimum output leaves balances untouched
    #[tokio::test]
    async fn test_too_little_received() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 1, 1_000);

        let res = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await;
        assert!(matches!(res, Err(SwapError::Router(RouterError::TooLittleReceived { .. }))));
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.custody_clear());
    }

    /// Tests that an exact-output trade above its maximum input leaves
    /// balances untouched
    #[tokio::test]
    async fn test_too_much_requested() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);

        let res = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_000))).await;
        assert!(matches!(res, Err(SwapError::Router(RouterError::TooMuchRequested { .. }))));
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.custody_clear());
    }

    /// Tests that a route through an unopened pool leaves balances untouched
    #[tokio::test]
    async fn test_unknown_pool() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, C, 2, 1);

        let req = ExactInputRequest {
            route: route_a_c_b().forward(),
            deadline: DEADLINE,
            amount_in: units(500),
            min_amount_out: U256::from(1u64),
        };
        let res = h.orchestrator.exact_input(CALLER, req).await;
        assert!(matches!(res, Err(SwapError::Router(RouterError::UnknownPool { .. }))));
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.custody_clear());
    }

    // ---------------------
    // | Failure Injection |
    // ---------------------

    /// Tests a failure to take custody of the input
    #[tokio::test]
    async fn test_custody_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);
        h.ledger.fail_next(LedgerOp::TransferFrom, A);

        let res = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await;
        assert!(matches!(res, Err(SwapError::Custody(LedgerError::Backend(_)))));
        assert_eq!(h.custodian_ops(), vec![LedgerOp::TransferFrom]);
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.router.calls().is_empty());
    }

    /// Tests that a failed allowance grant returns custody
    #[tokio::test]
    async fn test_allowance_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);
        h.ledger.fail_next(LedgerOp::Approve, A);

        let res = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await;
        assert!(matches!(res, Err(SwapError::AllowanceGrant(_))));
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Transfer,
        ]);
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.custody_clear());
        assert!(h.router.calls().is_empty());
    }

    /// Tests that a router failure revokes the allowance and returns custody
    #[tokio::test]
    async fn test_router_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);
        h.router.fail_next(RouterError::backend("reverted"));

        let res = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_010))).await;
        assert!(matches!(res, Err(SwapError::Router(RouterError::Backend(_)))));
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Approve,
            LedgerOp::Transfer,
        ]);
        assert_eq!(h.balance(A, CALLER), units(10_000));
        assert!(h.custody_clear());
    }

    /// Tests that a failed compensation is reported alongside the step failure
    #[tokio::test]
    async fn test_compensation_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);
        h.router.fail_next(RouterError::backend("reverted"));
        h.ledger.fail_next(LedgerOp::Transfer, A);

        let err = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await.unwrap_err();
        assert!(matches!(err, SwapError::Compensation { .. }));
        assert!(matches!(err.root_cause(), SwapError::Router(_)));

        // The allowance is still revoked; the custody return is what failed
        assert!(h.ledger.allowance_of(A, CUSTODIAN, ROUTER).is_zero());
        assert_eq!(h.balance(A, CUSTODIAN), units(1_000));
    }

    /// Tests that a failed forward leaves the proceeds in custody and reports
    /// them
    #[tokio::test]
    async fn test_forwarding_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 198, 100_000);
        h.ledger.fail_next(LedgerOp::Transfer, B);

        let res = h.orchestrator.exact_input_single(CALLER, sell_a_for_b()).await;
        let expected_out = units(198) / U256::from(100u64);
        match res {
            Err(SwapError::Forwarding { asset, amount, .. }) => {
                assert_eq!(asset, B);
                assert_eq!(amount, expected_out);
            },
            other => panic!("expected forwarding failure, got {other:?}"),
        }

        // The trade settled, so the input is not returned
        assert_eq!(h.balance(A, CALLER), units(9_000));
        assert_eq!(h.balance(B, CUSTODIAN), expected_out);
    }

    /// Tests that a failed refund is reported and retried by the unwind
    #[tokio::test]
    async fn test_reconciliation_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);
        h.ledger.fail_next(LedgerOp::Transfer, A);

        let res = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_010))).await;
        assert!(matches!(res, Err(SwapError::Reconciliation(LedgerError::Backend(_)))));

        // The unspent input and the proceeds both reach the caller
        assert_eq!(h.balance(A, CALLER), units(8_995));
        assert_eq!(h.balance(B, CALLER), units(2));
        assert!(h.custody_clear());
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Approve,
            LedgerOp::Transfer,
            LedgerOp::Transfer,
            LedgerOp::Transfer,
        ]);
    }

    /// Tests that a failed allowance revocation is retried by the unwind
    #[tokio::test]
    async fn test_revocation_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);
        // The grant goes through; the revocation of the residual 5 A fails
        h.ledger.fail_after(LedgerOp::Approve, A, 1);

        let res = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_010))).await;
        assert!(matches!(res, Err(SwapError::Reconciliation(LedgerError::Backend(_)))));

        assert!(h.ledger.allowance_of(A, CUSTODIAN, ROUTER).is_zero());
        assert_eq!(h.balance(A, CALLER), units(8_995));
        assert_eq!(h.balance(B, CALLER), units(2));
        assert!(h.custody_clear());
        assert_eq!(h.custodian_ops(), vec![
            LedgerOp::TransferFrom,
            LedgerOp::Approve,
            LedgerOp::Approve,
            LedgerOp::Transfer,
            LedgerOp::Approve,
            LedgerOp::Transfer,
        ]);
    }

    /// Tests that a failed refund after a multi-hop exact-output swap is
    /// unwound along with the proceeds
    #[tokio::test]
    async fn test_exact_output_multi_hop_refund_failure() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, C, 2, 1);
        h.router.set_rate(C, FeeTier::LOW, B, 1, 4);
        h.ledger.fail_next(LedgerOp::Transfer, A);

        let req = ExactOutputRequest {
            route: route_a_c_b().reverse(),
            deadline: DEADLINE,
            amount_out: units(1),
            max_amount_in: units(3),
        };
        let res = h.orchestrator.exact_output(CALLER, req).await;
        assert!(matches!(res, Err(SwapError::Reconciliation(_))));

        // The trade settled through C, which never reaches the caller
        assert_eq!(h.balance(A, CALLER), units(9_998));
        assert_eq!(h.balance(B, CALLER), units(1));
        assert_eq!(h.balance(C, CALLER), U256::ZERO);
        assert!(h.custody_clear());
    }

    /// Tests that a router reporting more input than it was approved for is
    /// caught, and that custody is still returned in full
    #[tokio::test]
    async fn test_router_overspend_reported() {
        let h = setup();
        h.router.set_rate(A, FeeTier::MEDIUM, B, 2, 1_005);
        h.router.misreport_next(units(2_000));

        let err = h.orchestrator.exact_output_single(CALLER, buy_b_with_a(units(1_010))).await;
        let err = err.unwrap_err();
        assert!(matches!(err, SwapError::InvariantViolation(_)));

        // The router really spent 1005 A; the rest and the output are returned
        assert_eq!(h.balance(A, CALLER), units(8_995));
        assert_eq!(h.balance(B, CALLER), units(2));
        assert!(h.custody_clear());
    }
}
