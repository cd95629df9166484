//! Statistical behaviour of the simulated executor

use peg_guardian::{
    execution::{is_well_formed_reference, TradeExecutor, SIMULATED_GAS_USED},
    feed::{SimulatedVenueFeed, VenueFeed},
    ExecutionOutcome, Opportunity, VenueSnapshot,
};
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal_macros::dec;
use std::time::Duration;

fn opportunity() -> Opportunity {
    Opportunity::between(
        "opp_stats".to_string(),
        VenueSnapshot::new("Pool A", "0x1", dec!(0.998), dec!(6000000)),
        VenueSnapshot::new("Pool B", "0x2", dec!(1.004), dec!(6000000)),
        dec!(0.6012),
        dec!(10000),
        dec!(60.12),
        dec!(0.02),
    )
}

#[tokio::test(start_paused = true)]
async fn success_rate_and_profit_spread_match_the_model() {
    let mut executor = TradeExecutor::simulated(StdRng::seed_from_u64(42)).with_latency(Duration::ZERO);
    let opp = opportunity();
    let low = opp.net_profit_usd * dec!(0.95);
    let high = opp.net_profit_usd * dec!(1.05);

    let mut successes = 0;
    for _ in 0..1000 {
        let record = executor.execute(&opp).await;
        assert_eq!(record.estimated_profit_usd, opp.net_profit_usd);

        match record.outcome {
            ExecutionOutcome::Success => {
                successes += 1;
                let realized = record.realized_profit_usd.unwrap();
                assert!(realized >= low && realized <= high, "realized {} outside band", realized);
                assert_eq!(record.gas_used, Some(SIMULATED_GAS_USED));
                assert!(is_well_formed_reference(record.action_reference.as_deref().unwrap()));
            }
            ExecutionOutcome::Failure => {
                assert!(record.realized_profit_usd.is_none());
                assert!(record.action_reference.is_none());
                assert!(record.error_message.is_some());
            }
        }
    }

    assert!((850..=950).contains(&successes), "{} successes out of 1000", successes);
}

#[tokio::test(start_paused = true)]
async fn same_seed_same_outcomes() {
    let opp = opportunity();
    let mut a = TradeExecutor::simulated(StdRng::seed_from_u64(5)).with_latency(Duration::ZERO);
    let mut b = TradeExecutor::simulated(StdRng::seed_from_u64(5)).with_latency(Duration::ZERO);

    for _ in 0..20 {
        let left = a.execute(&opp).await;
        let right = b.execute(&opp).await;
        assert_eq!(left.outcome, right.outcome);
        assert_eq!(left.realized_profit_usd, right.realized_profit_usd);
        assert_eq!(left.action_reference, right.action_reference);
    }
}

#[test]
fn simulated_feed_is_stable_between_calls() {
    let feed = SimulatedVenueFeed::new(dec!(20));
    let first = tokio_test::block_on(feed.fetch_snapshots()).unwrap();
    let second = tokio_test::block_on(feed.fetch_snapshots()).unwrap();

    let prices = |snapshots: &[VenueSnapshot]| snapshots.iter().map(|s| s.price).collect::<Vec<_>>();
    assert_eq!(prices(&first), prices(&second));
    tokio_test::assert_ok!(tokio_test::block_on(feed.current_fee_level()));
}
