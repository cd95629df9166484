//! End-to-end loop behaviour against scripted feeds, on paused time.

use async_trait::async_trait;
use peg_guardian::{
    advisory::AdvisoryService,
    agent::{AgentSettings, CycleOutcome, GuardianAgent, LoopState},
    execution::TradeExecutor,
    feed::{SimulatedVenueFeed, VenueFeed},
    Config, GuardianError, GuardianResult, MarketContext, Opportunity, Recommendation,
    RiskAssessment, VenueSnapshot,
};
use rand::{rngs::StdRng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

fn config(pairs: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

/// Deep pools and a 10k trade: low risk, ~$60 net, always EXECUTE.
fn executing_feed() -> SimulatedVenueFeed {
    SimulatedVenueFeed::empty(dec!(20))
        .with_venue("Pool A", "0x1", dec!(0.998), dec!(6000000))
        .with_venue("Pool B", "0x2", dec!(1.004), dec!(6000000))
}

fn executor() -> TradeExecutor {
    TradeExecutor::simulated(StdRng::seed_from_u64(11)).with_latency(Duration::from_millis(1500))
}

fn agent(feed: Box<dyn VenueFeed>, iterations: Option<u64>) -> GuardianAgent {
    let config = config(&[("TRADE_SIZE_USD", "10000")]);
    GuardianAgent::new(&config, feed, executor())
        .unwrap()
        .with_settings(AgentSettings { iterations, ..Default::default() })
}

struct UnreachableFeed;

#[async_trait]
impl VenueFeed for UnreachableFeed {
    async fn fetch_snapshots(&self) -> GuardianResult<Vec<VenueSnapshot>> {
        Err(GuardianError::feed("connection refused", None))
    }

    async fn current_fee_level(&self) -> GuardianResult<Decimal> {
        Err(GuardianError::feed("connection refused", None))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

struct BrokenAdvisor;

#[async_trait]
impl AdvisoryService for BrokenAdvisor {
    async fn explain(
        &self,
        _opportunity: &Opportunity,
        _assessment: &RiskAssessment,
        _context: &MarketContext,
    ) -> GuardianResult<String> {
        Err(GuardianError::AdvisoryUnavailable { message: "503 from upstream".into() })
    }

    fn name(&self) -> &str {
        "broken"
    }
}

struct CannedAdvisor;

#[async_trait]
impl AdvisoryService for CannedAdvisor {
    async fn explain(
        &self,
        opportunity: &Opportunity,
        _assessment: &RiskAssessment,
        context: &MarketContext,
    ) -> GuardianResult<String> {
        Ok(format!("{} looks fine across {} candidate(s)", opportunity.route(), context.candidate_count))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[tokio::test(start_paused = true)]
async fn bounded_run_executes_every_cycle_and_skips_the_final_delay() {
    let mut agent = agent(Box::new(executing_feed()), Some(3));
    let (_stop, shutdown) = watch::channel(false);
    let started = Instant::now();

    let summary = agent.run(shutdown).await.unwrap();

    assert_eq!(agent.state(), LoopState::Stopped);
    assert_eq!(summary.cycles_completed, 3);
    assert_eq!(summary.decisions_made, 3);
    assert_eq!(summary.decisions_by_recommendation.get("EXECUTE"), Some(&3));
    assert_eq!(summary.total_executions, 3);
    assert_eq!(agent.history().len(), 3);
    assert_eq!(
        summary.successful_executions + summary.failed_executions,
        summary.total_executions
    );

    // 3 × 1.5s execution + 2 × 10s between cycles
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(24_500), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(25_500), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn feed_outages_back_off_and_never_stop_the_loop() {
    let mut agent = agent(Box::new(UnreachableFeed), Some(2));
    let (_stop, shutdown) = watch::channel(false);
    let started = Instant::now();

    let summary = agent.run(shutdown).await.unwrap();

    assert_eq!(summary.cycles_completed, 2);
    assert_eq!(summary.total_executions, 0);
    assert_eq!(summary.error_counts.get("feed_unavailable"), Some(&2));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6), "{:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn quiet_markets_produce_no_decision() {
    let flat = SimulatedVenueFeed::empty(dec!(20))
        .with_venue("Pool A", "0x1", dec!(1.000), dec!(2000000))
        .with_venue("Pool B", "0x2", dec!(1.001), dec!(1000000));
    let mut agent = agent(Box::new(flat), None);

    assert!(matches!(agent.run_cycle().await, CycleOutcome::NoCandidates));
    assert!(agent.history().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stop_request_lets_the_in_flight_cycle_finish() {
    let mut agent = agent(Box::new(executing_feed()), None);
    let (stop, shutdown) = watch::channel(false);

    // Cycle 2 starts at 11.5s and is mid-execution when the stop lands at 12s.
    let (summary, _) = tokio::join!(agent.run(shutdown), async move {
        tokio::time::sleep(Duration::from_secs(12)).await;
        stop.send(true).unwrap();
    });

    let summary = summary.unwrap();
    assert_eq!(summary.cycles_completed, 2);
    assert_eq!(summary.total_executions, 2);
    assert_eq!(agent.state(), LoopState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn stop_before_start_runs_nothing() {
    let mut agent = agent(Box::new(executing_feed()), None);
    let (_stop, shutdown) = watch::channel(true);

    let summary = agent.run(shutdown).await.unwrap();
    assert_eq!(summary.cycles_completed, 0);
    assert!(agent.run(watch::channel(false).1).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn advisory_failure_falls_back_to_rationale() {
    let mut agent = agent(Box::new(executing_feed()), None).with_advisor(Box::new(BrokenAdvisor));

    let CycleOutcome::Decided { decision, record } = agent.run_cycle().await else {
        panic!("expected a decision");
    };

    assert_eq!(decision.recommendation, Recommendation::Execute);
    assert!(decision.advisory.is_none());
    assert_eq!(decision.explanation(), decision.rationale);
    assert!(record.is_some());
    assert_eq!(agent.summary().error_counts.get("advisory_unavailable"), Some(&1));
}

#[tokio::test(start_paused = true)]
async fn advisory_text_is_attached_when_available() {
    let mut agent = agent(Box::new(executing_feed()), None).with_advisor(Box::new(CannedAdvisor));

    let CycleOutcome::Decided { decision, .. } = agent.run_cycle().await else {
        panic!("expected a decision");
    };
    assert_eq!(decision.explanation(), "Pool A → Pool B looks fine across 1 candidate(s)");
}

#[tokio::test(start_paused = true)]
async fn waits_and_skips_leave_history_untouched() {
    // Default 1k trade on the standard pools nets ~$6: above minimum, below the execute bar.
    let config = Config::default();
    let mut agent = GuardianAgent::new(&config, Box::new(SimulatedVenueFeed::new(dec!(20))), executor()).unwrap();

    let CycleOutcome::Decided { decision, record } = agent.run_cycle().await else {
        panic!("expected a decision");
    };
    assert_eq!(decision.recommendation, Recommendation::Wait);
    assert!(decision.selected.is_some());
    assert!(record.is_none());

    let strict = config_with_min_profit("100");
    let mut agent = GuardianAgent::new(&strict, Box::new(executing_feed()), executor()).unwrap();
    let CycleOutcome::Decided { decision, record } = agent.run_cycle().await else {
        panic!("expected a decision");
    };
    assert_eq!(decision.recommendation, Recommendation::Skip);
    assert!(decision.selected.is_none());
    assert!(record.is_none());
    assert!(agent.history().is_empty());
}

fn config_with_min_profit(min: &str) -> Config {
    config(&[("TRADE_SIZE_USD", "10000"), ("MIN_PROFIT_USD", min)])
}

#[tokio::test(start_paused = true)]
async fn dashboard_sees_each_cycle() {
    let mut agent = agent(Box::new(executing_feed()), None);
    let dashboard = agent.subscribe();
    assert_eq!(dashboard.borrow().cycle, 0);

    agent.run_cycle().await;

    let snapshot = dashboard.borrow().clone();
    assert_eq!(snapshot.cycle, 1);
    assert_eq!(snapshot.recent_opportunities.len(), 1);
    assert_eq!(snapshot.execution_history.len(), 1);
    let breakdown = snapshot.latest_risk_factor_breakdown.unwrap();
    assert_eq!(breakdown.liquidity_risk, 10);
}
