//! The evaluation loop: feed → detect → score → decide → (execute) → history

use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use super::{
    history::{RunHistory, RunSummary},
    state::LoopState,
};
use crate::{
    advisory::{advise_with_timeout, AdvisoryService, RuleBasedAdvisor},
    arbitrage::detector::OpportunityDetector,
    config::{Config, CYCLE_DELAY_SECS, DEFAULT_ADVISORY_TIMEOUT_SECS, IDLE_BACKOFF_SECS},
    decision::engine::{select_best, DecisionEngine},
    errors::{ErrorRecovery, GuardianError, GuardianResult},
    execution::TradeExecutor,
    feed::VenueFeed,
    risk::{factors::PEG_REFERENCE_PRICE, RiskScorer},
    storage::Journal,
    types::{
        DashboardSnapshot, Decision, ExecutionRecord, MarketContext, Recommendation,
        RiskFactors, ScoredOpportunity, VenueSnapshot,
    },
    utils::display::{print_decision, print_execution_record},
};

const DEFAULT_RECENT_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// `None` runs until cancelled.
    pub iterations: Option<u64>,
    pub idle_backoff: Duration,
    pub cycle_delay: Duration,
    pub advisory_timeout: Duration,
    /// Cap on opportunities and records kept in the dashboard snapshot.
    pub recent_limit: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            iterations: None,
            idle_backoff: Duration::from_secs(IDLE_BACKOFF_SECS),
            cycle_delay: Duration::from_secs(CYCLE_DELAY_SECS),
            advisory_timeout: Duration::from_secs(DEFAULT_ADVISORY_TIMEOUT_SECS),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl AgentSettings {
    pub fn from_config(config: &Config, iterations: Option<u64>) -> Self {
        Self {
            iterations,
            advisory_timeout: config.advisory_timeout(),
            ..Default::default()
        }
    }
}

/// What a single cycle ended with.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    FeedUnavailable,
    NoCandidates,
    Decided {
        decision: Decision,
        record: Option<ExecutionRecord>,
    },
}

pub struct GuardianAgent {
    feed: Box<dyn VenueFeed>,
    detector: OpportunityDetector,
    scorer: RiskScorer,
    engine: DecisionEngine,
    advisor: Box<dyn AdvisoryService>,
    executor: TradeExecutor,
    journal: Journal,
    settings: AgentSettings,
    history: RunHistory,
    recovery: ErrorRecovery,
    state: LoopState,
    dashboard: watch::Sender<DashboardSnapshot>,
    recent: Vec<ScoredOpportunity>,
    cycles_completed: u64,
    opportunities_detected: u64,
    decisions_made: u64,
    decision_counts: BTreeMap<String, u64>,
}

impl GuardianAgent {
    pub fn new(
        config: &Config,
        feed: Box<dyn VenueFeed>,
        executor: TradeExecutor,
    ) -> GuardianResult<Self> {
        let detector = OpportunityDetector::new(config.min_divergence, config.trade_size_usd)?;
        let (dashboard, _) = watch::channel(DashboardSnapshot::default());

        Ok(Self {
            feed,
            detector,
            scorer: RiskScorer::new(config.min_profit_usd),
            engine: DecisionEngine::new(config.min_profit_usd),
            advisor: Box::new(RuleBasedAdvisor),
            executor,
            journal: Journal::disabled(),
            settings: AgentSettings::from_config(config, None),
            history: RunHistory::new(),
            recovery: ErrorRecovery::new(),
            state: LoopState::Idle,
            dashboard,
            recent: Vec::new(),
            cycles_completed: 0,
            opportunities_detected: 0,
            decisions_made: 0,
            decision_counts: BTreeMap::new(),
        })
    }

    pub fn with_advisor(mut self, advisor: Box<dyn AdvisoryService>) -> Self {
        self.advisor = advisor;
        self
    }

    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn with_settings(mut self, settings: AgentSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Read-only feed of dashboard snapshots, refreshed once per cycle.
    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.dashboard.subscribe()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    /// Runs cycles until the iteration budget is spent or `shutdown` flips to
    /// `true`. Cancellation is only observed between cycles.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> GuardianResult<RunSummary> {
        if self.state != LoopState::Idle {
            return Err(GuardianError::config(format!(
                "agent cannot start from state {}", self.state
            )));
        }

        self.state = LoopState::Running;
        info!(
            "🛡️  Guardian loop started ({} mode, feed: {}, advisory: {})",
            self.executor.mode(),
            self.feed.name(),
            self.advisor.name()
        );

        loop {
            if self.iterations_exhausted() {
                break;
            }
            if *shutdown.borrow() {
                info!("🛑 Stop requested, not starting another cycle");
                break;
            }

            let outcome = self.run_cycle().await;
            self.cycles_completed += 1;

            if self.iterations_exhausted() {
                break;
            }

            let delay = match outcome {
                CycleOutcome::FeedUnavailable | CycleOutcome::NoCandidates => self.settings.idle_backoff,
                CycleOutcome::Decided { .. } => self.settings.cycle_delay,
            };
            if wait_or_stop(&mut shutdown, delay).await {
                info!("🛑 Stop requested during wait");
                break;
            }
        }

        self.state = LoopState::Stopped;
        let summary = self.summary();
        info!(
            "🏁 Guardian loop stopped after {} cycles: {} executions, {} succeeded, {} failed",
            summary.cycles_completed,
            summary.total_executions,
            summary.successful_executions,
            summary.failed_executions
        );
        Ok(summary)
    }

    /// One full evaluation. Never fails: feed and advisory problems degrade
    /// the cycle instead of aborting it.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let cycle = self.cycles_completed + 1;
        info!("🔄 Cycle {}", cycle);

        let (snapshots, fee_level) = match self.fetch().await {
            Ok(fetched) => fetched,
            Err(e) => {
                warn!("⚠️ {} - treating cycle as empty", e);
                self.recovery.record(&e);
                self.publish(cycle, None);
                return CycleOutcome::FeedUnavailable;
            }
        };

        let candidates = self.detector.detect(&snapshots, fee_level);
        self.opportunities_detected += candidates.len() as u64;
        if candidates.is_empty() {
            info!("😴 No divergence above {}% across {} venues", self.detector.threshold_pct(), snapshots.len());
            self.publish(cycle, None);
            return CycleOutcome::NoCandidates;
        }

        let scored: Vec<ScoredOpportunity> = candidates
            .into_iter()
            .map(|opportunity| self.scorer.score(opportunity, fee_level))
            .collect();

        let Some(best) = select_best(&scored) else {
            self.publish(cycle, None);
            return CycleOutcome::NoCandidates;
        };
        let mut decision = self.engine.decide_for(best);
        let breakdown = best.assessment.factors;

        let context = market_context(&scored, fee_level);
        match advise_with_timeout(
            self.advisor.as_ref(),
            &best.opportunity,
            &best.assessment,
            &context,
            self.settings.advisory_timeout,
        )
        .await
        {
            Ok(text) => decision.advisory = Some(text),
            Err(e) => {
                warn!("⚠️ {} - using rule-based rationale", e);
                self.recovery.record(&e);
            }
        }

        self.decisions_made += 1;
        *self.decision_counts.entry(decision.recommendation.to_string()).or_insert(0) += 1;
        print_decision(&decision);
        if let Err(e) = self.journal.record_decision(&decision) {
            warn!("Failed to journal decision: {:#}", e);
            self.recovery.count_journal_failure();
        }

        let record = match (&decision.recommendation, &decision.selected) {
            (Recommendation::Execute, Some(selected)) => {
                let record = self.executor.execute(&selected.opportunity).await;
                self.record_execution(&record);
                Some(record)
            }
            _ => None,
        };

        self.remember(scored);
        self.publish(cycle, Some(breakdown));

        CycleOutcome::Decided { decision, record }
    }

    async fn fetch(&self) -> GuardianResult<(Vec<VenueSnapshot>, Decimal)> {
        let snapshots = self.feed.fetch_snapshots().await?;
        let fee_level = self.feed.current_fee_level().await?;
        Ok((snapshots, fee_level))
    }

    fn record_execution(&mut self, record: &ExecutionRecord) {
        print_execution_record(record);
        if !record.is_success() {
            self.recovery.record(&GuardianError::ExecutionFailure {
                reason: record.error_message.clone().unwrap_or_else(|| "unknown".to_string()),
            });
        }
        if let Err(e) = self.journal.record_execution(record) {
            warn!("Failed to journal execution {}: {:#}", record.id, e);
            self.recovery.count_journal_failure();
        }
        self.history.push(record.clone());
    }

    fn remember(&mut self, scored: Vec<ScoredOpportunity>) {
        self.recent.extend(scored);
        let excess = self.recent.len().saturating_sub(self.settings.recent_limit);
        self.recent.drain(..excess);
    }

    fn publish(&mut self, cycle: u64, breakdown: Option<RiskFactors>) {
        let previous = self.dashboard.borrow().latest_risk_factor_breakdown;
        let snapshot = DashboardSnapshot {
            generated_at: Some(Utc::now()),
            cycle,
            recent_opportunities: self.recent.clone(),
            execution_history: self.history.recent(self.settings.recent_limit),
            latest_risk_factor_breakdown: breakdown.or(previous),
        };

        if let Err(e) = self.journal.write_snapshot(&snapshot) {
            warn!("Failed to write dashboard snapshot: {:#}", e);
            self.recovery.count_journal_failure();
        }
        self.dashboard.send_replace(snapshot);
    }

    fn iterations_exhausted(&self) -> bool {
        self.settings.iterations.is_some_and(|n| self.cycles_completed >= n)
    }

    pub fn summary(&self) -> RunSummary {
        let total = self.history.len();
        let successful = self.history.successful();
        RunSummary {
            cycles_completed: self.cycles_completed,
            opportunities_detected: self.opportunities_detected,
            decisions_made: self.decisions_made,
            decisions_by_recommendation: self.decision_counts.clone(),
            total_executions: total,
            successful_executions: successful,
            failed_executions: total - successful,
            total_realized_profit_usd: self.history.total_realized_profit(),
            error_counts: self.recovery
                .error_counts()
                .iter()
                .map(|(kind, count)| (kind.to_string(), *count))
                .collect(),
        }
    }
}

pub fn market_context(scored: &[ScoredOpportunity], fee_level_gwei: Decimal) -> MarketContext {
    let count = Decimal::from(scored.len().max(1));
    let risk_total: Decimal = scored.iter().map(|s| Decimal::from(s.assessment.overall)).sum();
    let profit_total: Decimal = scored.iter().map(|s| s.opportunity.net_profit_usd).sum();

    MarketContext {
        candidate_count: scored.len(),
        average_risk: risk_total / count,
        average_net_profit_usd: profit_total / count,
        fee_level_gwei,
        reference_price: PEG_REFERENCE_PRICE,
    }
}

/// `true` if a stop arrived before `delay` elapsed.
async fn wait_or_stop(shutdown: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        _ = wait_for_stop(shutdown) => true,
    }
}

async fn wait_for_stop(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            // Sender gone: nobody can ask us to stop any more.
            std::future::pending::<()>().await;
        }
    }
}
