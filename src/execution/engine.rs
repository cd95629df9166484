//! Trade execution engine

use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use super::{
    ledger::{AlloyLedger, Ledger},
    simulation::{create_simulated_execution, is_well_formed_reference},
};
use crate::{
    arbitrage::detector::estimate_fee_cost,
    config::{Config, DEFAULT_SIMULATED_LATENCY_MS},
    errors::{GuardianError, GuardianResult},
    types::{ExecutionMode, ExecutionOutcome, ExecutionRecord, Opportunity},
};

enum Backend {
    Simulated { rng: StdRng, latency: Duration },
    Live { ledger: Arc<dyn Ledger> },
}

/// Commits the selected opportunity and reports what happened.
///
/// Failures never surface as `Err`; they come back as failed records so the
/// loop can keep going.
pub struct TradeExecutor {
    backend: Backend,
}

impl TradeExecutor {
    pub fn simulated(rng: StdRng) -> Self {
        Self {
            backend: Backend::Simulated {
                rng,
                latency: Duration::from_millis(DEFAULT_SIMULATED_LATENCY_MS),
            },
        }
    }

    /// Overrides the simulated confirmation delay. No effect in live mode.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        if let Backend::Simulated { latency: current, .. } = &mut self.backend {
            *current = latency;
        }
        self
    }

    /// Live mode without a signer is a startup error, never a per-cycle one.
    pub fn live(ledger: Option<Arc<dyn Ledger>>) -> GuardianResult<Self> {
        let ledger = ledger.ok_or_else(|| {
            GuardianError::config("live execution requires a signing capability")
        })?;
        Ok(Self { backend: Backend::Live { ledger } })
    }

    pub async fn from_config(config: &Config) -> GuardianResult<Self> {
        match config.execution_mode {
            ExecutionMode::Simulation => {
                let rng = match config.simulation_seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                Ok(Self::simulated(rng).with_latency(config.simulated_latency()))
            }
            ExecutionMode::Live => {
                if config.private_key.is_none() {
                    return Self::live(None);
                }
                let ledger: Arc<dyn Ledger> = Arc::new(AlloyLedger::connect(config).await?);
                Self::live(Some(ledger))
            }
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        match self.backend {
            Backend::Simulated { .. } => ExecutionMode::Simulation,
            Backend::Live { .. } => ExecutionMode::Live,
        }
    }

    pub async fn execute(&mut self, opportunity: &Opportunity) -> ExecutionRecord {
        info!("🚀 Executing {} ({}) in {} mode", opportunity.id, opportunity.route(), self.mode());

        match &mut self.backend {
            Backend::Simulated { rng, latency } => {
                create_simulated_execution(rng, opportunity, *latency).await
            }
            Backend::Live { ledger } => execute_live(ledger.as_ref(), opportunity).await,
        }
    }

    /// Checks whether a previously returned reference is confirmed.
    pub async fn verify(&self, reference: &str) -> GuardianResult<bool> {
        match &self.backend {
            Backend::Simulated { .. } => Ok(is_well_formed_reference(reference)),
            Backend::Live { ledger } => ledger
                .is_confirmed(reference)
                .await
                .map_err(|e| GuardianError::Ledger {
                    message: format!("could not verify {}", reference),
                    source: e,
                }),
        }
    }
}

async fn execute_live(ledger: &dyn Ledger, opportunity: &Opportunity) -> ExecutionRecord {
    let start_time = Instant::now();
    let mut record = ExecutionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        opportunity_id: opportunity.id.clone(),
        timestamp: Utc::now(),
        mode: ExecutionMode::Live,
        outcome: ExecutionOutcome::Failure,
        action_reference: None,
        estimated_profit_usd: opportunity.net_profit_usd,
        realized_profit_usd: None,
        gas_used: None,
        execution_time_ms: 0,
        error_message: None,
    };

    match ledger.submit(opportunity).await {
        Ok(receipt) if receipt.confirmed => {
            info!("✅ Transaction confirmed: {}", receipt.tx_hash);
            record.outcome = ExecutionOutcome::Success;
            record.action_reference = Some(receipt.tx_hash);
            record.gas_used = Some(receipt.gas_used);
            record.realized_profit_usd = Some(
                opportunity.gross_profit_usd - estimate_fee_cost(receipt.effective_gas_price_gwei),
            );
        }
        Ok(receipt) => {
            warn!("Transaction {} reverted", receipt.tx_hash);
            record.action_reference = Some(receipt.tx_hash);
            record.gas_used = Some(receipt.gas_used);
            record.error_message = Some("transaction reverted".to_string());
        }
        Err(e) => {
            warn!("Live execution failed: {:#}", e);
            record.error_message = Some(format!("{:#}", e));
        }
    }

    record.timestamp = Utc::now();
    record.execution_time_ms = start_time.elapsed().as_millis() as u64;
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::ledger::LedgerReceipt;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use crate::types::VenueSnapshot;

    struct FakeLedger {
        confirmed: bool,
        fail: bool,
    }

    #[async_trait]
    impl Ledger for FakeLedger {
        async fn submit(&self, _opportunity: &Opportunity) -> anyhow::Result<LedgerReceipt> {
            if self.fail {
                return Err(anyhow::anyhow!("nonce too low"));
            }
            Ok(LedgerReceipt {
                tx_hash: format!("0x{}", "11".repeat(32)),
                gas_used: 121_000,
                effective_gas_price_gwei: dec!(20),
                confirmed: self.confirmed,
            })
        }

        async fn is_confirmed(&self, reference: &str) -> anyhow::Result<bool> {
            Ok(self.confirmed && reference.starts_with("0x11"))
        }
    }

    fn opportunity() -> Opportunity {
        Opportunity::between(
            "opp_1_0_1".to_string(),
            VenueSnapshot::new("Pool A", "0x1", dec!(0.998), dec!(2000000)),
            VenueSnapshot::new("Pool B", "0x2", dec!(1.004), dec!(1000000)),
            dec!(0.6012),
            dec!(1000),
            dec!(6.012),
            dec!(0.02),
        )
    }

    #[test]
    fn live_without_signer_is_rejected() {
        let err = TradeExecutor::live(None).err().unwrap();
        assert_eq!(err.kind(), "configuration");
    }

    #[tokio::test]
    async fn confirmed_live_submission_is_a_success() {
        let ledger: Arc<dyn Ledger> = Arc::new(FakeLedger { confirmed: true, fail: false });
        let mut executor = TradeExecutor::live(Some(ledger)).unwrap();
        let record = executor.execute(&opportunity()).await;

        assert!(record.is_success());
        assert_eq!(record.mode, ExecutionMode::Live);
        assert_eq!(record.gas_used, Some(121_000));
        assert_eq!(record.realized_profit_usd, Some(dec!(5.992)));
        let reference = record.action_reference.unwrap();
        assert!(executor.verify(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn ledger_errors_become_failed_records() {
        let ledger: Arc<dyn Ledger> = Arc::new(FakeLedger { confirmed: false, fail: true });
        let mut executor = TradeExecutor::live(Some(ledger)).unwrap();
        let record = executor.execute(&opportunity()).await;

        assert_eq!(record.outcome, ExecutionOutcome::Failure);
        assert!(record.error_message.unwrap().contains("nonce too low"));
        assert!(record.realized_profit_usd.is_none());
    }

    #[tokio::test]
    async fn reverted_receipts_are_failures_with_a_reference() {
        let ledger: Arc<dyn Ledger> = Arc::new(FakeLedger { confirmed: false, fail: false });
        let mut executor = TradeExecutor::live(Some(ledger)).unwrap();
        let record = executor.execute(&opportunity()).await;

        assert!(!record.is_success());
        assert!(record.action_reference.is_some());
        assert_eq!(record.error_message.as_deref(), Some("transaction reverted"));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_execution_waits_and_produces_a_verifiable_reference() {
        let mut executor = TradeExecutor::simulated(StdRng::seed_from_u64(7))
            .with_latency(Duration::from_millis(1500));
        let before = tokio::time::Instant::now();
        let record = executor.execute(&opportunity()).await;

        assert!(before.elapsed() >= Duration::from_millis(1500));
        assert_eq!(record.mode, ExecutionMode::Simulation);
        match record.outcome {
            ExecutionOutcome::Success => {
                let reference = record.action_reference.unwrap();
                assert!(executor.verify(&reference).await.unwrap());
                assert_eq!(record.gas_used, Some(150_000));
            }
            ExecutionOutcome::Failure => {
                assert_eq!(record.error_message.as_deref(), Some("execution slippage exceeded tolerance"));
            }
        }
        assert!(!executor.verify("0xdeadbeef").await.unwrap());
    }
}
