//! Randomised execution used in simulation mode

use alloy::primitives::hex;
use chrono::Utc;
use rand::{rngs::StdRng, Rng};
use rust_decimal::prelude::*;
use std::time::{Duration, Instant};
use tracing::info;
use crate::types::{ExecutionMode, ExecutionOutcome, ExecutionRecord, Opportunity};

pub const SIMULATED_SUCCESS_RATE: f64 = 0.9;
pub const SIMULATED_GAS_USED: u64 = 150_000;
pub const SIMULATED_FAILURE_REASON: &str = "execution slippage exceeded tolerance";
const PROFIT_VARIANCE: f64 = 0.05;

/// Waits `latency`, then succeeds with probability [`SIMULATED_SUCCESS_RATE`].
/// Realized profit lands within ±5% of the estimate.
pub async fn create_simulated_execution(
    rng: &mut StdRng,
    opportunity: &Opportunity,
    latency: Duration,
) -> ExecutionRecord {
    let start_time = Instant::now();

    // Draw everything up front so the outcome does not depend on timing.
    let is_successful = rng.random_bool(SIMULATED_SUCCESS_RATE);
    let multiplier = rng.random_range((1.0 - PROFIT_VARIANCE)..=(1.0 + PROFIT_VARIANCE));
    let mut reference = [0u8; 32];
    rng.fill(&mut reference);

    tokio::time::sleep(latency).await;

    let realized = Decimal::from_f64(multiplier)
        .map(|m| (opportunity.net_profit_usd * m.round_dp(6)).round_dp(6))
        .unwrap_or(opportunity.net_profit_usd);

    info!("🎭 Simulated execution of {}: success={}", opportunity.id, is_successful);

    ExecutionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        opportunity_id: opportunity.id.clone(),
        timestamp: Utc::now(),
        mode: ExecutionMode::Simulation,
        outcome: if is_successful { ExecutionOutcome::Success } else { ExecutionOutcome::Failure },
        action_reference: is_successful.then(|| hex::encode_prefixed(reference)),
        estimated_profit_usd: opportunity.net_profit_usd,
        realized_profit_usd: is_successful.then_some(realized),
        gas_used: is_successful.then_some(SIMULATED_GAS_USED),
        execution_time_ms: start_time.elapsed().as_millis() as u64,
        error_message: (!is_successful).then(|| SIMULATED_FAILURE_REASON.to_string()),
    }
}

/// A simulated reference is `0x` followed by 64 hex digits.
pub fn is_well_formed_reference(reference: &str) -> bool {
    reference.len() == 66
        && reference.starts_with("0x")
        && reference[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_shape() {
        let good = format!("0x{}", "ab".repeat(32));
        assert!(is_well_formed_reference(&good));
        assert!(!is_well_formed_reference("0x1234"));
        assert!(!is_well_formed_reference(&format!("0x{}", "zz".repeat(32))));
        assert!(!is_well_formed_reference(&"ab".repeat(33)));
    }
}
