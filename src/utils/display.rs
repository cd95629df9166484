//! Display and printing utilities

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};
use crate::{
    agent::RunSummary,
    config::Config,
    types::{Decision, ExecutionRecord},
};

fn usd(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn print_configuration(config: &Config) {
    info!("⚙️  Configuration:");
    info!("   Execution mode: {}", config.execution_mode);
    info!("   Divergence threshold: {}%", config.min_divergence * Decimal::ONE_HUNDRED);
    info!("   Minimum profit: ${}", config.min_profit_usd);
    info!("   Trade size: ${}", config.trade_size_usd);
    if config.venue_pools.is_empty() {
        info!("   Venues: simulated (fee level {} gwei)", config.simulated_fee_gwei);
    } else {
        info!("   Venues: {} on-chain pools via {}", config.venue_pools.len(), config.rpc_url);
    }
    info!(
        "   Advisory: {}",
        if config.openai_api_key.is_some() { config.advisory_model.as_str() } else { "rule-based" }
    );
}

pub fn print_decision(decision: &Decision) {
    info!("🧠 Decision: {} (confidence {:.1}%)",
        decision.recommendation,
        (decision.confidence * Decimal::ONE_HUNDRED).round_dp(1)
    );
    if let Some(selected) = &decision.selected {
        let opp = &selected.opportunity;
        info!("   Route: {} | divergence {:.3}% | net ${}",
            opp.route(),
            opp.divergence_pct.round_dp(3),
            usd(opp.net_profit_usd)
        );
    }
    info!("   {}", decision.explanation());
}

pub fn print_execution_record(record: &ExecutionRecord) {
    if record.is_success() {
        info!("✅ Execution {} succeeded in {}ms", record.id, record.execution_time_ms);
        if let Some(reference) = &record.action_reference {
            info!("   Reference: {}", reference);
        }
        if let Some(profit) = record.realized_profit_usd {
            info!("   Realized profit: ${} (estimated ${})", usd(profit), usd(record.estimated_profit_usd));
        }
    } else {
        warn!("❌ Execution {} failed: {}",
            record.id,
            record.error_message.as_deref().unwrap_or("unknown error")
        );
    }
}

pub fn print_run_summary(summary: &RunSummary) {
    info!("\n📊 Run Summary");
    info!("   Cycles: {}", summary.cycles_completed);
    info!("   Opportunities detected: {}", summary.opportunities_detected);
    info!("   Decisions: {}", summary.decisions_made);
    for (recommendation, count) in &summary.decisions_by_recommendation {
        info!("     {}: {}", recommendation, count);
    }
    info!("   Executions: {} ({} succeeded, {} failed)",
        summary.total_executions,
        summary.successful_executions,
        summary.failed_executions
    );
    info!("   Success rate: {:.1}%", summary.success_rate());
    info!("   Total realized profit: ${}", usd(summary.total_realized_profit_usd));

    if !summary.error_counts.is_empty() {
        info!("   Errors:");
        for (kind, count) in &summary.error_counts {
            info!("     {}: {}", kind, count);
        }
    }
}
