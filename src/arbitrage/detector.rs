//! Pairwise venue divergence detection

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use tracing::{debug, info};
use crate::{
    errors::{GuardianError, GuardianResult},
    types::{Opportunity, VenueSnapshot},
    validation::validate_snapshot,
};

/// USD of execution cost per gwei of fee level.
pub const FEE_COST_PER_GWEI_USD: Decimal = dec!(0.001);

/// `|target - source| / source * 100`. Zero when either price is not positive,
/// `None` when the ratio does not fit in a `Decimal`.
pub fn price_divergence_pct(source: Decimal, target: Decimal) -> Option<Decimal> {
    if source <= Decimal::ZERO || target <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    (target - source).abs().checked_div(source)?.checked_mul(dec!(100))
}

pub fn estimate_fee_cost(fee_level_gwei: Decimal) -> Decimal {
    fee_level_gwei.max(Decimal::ZERO) * FEE_COST_PER_GWEI_USD
}

#[derive(Debug, Clone)]
pub struct OpportunityDetector {
    min_divergence: Decimal,
    trade_size_usd: Decimal,
}

impl OpportunityDetector {
    /// `min_divergence` is a fraction (0.003 = 0.3%).
    pub fn new(min_divergence: Decimal, trade_size_usd: Decimal) -> GuardianResult<Self> {
        if min_divergence <= Decimal::ZERO || min_divergence >= Decimal::ONE {
            return Err(GuardianError::config(format!(
                "divergence threshold must be in (0, 1), got {}",
                min_divergence
            )));
        }
        if trade_size_usd <= Decimal::ZERO {
            return Err(GuardianError::config(format!(
                "trade size must be positive, got {}",
                trade_size_usd
            )));
        }
        Ok(Self { min_divergence, trade_size_usd })
    }

    pub fn threshold_pct(&self) -> Decimal {
        self.min_divergence * dec!(100)
    }

    /// Considers every unordered pair once, in index order, and emits those
    /// whose divergence meets the threshold.
    pub fn detect(&self, snapshots: &[VenueSnapshot], fee_level_gwei: Decimal) -> Vec<Opportunity> {
        let threshold_pct = self.threshold_pct();
        let fee_cost_usd = estimate_fee_cost(fee_level_gwei);
        let stamp = Utc::now().timestamp_millis();
        let mut opportunities = Vec::new();

        for (i, source) in snapshots.iter().enumerate() {
            if let Err(e) = validate_snapshot(source) {
                debug!("Skipping venue {}: {}", source.name, e);
                continue;
            }
            for (j, target) in snapshots.iter().enumerate().skip(i + 1) {
                if validate_snapshot(target).is_err() {
                    continue;
                }

                let Some(divergence_pct) = price_divergence_pct(source.price, target.price) else {
                    debug!("Skipping {} -> {}: divergence overflow", source.name, target.name);
                    continue;
                };
                if divergence_pct < threshold_pct {
                    continue;
                }

                let Some(gross_profit_usd) = self
                    .trade_size_usd
                    .checked_mul(divergence_pct)
                    .map(|v| v / dec!(100))
                else {
                    debug!("Skipping {} -> {}: profit overflow", source.name, target.name);
                    continue;
                };
                let opportunity = Opportunity::between(
                    format!("opp_{}_{}_{}", stamp, i, j),
                    source.clone(),
                    target.clone(),
                    divergence_pct,
                    self.trade_size_usd,
                    gross_profit_usd,
                    fee_cost_usd,
                );

                info!(
                    "💡 Found opportunity: {} | Diff: {:.3}% | Net: ${:.2}",
                    opportunity.route(),
                    divergence_pct,
                    opportunity.net_profit_usd
                );
                opportunities.push(opportunity);
            }
        }

        opportunities
    }
}
