//! Arbitrage opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::{RiskAssessment, VenueSnapshot};

/// A price divergence between two venues.
///
/// Built through [`Opportunity::between`], which keeps
/// `net_profit_usd == gross_profit_usd - fee_cost_usd`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    pub id: String,
    pub detected_at: DateTime<Utc>,
    pub source: VenueSnapshot,
    pub target: VenueSnapshot,
    pub divergence_pct: Decimal,
    pub trade_size_usd: Decimal,
    pub gross_profit_usd: Decimal,
    pub fee_cost_usd: Decimal,
    pub net_profit_usd: Decimal,
    pub liquidity_available: Decimal,
}

impl Opportunity {
    pub fn between(
        id: String,
        source: VenueSnapshot,
        target: VenueSnapshot,
        divergence_pct: Decimal,
        trade_size_usd: Decimal,
        gross_profit_usd: Decimal,
        fee_cost_usd: Decimal,
    ) -> Self {
        let liquidity_available = source.liquidity;
        Self {
            id,
            detected_at: Utc::now(),
            source,
            target,
            divergence_pct,
            trade_size_usd,
            gross_profit_usd,
            fee_cost_usd,
            net_profit_usd: gross_profit_usd - fee_cost_usd,
            liquidity_available,
        }
    }

    pub fn route(&self) -> String {
        format!("{} → {}", self.source.name, self.target.name)
    }
}

/// An opportunity with its risk assessment attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredOpportunity {
    pub opportunity: Opportunity,
    pub assessment: RiskAssessment,
}
