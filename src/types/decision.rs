//! Per-cycle decision types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use super::{Recommendation, ScoredOpportunity};

/// Outcome of one evaluation cycle.
///
/// `selected` is `Some` exactly when the recommendation is `Execute` or `Wait`.
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub timestamp: DateTime<Utc>,
    pub recommendation: Recommendation,
    pub selected: Option<ScoredOpportunity>,
    /// In [0, 1].
    pub confidence: Decimal,
    pub rationale: String,
    pub advisory: Option<String>,
}

impl Decision {
    pub fn explanation(&self) -> &str {
        self.advisory.as_deref().unwrap_or(&self.rationale)
    }
}

/// Market-wide figures handed to the advisory service alongside a candidate.
#[derive(Debug, Clone, Serialize)]
pub struct MarketContext {
    pub candidate_count: usize,
    pub average_risk: Decimal,
    pub average_net_profit_usd: Decimal,
    pub fee_level_gwei: Decimal,
    pub reference_price: Decimal,
}
