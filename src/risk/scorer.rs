//! Six-factor risk scoring

use rust_decimal::prelude::*;
use crate::{
    decision::recommend,
    risk::factors::*,
    types::{
        Opportunity, RiskAssessment, RiskCategory, RiskFactor, RiskFactors, ScoredOpportunity,
    },
};

/// Weighted average of the sub-scores, rounded half away from zero.
pub fn overall_score(factors: &RiskFactors) -> u8 {
    let weighted: Decimal = RiskFactor::ALL
        .iter()
        .zip(FACTOR_WEIGHTS)
        .map(|(factor, weight)| Decimal::from(factors.get(*factor)) * weight)
        .sum();

    weighted
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .unwrap_or(100)
        .min(100)
}

pub fn explain_risk(overall: u8, factors: &RiskFactors, net_profit_usd: Decimal) -> String {
    let category = RiskCategory::from_score(overall);
    let (factor, value) = factors.main_concern();
    let profit = net_profit_usd.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!(
        "{} risk ({}/100). Main concern: {} ({}/100). Estimated profit: ${:.2}.",
        category, overall, factor, value, profit
    )
}

/// Stateless scorer; the same opportunity and fee level always give the same
/// assessment.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    min_profit_usd: Decimal,
}

impl RiskScorer {
    pub fn new(min_profit_usd: Decimal) -> Self {
        Self { min_profit_usd }
    }

    pub fn factors(&self, opportunity: &Opportunity, fee_level_gwei: Decimal) -> RiskFactors {
        RiskFactors {
            liquidity_risk: liquidity_risk(opportunity.liquidity_available),
            price_impact_risk: price_impact_risk(opportunity.divergence_pct),
            gas_cost_risk: gas_cost_risk(
                fee_level_gwei,
                opportunity.net_profit_usd,
                opportunity.fee_cost_usd,
            ),
            volatility_risk: volatility_risk(opportunity.source.price, opportunity.target.price),
            slippage_risk: slippage_risk(opportunity.liquidity_available),
            competition_risk: competition_risk(opportunity.net_profit_usd),
        }
    }

    pub fn assess(&self, opportunity: &Opportunity, fee_level_gwei: Decimal) -> RiskAssessment {
        let factors = self.factors(opportunity, fee_level_gwei);
        let overall = overall_score(&factors);

        RiskAssessment {
            factors,
            overall,
            category: RiskCategory::from_score(overall),
            recommendation: recommend(overall, opportunity.net_profit_usd, self.min_profit_usd),
            rationale: explain_risk(overall, &factors, opportunity.net_profit_usd),
        }
    }

    pub fn score(&self, opportunity: Opportunity, fee_level_gwei: Decimal) -> ScoredOpportunity {
        let assessment = self.assess(&opportunity, fee_level_gwei);
        ScoredOpportunity { opportunity, assessment }
    }
}
