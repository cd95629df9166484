//! Decision thresholds, confidence and candidate selection

use chrono::Utc;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use crate::types::{Decision, Recommendation, ScoredOpportunity};

/// Minimum-profit check first, then risk bands.
pub fn recommend(risk_score: u8, net_profit_usd: Decimal, min_profit_usd: Decimal) -> Recommendation {
    if net_profit_usd < min_profit_usd {
        return Recommendation::Skip;
    }

    if risk_score < 35 && net_profit_usd > dec!(10) {
        Recommendation::Execute
    } else if risk_score < 50 && net_profit_usd > dec!(25) {
        Recommendation::Execute
    } else if risk_score < 65 {
        Recommendation::Wait
    } else {
        Recommendation::Skip
    }
}

/// `0.5·(1 − risk/100) + 0.3·min(net/50, 1) + 0.2·net/(net+fee)`, clamped to [0, 1].
pub fn confidence(risk_score: u8, net_profit_usd: Decimal, fee_cost_usd: Decimal) -> Decimal {
    let risk_factor = Decimal::ONE - Decimal::from(risk_score) / dec!(100);
    let profit_factor = (net_profit_usd / dec!(50)).min(Decimal::ONE);
    let margin = net_profit_usd
        .checked_add(fee_cost_usd)
        .and_then(|total| net_profit_usd.checked_div(total))
        .unwrap_or(Decimal::ZERO);

    (risk_factor * dec!(0.5) + profit_factor * dec!(0.3) + margin * dec!(0.2))
        .max(Decimal::ZERO)
        .min(Decimal::ONE)
}

/// Highest net profit wins; ties keep the earliest detected.
pub fn select_best(candidates: &[ScoredOpportunity]) -> Option<&ScoredOpportunity> {
    candidates.iter().fold(None, |best: Option<&ScoredOpportunity>, candidate| match best {
        Some(current)
            if current.opportunity.net_profit_usd >= candidate.opportunity.net_profit_usd =>
        {
            Some(current)
        }
        _ => Some(candidate),
    })
}

#[derive(Debug, Clone)]
pub struct DecisionEngine {
    min_profit_usd: Decimal,
}

impl DecisionEngine {
    pub fn new(min_profit_usd: Decimal) -> Self {
        Self { min_profit_usd }
    }

    /// Picks the best candidate and decides on it. `None` when there are no
    /// candidates at all.
    pub fn decide(&self, candidates: &[ScoredOpportunity]) -> Option<Decision> {
        select_best(candidates).map(|best| self.decide_for(best))
    }

    /// Decision for an already selected candidate.
    pub fn decide_for(&self, best: &ScoredOpportunity) -> Decision {
        let opportunity = &best.opportunity;
        let assessment = &best.assessment;

        let recommendation = recommend(
            assessment.overall,
            opportunity.net_profit_usd,
            self.min_profit_usd,
        );
        let confidence = confidence(
            assessment.overall,
            opportunity.net_profit_usd,
            opportunity.fee_cost_usd,
        );

        let selected = match recommendation {
            Recommendation::Execute | Recommendation::Wait => Some(best.clone()),
            Recommendation::Skip => None,
        };

        Decision {
            timestamp: Utc::now(),
            recommendation,
            selected,
            confidence,
            rationale: assessment.rationale.clone(),
            advisory: None,
        }
    }
}
