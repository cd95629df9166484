//! Risk assessment types

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RiskFactor {
    Liquidity,
    PriceImpact,
    GasCost,
    Volatility,
    Slippage,
    Competition,
}

impl RiskFactor {
    /// Table order; also the tie-break order when naming the main concern.
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::Liquidity,
        RiskFactor::PriceImpact,
        RiskFactor::GasCost,
        RiskFactor::Volatility,
        RiskFactor::Slippage,
        RiskFactor::Competition,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::Liquidity => "liquidity",
            RiskFactor::PriceImpact => "priceImpact",
            RiskFactor::GasCost => "gasCost",
            RiskFactor::Volatility => "volatility",
            RiskFactor::Slippage => "slippage",
            RiskFactor::Competition => "competition",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The six sub-scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskFactors {
    pub liquidity_risk: u8,
    pub price_impact_risk: u8,
    pub gas_cost_risk: u8,
    pub volatility_risk: u8,
    pub slippage_risk: u8,
    pub competition_risk: u8,
}

impl RiskFactors {
    pub fn get(&self, factor: RiskFactor) -> u8 {
        match factor {
            RiskFactor::Liquidity => self.liquidity_risk,
            RiskFactor::PriceImpact => self.price_impact_risk,
            RiskFactor::GasCost => self.gas_cost_risk,
            RiskFactor::Volatility => self.volatility_risk,
            RiskFactor::Slippage => self.slippage_risk,
            RiskFactor::Competition => self.competition_risk,
        }
    }

    /// Highest sub-score; ties go to the factor listed first.
    pub fn main_concern(&self) -> (RiskFactor, u8) {
        let mut worst = (RiskFactor::Liquidity, self.liquidity_risk);
        for factor in RiskFactor::ALL.into_iter().skip(1) {
            let value = self.get(factor);
            if value > worst.1 {
                worst = (factor, value);
            }
        }
        worst
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskCategory {
    Low,
    Medium,
    High,
}

impl RiskCategory {
    pub fn from_score(overall: u8) -> Self {
        match overall {
            s if s < 35 => RiskCategory::Low,
            s if s < 65 => RiskCategory::Medium,
            _ => RiskCategory::High,
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskCategory::Low => "LOW",
            RiskCategory::Medium => "MEDIUM",
            RiskCategory::High => "HIGH",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Recommendation {
    Execute,
    Wait,
    Skip,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Recommendation::Execute => "EXECUTE",
            Recommendation::Wait => "WAIT",
            Recommendation::Skip => "SKIP",
        })
    }
}

/// Scoring result for exactly one opportunity. Re-scoring builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub factors: RiskFactors,
    pub overall: u8,
    pub category: RiskCategory,
    pub recommendation: Recommendation,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_thresholds() {
        assert_eq!(RiskCategory::from_score(0), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(34), RiskCategory::Low);
        assert_eq!(RiskCategory::from_score(35), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(64), RiskCategory::Medium);
        assert_eq!(RiskCategory::from_score(65), RiskCategory::High);
        assert_eq!(RiskCategory::from_score(100), RiskCategory::High);
    }

    #[test]
    fn factor_labels_are_camel_case() {
        let labels: Vec<&str> = RiskFactor::ALL.iter().map(RiskFactor::label).collect();
        assert_eq!(
            labels,
            ["liquidity", "priceImpact", "gasCost", "volatility", "slippage", "competition"]
        );
    }

    #[test]
    fn main_concern_prefers_the_earlier_factor_on_ties() {
        let factors = RiskFactors {
            liquidity_risk: 10,
            price_impact_risk: 70,
            gas_cost_risk: 70,
            volatility_risk: 10,
            slippage_risk: 25,
            competition_risk: 20,
        };
        assert_eq!(factors.main_concern(), (RiskFactor::PriceImpact, 70));
    }
}
