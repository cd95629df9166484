//! Advisory that never leaves the process

use async_trait::async_trait;
use super::AdvisoryService;
use crate::{
    errors::GuardianResult,
    types::{MarketContext, Opportunity, RiskAssessment},
};

/// Returns the scorer's own rationale. Used when no remote model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAdvisor;

#[async_trait]
impl AdvisoryService for RuleBasedAdvisor {
    async fn explain(
        &self,
        _opportunity: &Opportunity,
        assessment: &RiskAssessment,
        _context: &MarketContext,
    ) -> GuardianResult<String> {
        Ok(assessment.rationale.clone())
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}
