//! Optional natural-language advisory for decisions.
//!
//! The decision path never waits on this: callers go through
//! [`advise_with_timeout`] and fall back to the rule-based rationale on any
//! error.

pub mod openai;
pub mod prompts;
pub mod rule_based;

pub use openai::OpenAiAdvisor;
pub use rule_based::RuleBasedAdvisor;

use async_trait::async_trait;
use std::time::Duration;
use crate::{
    errors::{GuardianError, GuardianResult},
    types::{MarketContext, Opportunity, RiskAssessment},
};

#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn explain(
        &self,
        opportunity: &Opportunity,
        assessment: &RiskAssessment,
        context: &MarketContext,
    ) -> GuardianResult<String>;

    fn name(&self) -> &str;
}

/// Runs the advisory call under `timeout`. Timeouts and blank answers come
/// back as `AdvisoryUnavailable`.
pub async fn advise_with_timeout(
    service: &dyn AdvisoryService,
    opportunity: &Opportunity,
    assessment: &RiskAssessment,
    context: &MarketContext,
    timeout: Duration,
) -> GuardianResult<String> {
    let text = tokio::time::timeout(timeout, service.explain(opportunity, assessment, context))
        .await
        .map_err(|_| GuardianError::AdvisoryUnavailable {
            message: format!("{} did not answer within {:?}", service.name(), timeout),
        })??;

    if text.trim().is_empty() {
        return Err(GuardianError::AdvisoryUnavailable {
            message: format!("{} returned an empty explanation", service.name()),
        });
    }
    Ok(text)
}
