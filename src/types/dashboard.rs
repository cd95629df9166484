//! Read-only view handed to the dashboard once per cycle

use chrono::{DateTime, Utc};
use serde::Serialize;
use super::{ExecutionRecord, RiskFactors, ScoredOpportunity};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub generated_at: Option<DateTime<Utc>>,
    pub cycle: u64,
    pub recent_opportunities: Vec<ScoredOpportunity>,
    pub execution_history: Vec<ExecutionRecord>,
    pub latest_risk_factor_breakdown: Option<RiskFactors>,
}
