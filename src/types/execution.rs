//! Trade execution types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionMode {
    Simulation,
    Live,
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulation" | "sim" => Ok(ExecutionMode::Simulation),
            "live" => Ok(ExecutionMode::Live),
            other => Err(format!("unknown execution mode '{}'", other)),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExecutionMode::Simulation => "simulation",
            ExecutionMode::Live => "live",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionOutcome {
    Success,
    Failure,
}

/// Result of committing one action. Appended to history and never changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub opportunity_id: String,
    pub timestamp: DateTime<Utc>,
    pub mode: ExecutionMode,
    pub outcome: ExecutionOutcome,
    pub action_reference: Option<String>,
    pub estimated_profit_usd: Decimal,
    pub realized_profit_usd: Option<Decimal>,
    pub gas_used: Option<u64>,
    pub execution_time_ms: u64,
    pub error_message: Option<String>,
}

impl ExecutionRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == ExecutionOutcome::Success
    }
}
