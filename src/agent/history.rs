//! Execution history owned by the loop

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use crate::types::ExecutionRecord;

/// Append-only list of execution records. Entries are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct RunHistory {
    records: Vec<ExecutionRecord>,
}

impl RunHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ExecutionRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `limit` records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<ExecutionRecord> {
        let start = self.records.len().saturating_sub(limit);
        self.records[start..].to_vec()
    }

    pub fn successful(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn total_realized_profit(&self) -> Decimal {
        self.records
            .iter()
            .filter(|r| r.is_success())
            .filter_map(|r| r.realized_profit_usd)
            .sum()
    }
}

/// Emitted once when the loop stops.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub cycles_completed: u64,
    pub opportunities_detected: u64,
    pub decisions_made: u64,
    /// Keyed by `EXECUTE` / `WAIT` / `SKIP`.
    pub decisions_by_recommendation: BTreeMap<String, u64>,
    pub total_executions: usize,
    pub successful_executions: usize,
    pub failed_executions: usize,
    pub total_realized_profit_usd: Decimal,
    pub error_counts: BTreeMap<String, u32>,
}

impl RunSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_executions == 0 {
            0.0
        } else {
            self.successful_executions as f64 / self.total_executions as f64 * 100.0
        }
    }
}
