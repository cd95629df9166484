//! Append-only JSONL journal of decisions and executions

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use crate::types::{DashboardSnapshot, Decision, ExecutionRecord};

/// Writes one JSON object per line under `<root>/{decisions,executions}`.
/// A journal without a root accepts every call and writes nothing.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    root: Option<PathBuf>,
}

impl Journal {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn record_decision(&self, decision: &Decision) -> Result<()> {
        self.append("decisions", "decisions", decision)?;
        debug!(
            recommendation = %decision.recommendation,
            confidence = %decision.confidence,
            "Saved decision"
        );
        Ok(())
    }

    pub fn record_execution(&self, record: &ExecutionRecord) -> Result<()> {
        self.append("executions", "executions", record)?;
        debug!(
            execution_id = %record.id,
            outcome = ?record.outcome,
            realized_profit = ?record.realized_profit_usd,
            "Saved execution record"
        );
        Ok(())
    }

    /// Overwrites `<root>/dashboard/latest.json`.
    pub fn write_snapshot(&self, snapshot: &DashboardSnapshot) -> Result<()> {
        let Some(root) = &self.root else { return Ok(()) };
        let dir = root.join("dashboard");
        fs::create_dir_all(&dir)?;
        let path = dir.join("latest.json");
        fs::write(&path, serde_json::to_string_pretty(snapshot)?)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    fn append<T: Serialize>(&self, dir: &str, prefix: &str, value: &T) -> Result<()> {
        let Some(root) = &self.root else { return Ok(()) };
        let dir = root.join(dir);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}_{}.jsonl", prefix, Utc::now().format("%Y-%m-%d")));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;

        writeln!(file, "{}", serde_json::to_string(value)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use crate::types::{ExecutionMode, ExecutionOutcome, Recommendation};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("peg-guardian-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn read_lines(dir: &Path) -> Vec<String> {
        let entry = fs::read_dir(dir).unwrap().next().unwrap().unwrap();
        fs::read_to_string(entry.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn appends_one_line_per_record() {
        let root = scratch_dir("journal");
        let journal = Journal::new(&root);
        let record = ExecutionRecord {
            id: "exec-1".into(),
            opportunity_id: "opp_1_0_1".into(),
            timestamp: Utc::now(),
            mode: ExecutionMode::Simulation,
            outcome: ExecutionOutcome::Success,
            action_reference: Some("0xab".into()),
            estimated_profit_usd: dec!(5.98),
            realized_profit_usd: Some(dec!(6.01)),
            gas_used: Some(150_000),
            execution_time_ms: 1500,
            error_message: None,
        };

        journal.record_execution(&record).unwrap();
        journal.record_execution(&record).unwrap();

        let lines = read_lines(&root.join("executions"));
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed["opportunity_id"], "opp_1_0_1");
        assert_eq!(parsed["outcome"], "Success");

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn decisions_and_snapshots_land_in_their_own_files() {
        let root = scratch_dir("decisions");
        let journal = Journal::new(&root);
        let decision = Decision {
            timestamp: Utc::now(),
            recommendation: Recommendation::Skip,
            selected: None,
            confidence: dec!(0.2),
            rationale: "HIGH risk".into(),
            advisory: None,
        };

        journal.record_decision(&decision).unwrap();
        journal.write_snapshot(&DashboardSnapshot::default()).unwrap();

        assert_eq!(read_lines(&root.join("decisions")).len(), 1);
        assert!(root.join("dashboard/latest.json").exists());

        fs::remove_dir_all(root).ok();
    }

    #[test]
    fn disabled_journal_writes_nothing() {
        let journal = Journal::disabled();
        assert!(journal.root().is_none());
        assert!(journal.write_snapshot(&DashboardSnapshot::default()).is_ok());
    }
}
