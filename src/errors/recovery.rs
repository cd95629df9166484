//! Per-kind error accounting for the stop summary

use std::collections::BTreeMap;
use super::GuardianError;

/// Counts every failure the loop absorbed, keyed by [`GuardianError::kind`].
#[derive(Debug, Default)]
pub struct ErrorRecovery {
    error_counts: BTreeMap<&'static str, u32>,
}

impl ErrorRecovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: &GuardianError) {
        *self.error_counts.entry(error.kind()).or_insert(0) += 1;
    }

    pub fn count_journal_failure(&mut self) {
        *self.error_counts.entry("journal").or_insert(0) += 1;
    }

    pub fn error_counts(&self) -> &BTreeMap<&'static str, u32> {
        &self.error_counts
    }
}
