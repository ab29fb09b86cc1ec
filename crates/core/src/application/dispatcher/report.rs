// Batch report - per-run records and aggregate counts

use crate::domain::{RunIndex, RunOutcome};
use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// What happened to one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub index: RunIndex,
    pub receptor: String,
    pub ligand: String,
    pub output_name: String,
    pub outcome: RunOutcome,
}

/// Summary of a finished batch, in RunIndex order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub started_at_ms: i64,
    pub finished_at_ms: i64,
    pub runs: Vec<RunRecord>,
}

impl BatchReport {
    pub fn total_runs(&self) -> usize {
        self.runs.len()
    }

    pub fn failed_indices(&self) -> Vec<RunIndex> {
        self.runs
            .iter()
            .filter(|run| run.outcome.is_failure())
            .map(|run| run.index)
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.runs.iter().filter(|run| run.outcome.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.runs.iter().any(|run| run.outcome.is_failure())
    }

    pub fn duration_ms(&self) -> i64 {
        self.finished_at_ms - self.started_at_ms
    }

    /// Write the report as pretty JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
