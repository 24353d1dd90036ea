//! Machine-readable run report, printed with `--json`.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::merge::{ItemFailure, MergeStatistics};
use crate::pipeline::RunOutcome;
use crate::select::{InputEntry, InputKind};

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// The output PDF was written.
    Written,
    /// No images or PDFs were found.
    NoInputs,
    /// Every input failed; nothing was written.
    NothingMerged,
    /// Dry run; nothing was written.
    DryRun,
}

/// An input selected for merging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    /// Position in page order, starting at 0.
    pub order: usize,
    /// Input path.
    pub path: PathBuf,
    /// Image or PDF.
    pub kind: InputKind,
}

impl From<&InputEntry> for PlannedItem {
    fn from(entry: &InputEntry) -> Self {
        Self {
            order: entry.order,
            path: entry.path.clone(),
            kind: entry.kind,
        }
    }
}

/// An input that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Input path.
    pub path: PathBuf,
    /// Position the input would have had.
    pub order: usize,
    /// Image or PDF.
    pub kind: InputKind,
    /// Error message.
    pub error: String,
}

impl From<&ItemFailure> for FailureReport {
    fn from(failure: &ItemFailure) -> Self {
        Self {
            path: failure.path.clone(),
            order: failure.order,
            kind: failure.kind,
            error: failure.error.to_string(),
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// How the run ended.
    pub outcome: Outcome,
    /// Directory that was scanned.
    pub directory: PathBuf,
    /// Output path, present when a file was written or planned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Pages in the output.
    pub pages: usize,
    /// Inputs considered.
    pub items: usize,
    /// Images turned into pages.
    pub images_merged: usize,
    /// PDFs imported.
    pub documents_merged: usize,
    /// Inputs skipped after an error.
    pub skipped: usize,
    /// Transform cache hits.
    pub cache_hits: usize,
    /// Transform cache misses.
    pub cache_misses: usize,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
    /// Size of the written file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_written: Option<u64>,
    /// Selected inputs, listed for dry runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<PlannedItem>,
    /// Skipped inputs.
    pub failures: Vec<FailureReport>,
}

impl RunReport {
    /// Build a report from a finished run.
    pub fn from_outcome(outcome: &RunOutcome, elapsed: Duration) -> Self {
        let mut report = Self {
            outcome: Outcome::NoInputs,
            directory: outcome.directory().clone(),
            output: None,
            pages: 0,
            items: 0,
            images_merged: 0,
            documents_merged: 0,
            skipped: 0,
            cache_hits: 0,
            cache_misses: 0,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            bytes_written: None,
            plan: Vec::new(),
            failures: Vec::new(),
        };

        match outcome {
            RunOutcome::NoInputs { .. } => {}
            RunOutcome::DryRun { output, plan, .. } => {
                report.outcome = Outcome::DryRun;
                report.output = Some(output.clone());
                report.items = plan.len();
                report.plan = plan.iter().map(PlannedItem::from).collect();
            }
            RunOutcome::NothingMerged {
                statistics,
                failures,
                ..
            } => {
                report.outcome = Outcome::NothingMerged;
                report.apply_statistics(statistics, failures);
            }
            RunOutcome::Written {
                output,
                statistics,
                failures,
                write,
                ..
            } => {
                report.outcome = Outcome::Written;
                report.output = Some(output.clone());
                report.bytes_written = Some(write.file_size);
                report.apply_statistics(statistics, failures);
            }
        }

        report
    }

    fn apply_statistics(&mut self, statistics: &MergeStatistics, failures: &[ItemFailure]) {
        self.pages = statistics.total_pages;
        self.items = statistics.items;
        self.images_merged = statistics.images_merged;
        self.documents_merged = statistics.documents_merged;
        self.skipped = statistics.skipped;
        self.cache_hits = statistics.cache_hits;
        self.cache_misses = statistics.cache_misses;
        self.failures = failures.iter().map(FailureReport::from).collect();
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
