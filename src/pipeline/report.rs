//! Outcome of an ingestion run

use std::path::PathBuf;

use serde::Serialize;

use crate::models::RowCounts;

/// A document that was ingested (or, in a dry run, parsed)
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub source: PathBuf,
    /// Location in the processed directory; `None` in a dry run
    pub archived_to: Option<PathBuf>,
    pub patient_id: String,
    pub rows: RowCounts,
}

/// A document left in the incoming location
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub source: PathBuf,
    pub reason: String,
}

/// Per-run tally of processed and skipped documents
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub dry_run: bool,
    pub processed: Vec<ProcessedFile>,
    pub skipped: Vec<SkippedFile>,
    /// Rows written (or that would be written) across all processed documents
    pub rows: RowCounts,
}

impl IngestReport {
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_processed(&mut self, file: ProcessedFile) {
        self.rows += file.rows;
        self.processed.push(file);
    }

    pub fn record_skipped(&mut self, source: PathBuf, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            source,
            reason: reason.into(),
        });
    }

    /// Whether the run touched nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.processed.is_empty() && self.skipped.is_empty()
    }

    /// One-line human readable summary
    #[must_use]
    pub fn summary(&self) -> String {
        let verb = if self.dry_run { "parsed" } else { "ingested" };
        format!(
            "{} {} document(s), skipped {}; rows: {} demographics, {} hospitalizations, {} diagnoses, {} medications",
            verb,
            self.processed.len(),
            self.skipped.len(),
            self.rows.demographics,
            self.rows.hospitalizations,
            self.rows.diagnoses,
            self.rows.medications,
        )
    }
}
