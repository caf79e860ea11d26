//! Per-document outcomes and the batch summary.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of processing one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Copied to the destination under its canonical name.
    Renamed { destination: PathBuf },
    /// A file with the canonical name already exists.
    SkippedExisting { destination: PathBuf },
    /// No machine-readable text (likely a scanned image).
    SkippedNoText,
    /// Layout not recognised or a required field is missing.
    SkippedUnidentified,
    /// The per-document deadline fired.
    TimedOut,
    /// Extraction or I/O failure.
    Error { reason: String },
}

impl Outcome {
    pub fn error(reason: impl Into<String>) -> Self {
        Outcome::Error {
            reason: reason.into(),
        }
    }

    /// `Renamed` and `SkippedExisting` count as successes.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Renamed { .. } | Outcome::SkippedExisting { .. })
    }

    /// Short machine-friendly label, used in CSV reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Renamed { .. } => "renamed",
            Outcome::SkippedExisting { .. } => "skipped_existing",
            Outcome::SkippedNoText => "skipped_no_text",
            Outcome::SkippedUnidentified => "skipped_unidentified",
            Outcome::TimedOut => "timed_out",
            Outcome::Error { .. } => "error",
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        match self {
            Outcome::Renamed { destination } | Outcome::SkippedExisting { destination } => {
                Some(destination)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Renamed { destination } => write!(f, "renamed to {}", file_name(destination)),
            Outcome::SkippedExisting { destination } => {
                write!(f, "already exists as {}", file_name(destination))
            }
            Outcome::SkippedNoText => f.write_str("PDF has no text (scanned image without OCR)"),
            Outcome::SkippedUnidentified => f.write_str("not identified"),
            Outcome::TimedOut => f.write_str("TIMEOUT"),
            Outcome::Error { reason } => write!(f, "error: {}", reason),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Outcome of a single document within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    /// Source document path.
    pub path: PathBuf,
    /// What happened to it.
    pub outcome: Outcome,
    /// Wall time spent on the document, in milliseconds.
    pub elapsed_ms: u64,
}

impl DocumentReport {
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Eligible documents found while counting.
    pub total_found: usize,
    /// Documents renamed or already present at the destination.
    pub renamed: usize,
    /// Eligible documents that did not succeed.
    pub skipped: usize,
    /// Non-eligible files seen during traversal.
    pub ignored: usize,
    /// One human-readable line per failed document, in processing order.
    pub errors: Vec<String>,
    /// Per-document outcomes, in processing order.
    pub documents: Vec<DocumentReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    pub(crate) fn new() -> Self {
        Self {
            total_found: 0,
            renamed: 0,
            skipped: 0,
            ignored: 0,
            errors: Vec::new(),
            documents: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one document outcome into the counters.
    pub(crate) fn record(&mut self, report: DocumentReport) {
        if report.outcome.is_success() {
            self.renamed += 1;
        } else {
            self.skipped += 1;
            self.errors
                .push(format!("{} - {}", report.file_name(), report.outcome));
        }
        self.documents.push(report);
    }

    pub(crate) fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Documents with the given outcome label.
    pub fn count_label(&self, label: &str) -> usize {
        self.documents
            .iter()
            .filter(|d| d.outcome.label() == label)
            .count()
    }
}
