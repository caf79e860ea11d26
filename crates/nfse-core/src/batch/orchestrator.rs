//! Sequential batch orchestration with progress reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use super::{BatchObserver, DeadlineRunner};
use crate::error::{RenameError, Result};
use crate::models::config::BatchConfig;
use crate::models::outcome::{BatchSummary, DocumentReport, Outcome};
use crate::naming::DocumentKind;
use crate::pdf::{PdfTextSource, TextSource};

const BANNER: &str = "====================================================";

/// Lifecycle of one batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    Counting,
    Processing,
    Done,
}

/// Drives a directory of documents through the deadline wrapper, one at a time.
pub struct BatchRenamer {
    text_source: Arc<dyn TextSource>,
    config: BatchConfig,
}

impl BatchRenamer {
    /// Create a renamer that reads PDFs with [`PdfTextSource`].
    pub fn new(config: BatchConfig) -> Self {
        Self {
            text_source: Arc::new(PdfTextSource::new()),
            config,
        }
    }

    /// Replace the text extraction collaborator.
    pub fn with_text_source(mut self, text_source: Arc<dyn TextSource>) -> Self {
        self.text_source = text_source;
        self
    }

    /// Rename every eligible document under `source_dir` into `dest_dir`.
    ///
    /// Per-document faults are recorded in the summary. Only setup faults
    /// (unsupported `selector`, missing source directory, destination that
    /// is not a directory) return [`RenameError::Aborted`], after the closing
    /// report and a final progress of 100.
    pub async fn process(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        selector: &str,
        observer: &mut dyn BatchObserver,
    ) -> Result<BatchSummary> {
        let deadline = self.config.deadline();
        let mut run = Run {
            phase: BatchPhase::Init,
            summary: BatchSummary::new(),
            observer,
            last_percent: 0,
        };

        run.log(BANNER);
        run.log(">>> STARTING RENAME PROCESS");
        run.log(&format!("Source:      {}", display_absolute(source_dir)));
        run.log(&format!("Destination: {}", display_absolute(dest_dir)));
        run.log(&format!("Timeout:     {}s per document", deadline.as_secs()));
        run.log(BANNER);

        let kind = match validate(source_dir, dest_dir, selector) {
            Ok(kind) => kind,
            Err(e) => {
                error!("Batch setup failed: {}", e);
                run.log(&format!("Setup error: {}", e));
                let summary = run.close();
                return Err(RenameError::Aborted {
                    source: Box::new(e),
                    summary: Box::new(summary),
                });
            }
        };

        run.enter(BatchPhase::Counting);
        let documents = self.enumerate(source_dir, kind, &mut run);
        run.summary.total_found = documents.len();
        run.log(&format!(
            "Total {} files found: {}",
            kind.extension().to_uppercase(),
            documents.len()
        ));

        run.enter(BatchPhase::Processing);
        let runner = DeadlineRunner::new(Arc::clone(&self.text_source), kind, deadline);
        let total = documents.len();

        for (index, path) in documents.into_iter().enumerate() {
            run.log(&format!("Reading ({}/{}): {}", index + 1, total, file_name(&path)));

            let started = Instant::now();
            let outcome = runner.run(&path, dest_dir).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            run.report_outcome(&path, &outcome);
            run.summary.record(DocumentReport {
                path,
                outcome,
                elapsed_ms,
            });
            run.progress(percent(index + 1, total));
        }

        Ok(run.close())
    }

    /// Collect eligible documents in traversal order, counting the rest as ignored.
    fn enumerate(&self, source_dir: &Path, kind: DocumentKind, run: &mut Run<'_>) -> Vec<PathBuf> {
        let walker = WalkDir::new(source_dir)
            .follow_links(self.config.follow_links)
            .sort_by_file_name();

        let mut documents = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if kind.matches(entry.path()) {
                        documents.push(entry.into_path());
                    } else {
                        debug!("Ignoring {}", entry.path().display());
                        run.summary.ignored += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let location = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| source_dir.display().to_string());
                    warn!("Traversal error at {}: {}", location, e);
                    run.log(&format!("Error reading {}: {}", location, e));
                    run.summary.errors.push(format!("{} - traversal error: {}", location, e));
                }
            }
        }
        documents
    }
}

/// Mutable state of one run. Only the orchestrator touches it.
struct Run<'a> {
    phase: BatchPhase,
    summary: BatchSummary,
    observer: &'a mut dyn BatchObserver,
    last_percent: u8,
}

impl Run<'_> {
    fn enter(&mut self, phase: BatchPhase) {
        debug!("Batch phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }

    fn log(&mut self, line: &str) {
        debug!(target: "nfse::batch", "{}", line);
        self.observer.on_log(line);
    }

    fn progress(&mut self, percent: u8) {
        self.last_percent = self.last_percent.max(percent);
        self.observer.on_progress(self.last_percent);
    }

    /// Enter `Done`: log the closing counters, emit 100 and hand back the summary.
    fn close(mut self) -> BatchSummary {
        self.enter(BatchPhase::Done);
        self.summary.finish();
        self.log(BANNER);
        self.log(">>> PROCESS FINISHED");
        self.log(&format!("Total found: {}", self.summary.total_found));
        self.log(&format!("Renamed:     {}", self.summary.renamed));
        self.log(&format!("Skipped:     {}", self.summary.skipped));
        self.log(&format!("Ignored:     {}", self.summary.ignored));
        self.log(&format!("Errors:      {}", self.summary.errors.len()));
        self.log(BANNER);
        self.observer.on_progress(100);
        self.summary
    }

    fn report_outcome(&mut self, path: &Path, outcome: &Outcome) {
        let name = file_name(path);
        let line = match outcome {
            Outcome::Renamed { destination } => {
                info!("Renamed {} -> {}", path.display(), destination.display());
                format!("Renamed -> {}", file_name(destination))
            }
            Outcome::SkippedExisting { destination } => {
                info!("Destination already exists: {}", destination.display());
                format!("Already exists (counted as success): {}", file_name(destination))
            }
            Outcome::SkippedNoText => {
                warn!("No text in {}", path.display());
                format!("Skipped - PDF without text (scanned image without OCR?): {}", name)
            }
            Outcome::SkippedUnidentified => {
                warn!("Unidentified layout in {}", path.display());
                format!("Skipped - not identified: {}", name)
            }
            Outcome::TimedOut => format!("TIMEOUT -> {}", name),
            Outcome::Error { reason } => {
                error!("Failed to process {}: {}", path.display(), reason);
                format!("Error processing {}: {}", name, reason)
            }
        };
        self.log(&line);
    }
}

fn validate(source_dir: &Path, dest_dir: &Path, selector: &str) -> Result<DocumentKind> {
    let kind: DocumentKind = selector.parse()?;

    if !source_dir.is_dir() {
        return Err(RenameError::missing_source(source_dir));
    }
    if dest_dir.exists() && !dest_dir.is_dir() {
        return Err(RenameError::Config(format!(
            "destination is not a directory: {}",
            dest_dir.display()
        )));
    }
    Ok(kind)
}

/// `floor(processed * 100 / total)`, with an empty batch at 0%.
fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (processed.min(total) * 100 / total) as u8
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn display_absolute(path: &Path) -> String {
    std::path::absolute(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::FnObserver;
    use crate::pdf;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::thread;
    use std::time::Duration;

    /// Reads the "PDF" as plain UTF-8 text; files named `slow*` stall.
    struct PlainText;

    impl TextSource for PlainText {
        fn extract_text(&self, path: &Path) -> pdf::Result<String> {
            if file_name(path).starts_with("slow") {
                thread::sleep(Duration::from_secs(3));
            }
            fs::read_to_string(path).map_err(|source| crate::error::PdfError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    fn invoice(customer: &str, number: &str) -> String {
        format!(
            "NOME / NOME EMPRESARIAL\n\
             12.345.678/0001-00 EMPRESA TESTE LTDA\n\
             NOME / NOME EMPRESARIAL\n\
             {}\n\
             NÚMERO DA NFS-E\n\
             {}\n\
             DATA E HORA DA EMISSÃO\n\
             15/03/2024 10:00\n",
            customer, number
        )
    }

    fn renamer(timeout_secs: u64) -> BatchRenamer {
        BatchRenamer::new(BatchConfig {
            timeout_secs,
            ..BatchConfig::default()
        })
        .with_text_source(Arc::new(PlainText))
    }

    #[derive(Default)]
    struct Recorder {
        lines: Vec<String>,
        progress: Vec<u8>,
    }

    impl BatchObserver for Recorder {
        fn on_log(&mut self, line: &str) {
            self.lines.push(line.to_string());
        }

        fn on_progress(&mut self, percent: u8) {
            self.progress.push(percent);
        }
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 66);
        assert_eq!(percent(3, 3), 100);
    }

    #[tokio::test]
    async fn test_mixed_batch() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        let customer = "CONDOMINIO DO EDIFICIO RESIDENCIAL TORRE SUL";
        fs::write(source.path().join("a.pdf"), invoice(customer, "202400123")).unwrap();
        fs::write(source.path().join("b.pdf"), "NOME / NOME EMPRESARIAL\nSO UMA VEZ\n").unwrap();
        fs::write(source.path().join("c.pdf"), "   \n").unwrap();
        fs::write(source.path().join("notes.txt"), "not a document").unwrap();
        fs::create_dir(source.path().join("sub")).unwrap();
        let nested = source.path().join("sub").join("d.PDF");
        fs::write(nested, invoice("RESIDENCIAL NORTE", "7")).unwrap();

        let mut recorder = Recorder::default();
        let summary = renamer(5)
            .process(source.path(), dest.path(), "NFS", &mut recorder)
            .await
            .unwrap();

        assert_eq!(summary.total_found, 4);
        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.ignored, 1);
        assert_eq!(
            summary.errors,
            vec![
                "b.pdf - not identified".to_string(),
                "c.pdf - PDF has no text (scanned image without OCR)".to_string(),
            ]
        );
        assert_eq!(
            summary
                .documents
                .iter()
                .map(|d| d.outcome.label())
                .collect::<Vec<_>>(),
            vec!["renamed", "skipped_unidentified", "skipped_no_text", "renamed"]
        );
        assert!(dest
            .path()
            .join("SUL_EMPRESA_TESTE_LTDA_NFS_NUM-202400123_15-03-2024.pdf")
            .exists());
        assert!(dest
            .path()
            .join("NORTE_EMPRESA_TESTE_LTDA_NFS_NUM-7_15-03-2024.pdf")
            .exists());
        assert_eq!(recorder.progress, vec![25, 50, 75, 100, 100]);
        assert!(recorder.lines.iter().any(|l| l == "Reading (1/4): a.pdf"));
        assert!(recorder.lines.iter().any(|l| l == ">>> PROCESS FINISHED"));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.pdf"), invoice("TORRE A", "1")).unwrap();
        fs::write(source.path().join("b.pdf"), invoice("TORRE B", "2")).unwrap();

        let renamer = renamer(5);
        let first = renamer
            .process(source.path(), dest.path(), "NFS", &mut crate::batch::NullObserver)
            .await
            .unwrap();
        assert_eq!(first.count_label("renamed"), 2);

        let second = renamer
            .process(source.path(), dest.path(), "NFS", &mut crate::batch::NullObserver)
            .await
            .unwrap();
        assert_eq!(second.renamed, 2);
        assert_eq!(second.count_label("skipped_existing"), 2);
        assert!(second.errors.is_empty());
        assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 2);
        // Sources are untouched
        assert_eq!(fs::read_dir(source.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_timeout_does_not_stop_batch() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.pdf"), invoice("TORRE A", "1")).unwrap();
        fs::write(source.path().join("slow.pdf"), invoice("TORRE S", "2")).unwrap();
        fs::write(source.path().join("z.pdf"), invoice("TORRE Z", "3")).unwrap();

        let start = Instant::now();
        let summary = renamer(1)
            .process(source.path(), dest.path(), "NFS", &mut crate::batch::NullObserver)
            .await
            .unwrap();

        assert!(start.elapsed() < Duration::from_millis(2500));
        assert_eq!(summary.renamed, 2);
        assert_eq!(summary.errors, vec!["slow.pdf - TIMEOUT".to_string()]);
        assert_eq!(summary.documents[1].outcome, Outcome::TimedOut);
        assert_eq!(summary.documents[2].outcome.label(), "renamed");
    }

    #[tokio::test]
    async fn test_empty_source_reports_full_progress() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        let mut progress = Vec::new();
        let mut observer = FnObserver::new(|_: &str| {}, |p| progress.push(p));
        let summary = renamer(5)
            .process(source.path(), dest.path(), "NFS", &mut observer)
            .await
            .unwrap();

        assert_eq!(summary.total_found, 0);
        assert!(summary.finished_at.is_some());
        assert_eq!(progress, vec![100]);
    }

    /// Unwraps an aborted run into its setup fault and zero summary.
    fn aborted(result: Result<BatchSummary>) -> (RenameError, BatchSummary) {
        match result {
            Err(RenameError::Aborted { source, summary }) => (*source, *summary),
            other => panic!("expected an aborted batch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_source_aborts_with_final_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut recorder = Recorder::default();

        let result = renamer(5)
            .process(&dir.path().join("missing"), dir.path(), "NFS", &mut recorder)
            .await;

        let (fault, summary) = aborted(result);
        assert!(matches!(fault, RenameError::Config(ref m) if m.contains("source directory")));
        assert_eq!(summary.total_found, 0);
        assert_eq!(summary.renamed, 0);
        assert_eq!(summary.skipped, 0);
        assert!(summary.documents.is_empty());
        assert!(summary.finished_at.is_some());
        assert_eq!(recorder.progress, vec![100]);
        assert!(recorder.lines.iter().any(|l| l.starts_with("Setup error:")));
        assert!(recorder.lines.iter().any(|l| l == ">>> PROCESS FINISHED"));
        assert!(recorder.lines.iter().any(|l| l == "Total found: 0"));
    }

    #[tokio::test]
    async fn test_destination_file_aborts() {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.pdf"), invoice("TORRE A", "1")).unwrap();
        let dest = source.path().join("out");
        fs::write(&dest, "a regular file").unwrap();

        let result = renamer(5)
            .process(source.path(), &dest, "NFS", &mut crate::batch::NullObserver)
            .await;

        let (fault, summary) = aborted(result);
        assert!(matches!(fault, RenameError::Config(ref m) if m.contains("not a directory")));
        assert_eq!(summary.total_found, 0);
        assert!(dest.is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_traversal_error_is_recorded() {
        let source = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.pdf"), invoice("TORRE A", "1")).unwrap();
        std::os::unix::fs::symlink(source.path().join("gone"), source.path().join("dangling"))
            .unwrap();

        let mut recorder = Recorder::default();
        let summary = BatchRenamer::new(BatchConfig {
            follow_links: true,
            ..BatchConfig::default()
        })
        .with_text_source(Arc::new(PlainText))
        .process(source.path(), dest.path(), "NFS", &mut recorder)
        .await
        .unwrap();

        assert_eq!(summary.total_found, 1);
        assert_eq!(summary.renamed, 1);
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("dangling"));
        assert!(summary.errors[0].contains("traversal error"));
        assert!(recorder.lines.iter().any(|l| l.starts_with("Error reading")));
    }

    #[tokio::test]
    async fn test_unsupported_selector_aborts_before_counting() {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("a.pdf"), invoice("TORRE A", "1")).unwrap();
        let dest = source.path().join("out");

        let result = renamer(5)
            .process(source.path(), &dest, "NFE", &mut crate::batch::NullObserver)
            .await;

        let (fault, summary) = aborted(result);
        assert!(matches!(fault, RenameError::Config(ref m) if m.contains("unsupported")));
        assert_eq!(summary.total_found, 0);
        assert!(!dest.exists());
    }
}
