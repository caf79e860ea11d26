//! Per-document deadline enforcement.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::{process_document, CancelToken};
use crate::models::outcome::Outcome;
use crate::naming::DocumentKind;
use crate::pdf::TextSource;

/// Runs extraction and processing of one document under a time budget.
///
/// The work happens on a detached worker thread that reports back over a
/// oneshot channel. When the deadline fires first the receiver is dropped,
/// the cancel token is set, and whatever the worker produces afterwards is
/// discarded. Detached threads do not hold up runtime or process shutdown.
#[derive(Clone)]
pub struct DeadlineRunner {
    text_source: Arc<dyn TextSource>,
    kind: DocumentKind,
    deadline: Duration,
}

impl DeadlineRunner {
    pub fn new(text_source: Arc<dyn TextSource>, kind: DocumentKind, deadline: Duration) -> Self {
        Self {
            text_source,
            kind,
            deadline,
        }
    }

    /// Process `path` into `dest_dir`, returning `TimedOut` if the deadline passes.
    pub async fn run(&self, path: &Path, dest_dir: &Path) -> Outcome {
        let cancel = CancelToken::new();
        let (tx, rx) = oneshot::channel();

        let worker = Worker {
            text_source: Arc::clone(&self.text_source),
            kind: self.kind,
            path: path.to_path_buf(),
            dest_dir: dest_dir.to_path_buf(),
            cancel: cancel.clone(),
        };

        let spawned = thread::Builder::new()
            .name("nfse-worker".to_string())
            .spawn(move || {
                let outcome = worker.run();
                // The receiver is gone if the deadline already fired.
                let _ = tx.send(outcome);
            });
        if let Err(e) = spawned {
            return Outcome::error(format!("failed to start worker: {}", e));
        }

        match tokio::time::timeout(self.deadline, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Outcome::error("worker terminated unexpectedly"),
            Err(_) => {
                cancel.cancel();
                warn!(
                    "Deadline of {:?} exceeded for {}",
                    self.deadline,
                    path.display()
                );
                Outcome::TimedOut
            }
        }
    }
}

struct Worker {
    text_source: Arc<dyn TextSource>,
    kind: DocumentKind,
    path: PathBuf,
    dest_dir: PathBuf,
    cancel: CancelToken,
}

impl Worker {
    fn run(self) -> Outcome {
        let text = match self.text_source.extract_text(&self.path) {
            Ok(text) => text,
            Err(e) => return Outcome::error(format!("failed to open/read document: {}", e)),
        };
        debug!("Extracted {} chars from {}", text.chars().count(), self.path.display());

        if self.cancel.is_cancelled() {
            return Outcome::TimedOut;
        }

        process_document(&self.path, &text, &self.dest_dir, self.kind, &self.cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use std::fs;
    use std::time::Instant;

    struct StaticText(&'static str);

    impl TextSource for StaticText {
        fn extract_text(&self, _path: &Path) -> crate::pdf::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct Stalling(Duration);

    impl TextSource for Stalling {
        fn extract_text(&self, _path: &Path) -> crate::pdf::Result<String> {
            thread::sleep(self.0);
            Ok(String::new())
        }
    }

    struct Failing;

    impl TextSource for Failing {
        fn extract_text(&self, _path: &Path) -> crate::pdf::Result<String> {
            Err(PdfError::Encrypted)
        }
    }

    struct Panicking;

    impl TextSource for Panicking {
        fn extract_text(&self, _path: &Path) -> crate::pdf::Result<String> {
            panic!("malformed content stream");
        }
    }

    fn runner(source: impl TextSource + 'static, deadline: Duration) -> DeadlineRunner {
        DeadlineRunner::new(Arc::new(source), DocumentKind::Nfs, deadline)
    }

    #[tokio::test]
    async fn test_completed_work_returns_processor_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        fs::write(&path, b"x").unwrap();

        let outcome = runner(StaticText("   "), Duration::from_secs(5))
            .run(&path, dir.path())
            .await;
        assert_eq!(outcome, Outcome::SkippedNoText);
    }

    #[tokio::test]
    async fn test_stalled_work_times_out_within_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.pdf");

        let start = Instant::now();
        let outcome = runner(Stalling(Duration::from_secs(3)), Duration::from_millis(200))
            .run(&path, dir.path())
            .await;

        assert_eq!(outcome, Outcome::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_extraction_error_becomes_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = runner(Failing, Duration::from_secs(5))
            .run(&dir.path().join("locked.pdf"), dir.path())
            .await;

        match outcome {
            Outcome::Error { reason } => assert!(reason.contains("encrypted")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_worker_panic_becomes_error_outcome() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = runner(Panicking, Duration::from_secs(5))
            .run(&dir.path().join("bad.pdf"), dir.path())
            .await;

        assert_eq!(outcome, Outcome::error("worker terminated unexpectedly"));
    }
}
