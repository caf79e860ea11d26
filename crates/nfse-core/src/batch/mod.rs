//! Bounded-time batch renaming.
//!
//! The orchestrator walks a source tree and hands each eligible document to
//! the deadline wrapper, which runs text extraction and the document
//! processor on a worker thread raced against a timer.

mod deadline;
mod orchestrator;
mod processor;

pub use deadline::DeadlineRunner;
pub use orchestrator::{BatchPhase, BatchRenamer};
pub use processor::process_document;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives user-facing log lines and progress updates from a batch run.
///
/// Calls arrive in processing order; progress values never decrease and
/// the last one is always 100.
pub trait BatchObserver {
    fn on_log(&mut self, line: &str);

    fn on_progress(&mut self, percent: u8);
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl BatchObserver for NullObserver {
    fn on_log(&mut self, _line: &str) {}

    fn on_progress(&mut self, _percent: u8) {}
}

/// Observer built from two closures.
pub struct FnObserver<L, P> {
    log: L,
    progress: P,
}

impl<L, P> FnObserver<L, P>
where
    L: FnMut(&str),
    P: FnMut(u8),
{
    pub fn new(log: L, progress: P) -> Self {
        Self { log, progress }
    }
}

impl<L, P> BatchObserver for FnObserver<L, P>
where
    L: FnMut(&str),
    P: FnMut(u8),
{
    fn on_log(&mut self, line: &str) {
        (self.log)(line)
    }

    fn on_progress(&mut self, percent: u8) {
        (self.progress)(percent)
    }
}

/// Cooperative cancellation flag shared with a document worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
