//! Core library for NFS-e invoice renaming.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Positional field extraction and canonical filename composition
//! - A per-document deadline wrapper and a sequential batch orchestrator

pub mod error;
pub mod models;
pub mod pdf;
pub mod naming;
pub mod batch;

pub use error::{CompositionError, PdfError, RenameError, Result};
pub use models::config::NfseConfig;
pub use models::outcome::{BatchSummary, DocumentReport, Outcome};
pub use pdf::{PdfTextSource, TextSource};
pub use naming::{compose_fields, compose_name, DocumentKind, FieldSet};
pub use batch::{BatchObserver, BatchRenamer, CancelToken, FnObserver, NullObserver};
