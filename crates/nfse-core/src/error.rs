//! Error types for the nfse-core library.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::outcome::BatchSummary;

/// Main error type for the nfse library.
#[derive(Error, Debug)]
pub enum RenameError {
    /// Bad source directory, destination or document type.
    #[error("configuration error: {0}")]
    Config(String),

    /// A batch could not start. Carries the finished, empty summary.
    #[error("batch aborted")]
    Aborted {
        #[source]
        source: Box<RenameError>,
        summary: Box<BatchSummary>,
    },
}

impl RenameError {
    pub(crate) fn missing_source(path: &Path) -> Self {
        RenameError::Config(format!("source directory not found: {}", path.display()))
    }

    /// The zero-document summary of an aborted batch.
    pub fn summary(&self) -> Option<&BatchSummary> {
        match self {
            RenameError::Aborted { summary, .. } => Some(&**summary),
            RenameError::Config(_) => None,
        }
    }
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to read the file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors produced while composing a canonical name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// Text was empty or whitespace only.
    #[error("document has no text")]
    NoText,

    /// Layout not recognised or a required field is missing.
    #[error("document not identified: {0}")]
    Unidentified(String),
}

/// Result type for the nfse library.
pub type Result<T> = std::result::Result<T, RenameError>;
