//! PDF text extraction module.

mod extractor;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Source of a document's raw text.
///
/// Implementations run on a blocking worker thread, so they must be
/// `Send + Sync`. An image-only document yields an empty string rather
/// than an error.
pub trait TextSource: Send + Sync {
    /// Extract the full text of the document at `path`.
    fn extract_text(&self, path: &Path) -> Result<String>;
}

/// Text source backed by lopdf and pdf-extract.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextSource;

impl PdfTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for PdfTextSource {
    fn extract_text(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path).map_err(|source| PdfError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;
        extractor.extract_text()
    }
}
