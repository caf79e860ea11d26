//! Field extraction and canonical filename composition.

mod composer;
pub mod fields;
pub mod normalize;
pub mod patterns;

pub use composer::{compose_fields, compose_name};

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{CompositionError, RenameError};

/// Result type for composition operations.
pub type Result<T> = std::result::Result<T, CompositionError>;

/// Raw fields located in one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    pub provider: Option<String>,
    pub customer: Option<String>,
    pub invoice_number: Option<String>,
    pub issue_date: Option<String>,
}

impl FieldSet {
    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// Names of the fields that were not found.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("provider", &self.provider),
            ("customer", &self.customer),
            ("invoice_number", &self.invoice_number),
            ("issue_date", &self.issue_date),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Supported document layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    /// Municipal service invoice (NFS-e).
    Nfs,
}

impl DocumentKind {
    /// Extension of eligible source files, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Nfs => "pdf",
        }
    }

    /// Whether `path` has this kind's extension, ignoring case.
    pub fn matches(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.extension()))
    }

    /// Compose the canonical name for a document of this kind.
    pub fn compose_name(&self, text: &str) -> Result<String> {
        match self {
            DocumentKind::Nfs => compose_name(text),
        }
    }
}

impl FromStr for DocumentKind {
    type Err = RenameError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NFS" => Ok(DocumentKind::Nfs),
            other => Err(RenameError::Config(format!("unsupported document type: {}", other))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Nfs => f.write_str("NFS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_document_kind() {
        assert_eq!("NFS".parse::<DocumentKind>().unwrap(), DocumentKind::Nfs);
        assert_eq!(" nfs ".parse::<DocumentKind>().unwrap(), DocumentKind::Nfs);
        assert!(matches!("NFE".parse::<DocumentKind>(), Err(RenameError::Config(_))));
    }

    #[test]
    fn test_document_kind_matches_extension() {
        let kind = DocumentKind::Nfs;
        assert!(kind.matches(Path::new("a/b/nota.pdf")));
        assert!(kind.matches(Path::new("NOTA.PDF")));
        assert!(!kind.matches(Path::new("nota.txt")));
        assert!(!kind.matches(Path::new("pdf")));
    }

    #[test]
    fn test_field_set_missing() {
        let fields = FieldSet {
            provider: Some("A".to_string()),
            customer: None,
            invoice_number: Some("1".to_string()),
            issue_date: None,
        };
        assert_eq!(fields.missing(), vec!["customer", "issue_date"]);
        assert!(!fields.is_complete());
    }
}
