//! Configuration structures for the renaming pipeline.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the nfse pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NfseConfig {
    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Report output configuration.
    pub output: OutputConfig,
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// Document type selector. Only "NFS" is supported.
    pub document_type: String,

    /// Per-document time budget in seconds.
    pub timeout_secs: u64,

    /// Follow symbolic links while walking the source tree.
    pub follow_links: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            document_type: "NFS".to_string(),
            timeout_secs: 5,
            follow_links: false,
        }
    }
}

impl BatchConfig {
    /// Per-document deadline. A zero value falls back to one second.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Write a per-document CSV summary into the destination directory.
    pub write_summary: bool,

    /// File name of the CSV summary.
    pub summary_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_summary: false,
            summary_file: "summary.csv".to_string(),
        }
    }
}

impl NfseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
