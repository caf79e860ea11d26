//! Single-document processing: compose the name, then commit a copy.

use std::fs::{self, File, Metadata};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::CancelToken;
use crate::error::CompositionError;
use crate::models::outcome::Outcome;
use crate::naming::DocumentKind;

/// Decide and perform the copy for one document whose text is already known.
///
/// Never returns an error: every fault becomes an [`Outcome`].
pub fn process_document(
    source: &Path,
    text: &str,
    dest_dir: &Path,
    kind: DocumentKind,
    cancel: &CancelToken,
) -> Outcome {
    if text.trim().is_empty() {
        return Outcome::SkippedNoText;
    }

    let name = match kind.compose_name(text) {
        Ok(name) => name,
        Err(CompositionError::NoText) => return Outcome::SkippedNoText,
        Err(CompositionError::Unidentified(reason)) => {
            debug!("{} not identified: {}", source.display(), reason);
            return Outcome::SkippedUnidentified;
        }
    };

    let extension = source
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| kind.extension().to_string());
    let destination = dest_dir.join(format!("{}.{}", name, extension));

    match commit_copy(source, &destination, cancel) {
        Ok(outcome) => outcome,
        Err(e) => Outcome::error(format!("failed to copy to {}: {}", destination.display(), e)),
    }
}

/// Copy `source` to `destination` through a temp file in the same directory.
///
/// The temp file is persisted with a no-clobber rename, so a failed or
/// cancelled copy never leaves a partial destination behind.
fn commit_copy(source: &Path, destination: &Path, cancel: &CancelToken) -> io::Result<Outcome> {
    let dest_dir = destination
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dest_dir)?;

    if destination.exists() {
        return Ok(Outcome::SkippedExisting {
            destination: destination.to_path_buf(),
        });
    }

    let mut input = File::open(source)?;
    let metadata = input.metadata()?;

    let mut temp = tempfile::Builder::new()
        .prefix(".nfse-")
        .suffix(".part")
        .tempfile_in(&dest_dir)?;
    let bytes = io::copy(&mut input, temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    copy_attributes(&metadata, temp.as_file());
    trace!("Copied {} bytes into {}", bytes, temp.path().display());

    if cancel.is_cancelled() {
        return Ok(Outcome::TimedOut);
    }

    match temp.persist_noclobber(destination) {
        Ok(_) => Ok(Outcome::Renamed {
            destination: destination.to_path_buf(),
        }),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(Outcome::SkippedExisting {
            destination: destination.to_path_buf(),
        }),
        Err(e) => Err(e.error),
    }
}

/// Best-effort copy of modification time and permissions.
fn copy_attributes(metadata: &Metadata, file: &File) {
    if let Ok(modified) = metadata.modified() {
        if let Err(e) = file.set_modified(modified) {
            debug!("Could not preserve modification time: {}", e);
        }
    }
    if let Err(e) = file.set_permissions(metadata.permissions()) {
        debug!("Could not preserve permissions: {}", e);
    }
}
