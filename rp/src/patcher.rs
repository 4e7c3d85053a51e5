//! Template Patcher: read, patch in memory, write once

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::document::{Document, PatchReport};
use crate::error::PatchError;
use crate::patch::Patch;

/// Outcome of a successful [`apply_patches`] call
#[derive(Debug, Clone)]
pub struct PatchResult {
    pub path: PathBuf,
    pub reports: Vec<PatchReport>,
    pub bytes_before: usize,
    pub bytes_after: usize,
    /// Text as read from disk
    pub original: String,
    /// Text after every patch ran, identical to `original` when nothing applied
    pub patched: String,
    /// False when the patched text was identical and the file was left alone
    pub written: bool,
}

impl PatchResult {
    pub fn applied_count(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports.len() - self.applied_count()
    }
}

/// Dry-run result of [`preview_patches`]
#[derive(Debug, Clone)]
pub struct Preview {
    pub original: String,
    pub patched: String,
    pub reports: Vec<PatchReport>,
}

impl Preview {
    pub fn is_changed(&self) -> bool {
        self.original != self.patched
    }
}

/// Read the target file as a UTF-8 document
pub fn read_document(path: impl AsRef<Path>) -> Result<Document, PatchError> {
    let path = path.as_ref();
    debug!(?path, "read_document: called");
    let text = fs::read_to_string(path).map_err(|e| PatchError::io(path, e))?;
    debug!(?path, len = text.len(), "read_document: read");
    Ok(Document::new(text))
}

/// Apply `patches` in order to the file at `path` and overwrite it once
///
/// Nothing is written unless every patch succeeds, so a missing required
/// anchor leaves the file byte-for-byte as it was.
pub fn apply_patches(path: impl AsRef<Path>, patches: &[Patch]) -> Result<PatchResult, PatchError> {
    let path = path.as_ref();
    debug!(?path, count = patches.len(), "apply_patches: called");

    let mut doc = read_document(path)?;
    let original = doc.clone();
    let reports = doc.apply_all(patches)?;

    let written = if doc == original {
        debug!(?path, "apply_patches: text unchanged, skipping write");
        false
    } else {
        write_atomic(path, doc.as_str())?;
        true
    };

    let result = PatchResult {
        path: path.to_path_buf(),
        bytes_before: original.len(),
        bytes_after: doc.len(),
        original: original.into_text(),
        patched: doc.into_text(),
        reports,
        written,
    };
    info!(
        ?path,
        applied = result.applied_count(),
        skipped = result.skipped_count(),
        written,
        "Patched template"
    );
    Ok(result)
}

/// Run the same pipeline as [`apply_patches`] without touching the file
pub fn preview_patches(path: impl AsRef<Path>, patches: &[Patch]) -> Result<Preview, PatchError> {
    let path = path.as_ref();
    debug!(?path, count = patches.len(), "preview_patches: called");

    let mut doc = read_document(path)?;
    let original = doc.as_str().to_string();
    let reports = doc.apply_all(patches)?;

    Ok(Preview {
        original,
        patched: doc.into_text(),
        reports,
    })
}

/// Replace the file behind `path` via a temp file in the same directory, keeping its permissions
///
/// Symlinks are followed so the link survives and its target receives the text.
fn write_atomic(path: &Path, text: &str) -> Result<(), PatchError> {
    debug!(?path, len = text.len(), "write_atomic: called");
    let resolved = fs::canonicalize(path).map_err(|e| PatchError::io(path, e))?;
    let path = resolved.as_path();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let permissions = fs::metadata(path).map_err(|e| PatchError::io(path, e))?.permissions();

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PatchError::io(dir, e))?;
    tmp.write_all(text.as_bytes()).map_err(|e| PatchError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| PatchError::io(tmp.path(), e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| PatchError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| PatchError::io(path, e.error))?;

    debug!(?path, "write_atomic: persisted");
    Ok(())
}
