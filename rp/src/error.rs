//! Patch error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or applying patches
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("Anchor not found for patch '{patch}': {anchor}")]
    AnchorNotFound { patch: String, anchor: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid regex in patch '{patch}': {source}")]
    InvalidRegex {
        patch: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid patch '{patch}': {reason}")]
    InvalidPatch { patch: String, reason: String },
}

impl PatchError {
    /// Check if this error came from a missing required anchor
    pub fn is_anchor_not_found(&self) -> bool {
        matches!(self, PatchError::AnchorNotFound { .. })
    }

    /// Name of the patch that failed, if the error belongs to one
    pub fn patch_name(&self) -> Option<&str> {
        match self {
            PatchError::AnchorNotFound { patch, .. }
            | PatchError::InvalidRegex { patch, .. }
            | PatchError::InvalidPatch { patch, .. } => Some(patch),
            PatchError::Io { .. } => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PatchError::Io {
            path: path.into(),
            source,
        }
    }
}
