//! Named, ordered patch sequences
//!
//! A patch set is one maintenance edit of the report template: an explicit
//! ordered list of patches where each patch may rely on the shape left by the
//! ones before it. Sets come from the built-in catalog or from YAML files:
//!
//! ```yaml
//! description: Tighten scholastic table padding
//! message: Tightened padding.
//! patches:
//!   - name: th-padding
//!     literal: "padding: 9px 14px !important;"
//!     replace: "padding: 6px 4px !important;"
//!     mode: optional
//! ```

pub mod builtin;
mod loader;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patch::{Patch, PatchDef};

pub use loader::PatchSetLoader;

/// Where a patch set was defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for SetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetSource::Builtin => write!(f, "builtin"),
            SetSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An ordered list of patches applied as one edit
#[derive(Debug, Clone)]
pub struct PatchSet {
    pub name: String,
    pub description: String,
    /// Status line printed after a successful apply
    pub message: Option<String>,
    pub patches: Vec<Patch>,
    pub source: SetSource,
}

impl PatchSet {
    pub fn new(name: impl Into<String>, description: impl Into<String>, patches: Vec<Patch>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            message: None,
            patches,
            source: SetSource::Builtin,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Reject sets whose patches are invalid or share a name
    pub fn validate(&self) -> Result<()> {
        debug!(name = %self.name, "PatchSet::validate: called");
        if self.patches.is_empty() {
            return Err(eyre!("Patch set '{}' has no patches", self.name));
        }

        let mut seen = HashSet::new();
        for patch in &self.patches {
            patch
                .validate()
                .wrap_err_with(|| format!("Patch set '{}' is invalid", self.name))?;
            if !seen.insert(patch.name.as_str()) {
                return Err(eyre!("Patch set '{}' has duplicate patch name '{}'", self.name, patch.name));
            }
        }
        Ok(())
    }

    /// Parse a set from YAML; `fallback_name` is used when the file names none
    pub fn from_yaml(content: &str, fallback_name: &str, source: SetSource) -> Result<Self> {
        debug!(%fallback_name, %source, "PatchSet::from_yaml: called");
        let def: PatchSetDef =
            serde_yaml::from_str(content).with_context(|| format!("Failed to parse patch set: {}", source))?;

        let name = def.name.unwrap_or_else(|| fallback_name.to_string());
        let patches = def
            .patches
            .into_iter()
            .map(Patch::try_from)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Invalid patch in set '{}'", name))?;

        let set = PatchSet {
            name,
            description: def.description,
            message: def.message,
            patches,
            source,
        };
        set.validate()?;
        Ok(set)
    }

    /// Load a set from a YAML file, named after the file stem unless it names itself
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(?path, "PatchSet::from_file: called");
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read: {}", path.display()))?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| eyre!("Invalid filename: {}", path.display()))?;
        Self::from_yaml(&content, stem, SetSource::File(path.to_path_buf()))
    }
}

/// A patch set as written in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchSetDef {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub message: Option<String>,

    pub patches: Vec<PatchDef>,
}

/// Concatenate several sets into one patch sequence, in the order given
pub fn concat_patches<'a>(sets: impl IntoIterator<Item = &'a PatchSet>) -> Vec<Patch> {
    sets.into_iter().flat_map(|set| set.patches.iter().cloned()).collect()
}
