//! Patch set loading
//!
//! Sets are loaded from:
//! 1. Builtin (compiled into the binary)
//! 2. User global (~/.config/reportpatch/patches/*.yml)
//! 3. Project-specific (.reportpatch/patches/*.yml)
//!
//! Later definitions override earlier ones with the same name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use super::{PatchSet, builtin};
use crate::config::Config;

/// Catalog of every patch set visible to the current invocation
pub struct PatchSetLoader {
    sets: HashMap<String, PatchSet>,
    /// Names in load order; an override keeps the original position
    order: Vec<String>,
}

impl PatchSetLoader {
    /// Load builtins (if enabled) and every YAML set in `dirs`
    pub fn new(use_builtin: bool, dirs: &[PathBuf]) -> Result<Self> {
        debug!(use_builtin, ?dirs, "PatchSetLoader::new: called");
        let mut loader = Self {
            sets: HashMap::new(),
            order: Vec::new(),
        };

        if use_builtin {
            loader.load_builtins()?;
        } else {
            debug!("PatchSetLoader::new: builtin sets disabled");
        }

        for dir in dirs {
            if dir.is_dir() {
                loader.load_from_directory(dir)?;
            } else {
                debug!(?dir, "PatchSetLoader::new: directory does not exist, skipping");
            }
        }

        info!(count = loader.sets.len(), "Loaded patch sets");
        Ok(loader)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.use_builtin, &config.expanded_patch_dirs())
    }

    fn insert(&mut self, set: PatchSet) {
        debug!(name = %set.name, source = %set.source, "PatchSetLoader::insert: called");
        if !self.sets.contains_key(&set.name) {
            self.order.push(set.name.clone());
        }
        self.sets.insert(set.name.clone(), set);
    }

    fn load_builtins(&mut self) -> Result<()> {
        debug!("load_builtins: called");
        for set in builtin::all_builtins().context("Failed to build builtin patch sets")? {
            self.insert(set);
        }
        Ok(())
    }

    /// Load all .yml/.yaml files from a directory, warning on the ones that fail
    fn load_from_directory(&mut self, dir: &Path) -> Result<()> {
        debug!(?dir, "load_from_directory: called");
        let entries = fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| is_yaml(p))
            .collect();
        paths.sort();

        for path in paths {
            match PatchSet::from_file(&path) {
                Ok(set) => self.insert(set),
                Err(e) => warn!(?path, error = %e, "Failed to load patch set file"),
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PatchSet> {
        self.sets.get(name)
    }

    /// Resolve a set by name, or load it from `name` when that is a YAML file path
    pub fn resolve(&self, name: &str) -> Result<PatchSet> {
        debug!(%name, "PatchSetLoader::resolve: called");
        if let Some(set) = self.get(name) {
            return Ok(set.clone());
        }

        let path = Path::new(name);
        if is_yaml(path) && path.is_file() {
            return PatchSet::from_file(path);
        }

        Err(eyre!(
            "Unknown patch set '{}'. Available: {}",
            name,
            self.order.join(", ")
        ))
    }

    /// All sets in load order
    pub fn list(&self) -> Vec<&PatchSet> {
        self.order.iter().filter_map(|name| self.sets.get(name)).collect()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension().map(|e| e == "yml" || e == "yaml").unwrap_or(false)
}
