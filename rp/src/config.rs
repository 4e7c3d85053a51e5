//! Configuration for reportpatch

use eyre::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::patchset::builtin::DEFAULT_TARGET;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Template file patched when no --target is given
    #[serde(default = "default_target")]
    pub target: PathBuf,

    /// Include the sets compiled into the binary
    #[serde(rename = "use-builtin", default = "default_use_builtin")]
    pub use_builtin: bool,

    /// Directories searched for *.yml patch sets, later overriding earlier
    #[serde(rename = "patch-dirs", default = "default_patch_dirs")]
    pub patch_dirs: Vec<String>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", default)]
    pub log_level: Option<String>,
}

fn default_target() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET)
}

fn default_use_builtin() -> bool {
    true
}

fn default_patch_dirs() -> Vec<String> {
    vec![
        "~/.config/reportpatch/patches".to_string(),
        ".reportpatch/patches".to_string(),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: default_target(),
            use_builtin: default_use_builtin(),
            patch_dirs: default_patch_dirs(),
            log_level: None,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        debug!(?path, "Config::load: called");
        if let Some(config_path) = path {
            return Self::load_from(config_path);
        }

        for path in Self::default_paths() {
            if path.exists() {
                debug!(?path, "Config::load: found default config");
                return Self::load_from(&path);
            }
        }

        debug!("Config::load: no config file, using defaults");
        Ok(Config::default())
    }

    /// Peek at the log level before logging is set up; errors are ignored here
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        Self::load(path).ok().and_then(|c| c.log_level)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("reportpatch").join("reportpatch.yml")),
            Some(PathBuf::from("reportpatch.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Patch directories with `~` expanded
    pub fn expanded_patch_dirs(&self) -> Vec<PathBuf> {
        self.patch_dirs.iter().map(|p| expand_tilde(p)).collect()
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
