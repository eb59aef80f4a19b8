//! Configuration loading and parsing.
//!
//! Parses `vimline.toml`, extracting the options the command-line engine
//! consumes: history bound, search behavior flags, and decoration display
//! settings. Unknown fields are ignored (TOML deserialization tolerance) so
//! host editors can keep their own sections in the same file. A malformed
//! file falls back to defaults rather than failing startup; the host decides
//! whether to surface the problem.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Maximum entries retained per history store (Vim's 'history' option).
    #[serde(default = "HistoryConfig::default_max")]
    pub max: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max: Self::default_max(),
        }
    }
}

impl HistoryConfig {
    const fn default_max() -> usize {
        50
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Whether match navigation cycles past the first/last match ('wrapscan').
    #[serde(default = "SearchConfig::default_true")]
    pub wrapscan: bool,
    #[serde(default = "SearchConfig::default_true")]
    pub ignorecase: bool,
    /// Case sensitivity re-enabled when the pattern contains an uppercase
    /// character; only meaningful with `ignorecase`.
    #[serde(default = "SearchConfig::default_true")]
    pub smartcase: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            wrapscan: true,
            ignorecase: true,
            smartcase: true,
        }
    }
}

impl SearchConfig {
    const fn default_true() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Width a tab expands to inside inline decorations.
    #[serde(default = "DisplayConfig::default_tabstop")]
    pub tabstop: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tabstop: Self::default_tabstop(),
        }
    }
}

impl DisplayConfig {
    const fn default_tabstop() -> usize {
        8
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Best-effort config path following platform conventions: a local
/// `vimline.toml` wins, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("vimline.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("vimline").join("vimline.toml");
    }
    PathBuf::from("vimline.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
                Ok(Config::default())
            }
        },
        Err(_) => {
            debug!(target: "config", path = %path.display(), "config_missing_using_defaults");
            Ok(Config::default())
        }
    }
}
