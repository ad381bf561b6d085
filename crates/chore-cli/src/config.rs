//! Configuration file loading.
//!
//! `$CONFIG_DIR/chores/config.toml` unless `--config` names another file.
//! Every field is optional; command-line flags override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chore_engine::expander::DEFAULT_HORIZON_DAYS;
use serde::Deserialize;

const APP_DIR: &str = "chores";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the JSON documents.
    pub data_dir: Option<PathBuf>,
    /// Remote endpoint for `push` / `pull`.
    pub sync_url: Option<String>,
    /// Days shown by `list` when `--days` is not given.
    pub horizon_days: Option<u32>,
    /// Request timeout for sync calls.
    pub sync_timeout_secs: Option<u64>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from an explicit path (which must exist) or from the default
    /// location (which may be absent).
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .context("Could not determine a data directory; set data_dir in the config file"),
        }
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS)
    }

    pub fn sync_timeout_secs(&self) -> u64 {
        self.sync_timeout_secs.unwrap_or(DEFAULT_SYNC_TIMEOUT_SECS)
    }
}
