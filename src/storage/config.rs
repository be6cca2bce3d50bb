//! Global configuration store
//!
//! Settings are stored in `config.toml` under the platform config
//! directory (e.g. `~/.config/compo/config.toml` on Linux). The `config`
//! command lists and sets them; everything else only reads them during
//! initialization.

use std::fs;
use std::io;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    NoConfigDir,

    #[error("failed to read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to write config {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("unknown setting `{0}` (known settings: alloy_base, global_path)")]
    UnknownKey(String),
}

/// Global user configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Alloy base directory used when `--alloy-base` is not given.
    pub alloy_base: Option<String>,

    /// Overrides the platform data directory as the global component store.
    pub global_path: Option<PathBuf>,
}

impl GlobalConfig {
    /// Returns the global config directory.
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "compo", "compo").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns the default global component store directory.
    pub fn data_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "compo", "compo").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Loads the global configuration, falling back to defaults when no
    /// config file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = match Self::config_dir() {
            Some(dir) => dir,
            None => return Ok(Self::default()),
        };

        let path = config_dir.join("config.toml");
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Saves the global configuration, creating the config directory if
    /// needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_dir = Self::config_dir().ok_or(ConfigError::NoConfigDir)?;

        fs::create_dir_all(&config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.clone(),
            source,
        })?;

        let path = config_dir.join("config.toml");
        let content = toml::to_string_pretty(self).expect("config serializes");

        fs::write(&path, content).map_err(|source| ConfigError::Write { path, source })
    }

    /// All settings as key/value pairs, for `config` listing.
    pub fn entries(&self) -> Vec<(&'static str, Option<String>)> {
        vec![
            ("alloy_base", self.alloy_base.clone()),
            (
                "global_path",
                self.global_path
                    .as_ref()
                    .map(|p| p.display().to_string()),
            ),
        ]
    }

    /// Sets one setting by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "alloy_base" => self.alloy_base = Some(value.to_string()),
            "global_path" => self.global_path = Some(PathBuf::from(value)),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
