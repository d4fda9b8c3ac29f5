//! Configuration loading
//!
//! One TOML file, `~/.config/pylayer/config.toml` unless `--config` or
//! `PYLAYER_CONFIG` points elsewhere. A missing file means defaults.
//! Relative paths inside the file (`catalog.path`) are anchored at the
//! file's directory, so a config and its catalog can travel together.

pub mod schema;

pub use schema::Config;

use crate::error::{PylayerError, PylayerResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Locates, validates and initializes the config file
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/pylayer/config.toml`, or `./pylayer/config.toml` when
    /// the platform has no config dir
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pylayer")
            .join("config.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults when the file is absent
    pub async fn load(&self) -> PylayerResult<Config> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => self.parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                Ok(Config::default())
            }
            Err(e) => Err(PylayerError::io(
                format!("reading config from {}", self.path.display()),
                e,
            )),
        }
    }

    /// Parse and validate file contents, anchoring relative paths
    pub fn parse(&self, content: &str) -> PylayerResult<Config> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| self.invalid(e.to_string()))?;
        config.validate().map_err(|reason| self.invalid(reason))?;

        if let Some(dir) = self.path.parent() {
            config.catalog.path = dir.join(&config.catalog.path);
        }

        Ok(config)
    }

    /// Write a default config file.
    ///
    /// Returns `false` without touching anything when a file already exists
    /// and `force` is not set.
    pub async fn init(&self, force: bool) -> PylayerResult<bool> {
        if self.path.exists() && !force {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PylayerError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(&Config::default())?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| PylayerError::io(format!("writing {}", self.path.display()), e))?;

        debug!("Wrote default config to {}", self.path.display());
        Ok(true)
    }

    fn invalid(&self, reason: String) -> PylayerError {
        PylayerError::ConfigInvalid {
            path: self.path.clone(),
            reason,
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
