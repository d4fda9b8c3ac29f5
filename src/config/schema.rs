//! Configuration schema for pylayer
//!
//! Configuration is stored at `~/.config/pylayer/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// The dependency being resolved
    pub dependency: DependencyConfig,

    /// Catalog location
    pub catalog: CatalogConfig,

    /// Build platform settings
    pub platform: PlatformConfig,

    /// Installer settings
    pub install: InstallConfig,
}

impl Config {
    /// Check values that would otherwise fail late or in confusing ways
    pub fn validate(&self) -> Result<(), String> {
        if !matches!(self.general.log_format.as_str(), "text" | "json") {
            return Err(format!(
                "general.log_format must be \"text\" or \"json\", got \"{}\"",
                self.general.log_format
            ));
        }

        // The id names the layer directory and the buildpack.yml key
        let id = &self.dependency.id;
        let id_ok = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !id_ok {
            return Err(format!(
                "dependency.id must be lowercase letters, digits, '-' or '_', got \"{}\"",
                id
            ));
        }

        let var = &self.dependency.env_var;
        let var_ok = var
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c == '_')
            && var
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
        if !var_ok {
            return Err(format!(
                "dependency.env_var must be an upper-case variable name, got \"{}\"",
                var
            ));
        }

        if self.dependency.config_file.trim().is_empty() {
            return Err("dependency.config_file must not be empty".to_string());
        }

        if self.install.timeout_secs == 0 {
            return Err("install.timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,

    /// Name printed in the build log title
    pub buildpack_name: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            buildpack_name: "Paketo CPython Buildpack".to_string(),
        }
    }
}

/// Dependency identity and where its version hints come from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Catalog id, layer name and `buildpack.yml` key
    pub id: String,

    /// Human-readable name used in the build log
    pub display_name: String,

    /// Environment variable overriding the version
    pub env_var: String,

    /// Project-local config file name
    pub config_file: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            id: "cpython".to_string(),
            display_name: "CPython".to_string(),
            env_var: "BP_CPYTHON_VERSION".to_string(),
            config_file: "buildpack.yml".to_string(),
        }
    }
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to the catalog TOML file
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.toml"),
        }
    }
}

/// Build platform settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Stack id used to filter catalog entries (unset = any)
    pub stack: Option<String>,
}

/// Installer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Per-download timeout in seconds
    pub timeout_secs: u64,

    /// Extra attempts after a failed download
    pub retries: u32,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            retries: 2,
        }
    }
}
