//! Layer metadata file
//!
//! Each layer has a `<layers>/<name>.toml` file next to its content
//! directory. It records how the layer is used and the metadata that decides
//! whether it can be reused:
//!
//! ```toml
//! [types]
//! launch = true
//! build = true
//! cache = true
//!
//! [metadata]
//! version = "3.10.2"
//! checksum = "sha256:5f9f..."
//! built_at = "2024-01-15T10:00:00Z"
//! ```

use crate::error::{PylayerError, PylayerResult};
use crate::refinery::MatchedDependency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata persisted across builds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMetadata {
    /// Installed dependency version
    pub version: String,

    /// Checksum of the installed artifact
    pub checksum: String,

    /// When the layer was last installed; unchanged across reuse
    pub built_at: DateTime<Utc>,
}

impl LayerMetadata {
    /// Metadata for a fresh install of `dependency`
    pub fn for_install(dependency: &MatchedDependency, built_at: DateTime<Utc>) -> Self {
        Self {
            version: dependency.version.to_string(),
            checksum: dependency.checksum.clone(),
            built_at,
        }
    }
}

/// How the platform should expose the layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerTypes {
    /// Available at launch time
    pub launch: bool,

    /// Available to subsequent buildpacks
    pub build: bool,

    /// Restored on the next build
    pub cache: bool,
}

impl Default for LayerTypes {
    fn default() -> Self {
        Self {
            launch: true,
            build: true,
            cache: true,
        }
    }
}

/// Parsed `<name>.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerManifest {
    #[serde(default)]
    pub types: LayerTypes,

    pub metadata: LayerMetadata,
}

impl LayerManifest {
    pub fn new(types: LayerTypes, metadata: LayerMetadata) -> Self {
        Self { types, metadata }
    }

    /// Parse a manifest from TOML
    pub fn parse(content: &str) -> PylayerResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render the manifest as TOML
    pub fn to_toml(&self) -> PylayerResult<String> {
        toml::to_string_pretty(self).map_err(PylayerError::from)
    }
}
