//! Error types for pylayer
//!
//! All modules use `PylayerResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pylayer operations
pub type PylayerResult<T> = Result<T, PylayerError>;

/// All errors that can occur while resolving, installing or caching a layer
#[derive(Error, Debug)]
pub enum PylayerError {
    // Version source errors
    #[error("Failed to read version source {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    #[error("Invalid version \"{requested}\" from {source_name}: {reason}")]
    InvalidVersion {
        requested: String,
        source_name: String,
        reason: String,
    },

    // Catalog errors
    #[error("No version of {dependency} matches \"{requested}\" (requested by {source_name})")]
    NoMatchingVersion {
        dependency: String,
        requested: String,
        source_name: String,
    },

    #[error("Catalog lists version {version} more than once")]
    DuplicateCatalogVersion { version: String },

    #[error("Invalid catalog at {path}: {reason}")]
    CatalogInvalid { path: PathBuf, reason: String },

    // Install errors
    #[error("Failed to install version {version}: {reason}")]
    Install { version: String, reason: String },

    #[error("Checksum mismatch for {version} ({uri}): expected {expected}, got {actual}")]
    ChecksumMismatch {
        version: String,
        uri: String,
        expected: String,
        actual: String,
    },

    // Layer persistence errors
    #[error("Failed to persist layer metadata to {path}: {reason}")]
    Persist { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl PylayerError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a version source read error
    pub fn source_read(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an install error
    pub fn install(version: impl Into<String>, reason: impl ToString) -> Self {
        Self::Install {
            version: version.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a persist error
    pub fn persist(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persist {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable by simply running the build again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Install { .. } | Self::Persist { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NoMatchingVersion { .. } => {
                Some("Run `pylayer catalog list` to see the versions that can be installed")
            }
            Self::InvalidVersion { .. } => Some("Use a full version (3.10.2) or a prefix (3.10)"),
            Self::SourceRead { .. } => Some("Fix or remove the file named in the error"),
            Self::ChecksumMismatch { .. } => {
                Some("The catalog checksum does not match the downloaded artifact")
            }
            _ => None,
        }
    }
}
