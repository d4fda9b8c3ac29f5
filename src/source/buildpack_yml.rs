//! `buildpack.yml` version source
//!
//! Reads `<dependency>.version` from the application's `buildpack.yml`:
//!
//! ```yaml
//! cpython:
//!   version: "3.10.*"
//! ```

use super::{SourceKind, VersionSourceReader};
use crate::error::{PylayerError, PylayerResult};
use async_trait::async_trait;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the application directory
pub const BUILDPACK_YML: &str = "buildpack.yml";

/// Reads the requested version from `buildpack.yml`
#[derive(Debug, Clone)]
pub struct BuildpackYmlSource {
    path: PathBuf,
    dependency: String,
    name: String,
}

impl BuildpackYmlSource {
    /// Source for `<app_dir>/buildpack.yml`
    pub fn in_app(app_dir: &Path, dependency: impl Into<String>) -> Self {
        Self::with_path(app_dir.join(BUILDPACK_YML), dependency)
    }

    /// Source for an explicit file path
    pub fn with_path(path: PathBuf, dependency: impl Into<String>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| BUILDPACK_YML.to_string());
        Self {
            path,
            dependency: dependency.into(),
            name,
        }
    }

    /// Extract the version from file contents
    fn parse(&self, content: &str) -> PylayerResult<String> {
        if content.trim().is_empty() {
            return Ok(String::new());
        }

        let section = SectionSeed(&self.dependency)
            .deserialize(serde_yaml::Deserializer::from_str(content))
            .map_err(|e| PylayerError::source_read(&self.name, e))?;

        Ok(section.and_then(|s| s.version).unwrap_or_default())
    }
}

/// The `<dependency>:` section. Other keys in it are ignored.
#[derive(Debug, Deserialize)]
struct DependencySection {
    // Typed as a string so plain scalars keep their text (`3.10` stays "3.10")
    #[serde(default)]
    version: Option<String>,
}

/// Picks one dependency's section out of the top-level mapping
struct SectionSeed<'a>(&'a str);

impl<'de> DeserializeSeed<'de> for SectionSeed<'_> {
    type Value = Option<DependencySection>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for SectionSeed<'_> {
    type Value = Option<DependencySection>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping at the top level")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut section = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == self.0 {
                section = map.next_value::<Option<DependencySection>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(section)
    }
}

#[async_trait]
impl VersionSourceReader for BuildpackYmlSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ConfigFile
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> PylayerResult<String> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, no version requested", self.path.display());
                return Ok(String::new());
            }
            Err(e) => {
                return Err(PylayerError::source_read(
                    &self.name,
                    format!("reading {}: {}", self.path.display(), e),
                ))
            }
        };

        self.parse(&content)
    }
}
