//! Build plan requirement source
//!
//! The platform hands the buildpack a plan listing the dependencies other
//! buildpacks require. The first entry for our dependency may carry a
//! version constraint in its metadata:
//!
//! ```toml
//! [[entries]]
//! name = "cpython"
//!
//! [entries.metadata]
//! version = "3.10.*"
//! ```

use super::{SourceKind, VersionSourceReader};
use crate::error::{PylayerError, PylayerResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Display name for this source
pub const BUILD_PLAN: &str = "build plan";

#[derive(Debug, Default, Deserialize)]
struct BuildPlan {
    #[serde(default)]
    entries: Vec<PlanEntry>,
}

#[derive(Debug, Deserialize)]
struct PlanEntry {
    name: String,

    #[serde(default)]
    metadata: PlanMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct PlanMetadata {
    #[serde(default)]
    version: Option<String>,
}

/// Reads the version requirement from a build plan file
#[derive(Debug, Clone)]
pub struct PlanRequirementSource {
    path: Option<PathBuf>,
    dependency: String,
}

impl PlanRequirementSource {
    /// `path` is optional: a build without a plan requests nothing
    pub fn new(path: Option<PathBuf>, dependency: impl Into<String>) -> Self {
        Self {
            path,
            dependency: dependency.into(),
        }
    }

    fn parse(&self, content: &str) -> PylayerResult<String> {
        let plan: BuildPlan =
            toml::from_str(content).map_err(|e| PylayerError::source_read(BUILD_PLAN, e))?;

        Ok(plan
            .entries
            .into_iter()
            .find(|entry| entry.name == self.dependency)
            .and_then(|entry| entry.metadata.version)
            .unwrap_or_default())
    }
}

#[async_trait]
impl VersionSourceReader for PlanRequirementSource {
    fn kind(&self) -> SourceKind {
        SourceKind::BuildPlan
    }

    fn name(&self) -> &str {
        BUILD_PLAN
    }

    async fn read(&self) -> PylayerResult<String> {
        let Some(path) = &self.path else {
            return Ok(String::new());
        };

        match tokio::fs::read_to_string(path).await {
            Ok(content) => self.parse(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(PylayerError::source_read(
                BUILD_PLAN,
                format!("reading {}: {}", path.display(), e),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn read_plan(content: &str) -> PylayerResult<String> {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("plan.toml");
        std::fs::write(&path, content).unwrap();
        PlanRequirementSource::new(Some(path), "cpython").read().await
    }

    #[tokio::test]
    async fn reads_first_matching_entry() {
        let plan = r#"
[[entries]]
name = "pip"

[[entries]]
name = "cpython"
[entries.metadata]
version = "3.10.*"

[[entries]]
name = "cpython"
[entries.metadata]
version = "3.9.*"
"#;
        assert_eq!(read_plan(plan).await.unwrap(), "3.10.*");
    }

    #[tokio::test]
    async fn entry_without_version_is_empty() {
        let plan = "[[entries]]\nname = \"cpython\"\n";
        assert_eq!(read_plan(plan).await.unwrap(), "");
    }

    #[tokio::test]
    async fn no_path_is_empty() {
        let source = PlanRequirementSource::new(None, "cpython");
        assert_eq!(source.read().await.unwrap(), "");
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let source = PlanRequirementSource::new(Some(temp.path().join("absent.toml")), "cpython");
        assert_eq!(source.read().await.unwrap(), "");
    }

    #[tokio::test]
    async fn malformed_plan_is_an_error() {
        let err = read_plan("[[entries]\nname = ").await.unwrap_err();
        assert!(matches!(err, PylayerError::SourceRead { .. }));
    }
}
