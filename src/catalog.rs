//! Dependency catalog
//!
//! The static list of installable versions, supplied as a TOML file:
//!
//! ```toml
//! [[dependencies]]
//! id = "cpython"
//! version = "3.10.2"
//! checksum = "sha256:5f9f..."
//! uri = "https://example.org/python_3.10.2_linux_x64.tgz"
//! stacks = ["io.buildpacks.stacks.jammy"]
//! ```

use crate::error::{PylayerError, PylayerResult};
use semver::Version;
use serde::Deserialize;
use std::path::Path;

/// Checksum algorithm prefix accepted on catalog checksums
const SHA256_PREFIX: &str = "sha256:";

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    dependencies: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    id: String,
    version: String,
    checksum: String,
    uri: String,
    #[serde(default)]
    stacks: Vec<String>,
}

/// One installable dependency version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCatalogEntry {
    /// Dependency id (e.g. `cpython`)
    pub id: String,

    /// Semantic version
    pub version: Version,

    /// Artifact checksum, optionally prefixed with `sha256:`
    pub checksum: String,

    /// Where to fetch the artifact from
    pub uri: String,

    /// Stacks this artifact runs on; empty means any
    pub stacks: Vec<String>,
}

impl DependencyCatalogEntry {
    pub fn new(id: &str, version: Version, checksum: &str, uri: &str) -> Self {
        Self {
            id: id.to_string(),
            version,
            checksum: checksum.to_string(),
            uri: uri.to_string(),
            stacks: vec![],
        }
    }

    /// Restrict the entry to the given stacks
    pub fn with_stacks(mut self, stacks: &[&str]) -> Self {
        self.stacks = stacks.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Lowercase hex digest without the algorithm prefix
    pub fn sha256_hex(&self) -> String {
        self.checksum
            .strip_prefix(SHA256_PREFIX)
            .unwrap_or(&self.checksum)
            .to_ascii_lowercase()
    }

    /// Whether the entry may be installed on `stack`
    pub fn supports_stack(&self, stack: Option<&str>) -> bool {
        match stack {
            None => true,
            Some(_) if self.stacks.is_empty() => true,
            Some(stack) => self.stacks.iter().any(|s| s == stack || s == "*"),
        }
    }
}

/// Ordered, read-only set of catalog entries
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<DependencyCatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<DependencyCatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load a catalog from a TOML file on disk
    pub async fn from_file(path: &Path) -> PylayerResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PylayerError::io(format!("reading catalog {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    /// Parse catalog contents; `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> PylayerResult<Self> {
        let invalid = |reason: String| PylayerError::CatalogInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let file: CatalogFile = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;

        let entries = file
            .dependencies
            .into_iter()
            .map(|raw| {
                let version = Version::parse(&raw.version).map_err(|e| {
                    invalid(format!("{} version \"{}\": {}", raw.id, raw.version, e))
                })?;
                if raw.checksum.trim().is_empty() {
                    return Err(invalid(format!("{} {} has no checksum", raw.id, version)));
                }
                Ok(DependencyCatalogEntry {
                    id: raw.id,
                    version,
                    checksum: raw.checksum,
                    uri: raw.uri,
                    stacks: raw.stacks,
                })
            })
            .collect::<PylayerResult<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[DependencyCatalogEntry] {
        &self.entries
    }

    /// Entries for one dependency id, in catalog order
    pub fn for_dependency<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = &'a DependencyCatalogEntry> + 'a {
        self.entries.iter().filter(move |e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[dependencies]]
id = "cpython"
version = "3.9.1"
checksum = "sha256:AABB"
uri = "https://example.org/python_3.9.1.tgz"
stacks = ["io.buildpacks.stacks.bionic"]

[[dependencies]]
id = "cpython"
version = "3.10.2"
checksum = "ccdd"
uri = "https://example.org/python_3.10.2.tgz"

[[dependencies]]
id = "pip"
version = "22.0.4"
checksum = "eeff"
uri = "https://example.org/pip.tgz"
"#;

    #[test]
    fn parse_catalog() {
        let catalog = Catalog::parse(CATALOG, Path::new("catalog.toml")).unwrap();
        assert_eq!(catalog.entries().len(), 3);
        assert_eq!(catalog.entries()[0].version, Version::new(3, 9, 1));
        assert_eq!(catalog.entries()[0].stacks, vec!["io.buildpacks.stacks.bionic"]);
        assert!(catalog.entries()[1].stacks.is_empty());
    }

    #[test]
    fn filter_by_dependency() {
        let catalog = Catalog::parse(CATALOG, Path::new("catalog.toml")).unwrap();
        let versions: Vec<String> = catalog
            .for_dependency("cpython")
            .map(|e| e.version.to_string())
            .collect();
        assert_eq!(versions, vec!["3.9.1", "3.10.2"]);
    }

    #[test]
    fn checksum_prefix_is_stripped() {
        let catalog = Catalog::parse(CATALOG, Path::new("catalog.toml")).unwrap();
        assert_eq!(catalog.entries()[0].sha256_hex(), "aabb");
        assert_eq!(catalog.entries()[1].sha256_hex(), "ccdd");
    }

    #[test]
    fn stack_support() {
        let entry = DependencyCatalogEntry::new("cpython", Version::new(3, 9, 1), "aa", "u")
            .with_stacks(&["io.buildpacks.stacks.bionic"]);
        assert!(entry.supports_stack(None));
        assert!(entry.supports_stack(Some("io.buildpacks.stacks.bionic")));
        assert!(!entry.supports_stack(Some("io.buildpacks.stacks.jammy")));

        let any = DependencyCatalogEntry::new("cpython", Version::new(3, 9, 1), "aa", "u");
        assert!(any.supports_stack(Some("io.buildpacks.stacks.jammy")));
    }

    #[test]
    fn invalid_version_errors() {
        let bad = r#"
[[dependencies]]
id = "cpython"
version = "3.10"
checksum = "aa"
uri = "u"
"#;
        let err = Catalog::parse(bad, Path::new("catalog.toml")).unwrap_err();
        assert!(matches!(err, PylayerError::CatalogInvalid { .. }));
        assert!(err.to_string().contains("3.10"));
    }

    #[test]
    fn missing_checksum_errors() {
        let bad = r#"
[[dependencies]]
id = "cpython"
version = "3.10.2"
checksum = ""
uri = "u"
"#;
        assert!(Catalog::parse(bad, Path::new("catalog.toml")).is_err());
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::parse("", Path::new("catalog.toml")).unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn missing_file_errors() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = Catalog::from_file(&temp.path().join("nope.toml")).await;
        assert!(result.is_err());
    }
}
