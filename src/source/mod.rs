//! Version sources
//!
//! A version source is one ranked origin of a version request. The set of
//! source kinds is closed and totally ordered by [`SourceKind::PRIORITY`]:
//!
//! 1. `buildpack.yml` in the application directory
//! 2. The `BP_CPYTHON_VERSION` environment override
//! 3. The platform's build plan requirement
//! 4. `<unknown>`: the implicit default, always empty

mod buildpack_yml;
mod env;
mod plan;

pub use buildpack_yml::BuildpackYmlSource;
pub use env::EnvSource;
pub use plan::PlanRequirementSource;

use crate::error::PylayerResult;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Name shown for the implicit source and for an unconstrained resolution
pub const UNKNOWN_SOURCE: &str = "<unknown>";

/// One candidate version request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSource {
    /// Display name of the source (e.g. `buildpack.yml`)
    pub name: String,

    /// Requested version; empty means no constraint
    pub requested_value: String,
}

impl VersionSource {
    pub fn new(name: impl Into<String>, requested_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requested_value: requested_value.into(),
        }
    }

    /// Whether this source expresses a constraint
    pub fn is_set(&self) -> bool {
        !self.requested_value.is_empty()
    }
}

/// Kinds of version source, in the order they are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Project-local config file
    ConfigFile,
    /// Environment variable override
    Environment,
    /// Requirement supplied by the platform's build plan
    BuildPlan,
    /// Implicit default
    Unknown,
}

impl SourceKind {
    /// Highest priority first
    pub const PRIORITY: [SourceKind; 4] = [
        SourceKind::ConfigFile,
        SourceKind::Environment,
        SourceKind::BuildPlan,
        SourceKind::Unknown,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConfigFile => "config-file",
            Self::Environment => "environment",
            Self::BuildPlan => "build-plan",
            Self::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Reads one ranked input into a [`VersionSource`]
#[async_trait]
pub trait VersionSourceReader: Send + Sync {
    /// Which priority slot this reader fills
    fn kind(&self) -> SourceKind;

    /// Display name used in the candidate report
    fn name(&self) -> &str;

    /// Read the requested version.
    ///
    /// Returns an empty string when the source is absent (missing file,
    /// unset variable). Any other failure is an error.
    async fn read(&self) -> PylayerResult<String>;
}

/// The implicit lowest-priority source. It never requests anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownSource;

#[async_trait]
impl VersionSourceReader for UnknownSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Unknown
    }

    fn name(&self) -> &str {
        UNKNOWN_SOURCE
    }

    async fn read(&self) -> PylayerResult<String> {
        Ok(String::new())
    }
}

/// The registered readers for one build
#[derive(Default)]
pub struct SourceSet {
    readers: Vec<Box<dyn VersionSourceReader>>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reader. Registration order does not matter; readers are
    /// consulted in [`SourceKind::PRIORITY`] order.
    pub fn with(mut self, reader: impl VersionSourceReader + 'static) -> Self {
        self.readers.push(Box::new(reader));
        self
    }

    /// Read every source in priority order.
    ///
    /// Fails fast on the first read error; no partial list is returned.
    pub async fn collect(&self) -> PylayerResult<Vec<VersionSource>> {
        let mut sources = Vec::with_capacity(self.readers.len());

        for kind in SourceKind::PRIORITY {
            for reader in self.readers.iter().filter(|r| r.kind() == kind) {
                let value = reader.read().await?;
                debug!("Version source {} ({}) -> {:?}", reader.name(), kind, value);
                sources.push(VersionSource::new(reader.name(), value.trim()));
            }
        }

        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PylayerError;

    struct Fixed {
        kind: SourceKind,
        name: &'static str,
        value: &'static str,
    }

    #[async_trait]
    impl VersionSourceReader for Fixed {
        fn kind(&self) -> SourceKind {
            self.kind
        }
        fn name(&self) -> &str {
            self.name
        }
        async fn read(&self) -> PylayerResult<String> {
            Ok(self.value.to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl VersionSourceReader for Broken {
        fn kind(&self) -> SourceKind {
            SourceKind::BuildPlan
        }
        fn name(&self) -> &str {
            "build plan"
        }
        async fn read(&self) -> PylayerResult<String> {
            Err(PylayerError::source_read("build plan", "permission denied"))
        }
    }

    #[tokio::test]
    async fn collects_in_priority_order_regardless_of_registration() {
        let set = SourceSet::new()
            .with(UnknownSource)
            .with(Fixed {
                kind: SourceKind::Environment,
                name: "BP_CPYTHON_VERSION",
                value: "3.10",
            })
            .with(Fixed {
                kind: SourceKind::ConfigFile,
                name: "buildpack.yml",
                value: "",
            });

        let sources = set.collect().await.unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["buildpack.yml", "BP_CPYTHON_VERSION", "<unknown>"]);
        assert_eq!(sources[1].requested_value, "3.10");
    }

    #[tokio::test]
    async fn trims_values() {
        let set = SourceSet::new().with(Fixed {
            kind: SourceKind::ConfigFile,
            name: "buildpack.yml",
            value: " 3.9.1\n",
        });
        let sources = set.collect().await.unwrap();
        assert_eq!(sources[0].requested_value, "3.9.1");
    }

    #[tokio::test]
    async fn read_failure_aborts_collection() {
        let set = SourceSet::new().with(UnknownSource).with(Broken);
        let err = set.collect().await.unwrap_err();
        assert!(matches!(err, PylayerError::SourceRead { .. }));
    }

    #[tokio::test]
    async fn empty_set_collects_nothing() {
        let sources = SourceSet::new().collect().await.unwrap();
        assert!(sources.is_empty());
    }

    #[test]
    fn unknown_is_lowest_priority() {
        assert_eq!(SourceKind::PRIORITY.last(), Some(&SourceKind::Unknown));
    }
}
