//! Plan refinery
//!
//! Maps a resolved request onto exactly one catalog entry:
//!
//! - unconstrained: highest version in the catalog
//! - `X.Y.Z`: that exact version, no nearest-version fallback
//! - `X.Y` / `X` / constraints: highest version satisfying the specifier
//!
//! Two entries with the winning version are a catalog defect and an error.

use crate::catalog::{Catalog, DependencyCatalogEntry};
use crate::error::{PylayerError, PylayerResult};
use crate::resolve::ResolvedRequest;
use tracing::debug;

/// The catalog entry chosen to satisfy a request
pub type MatchedDependency = DependencyCatalogEntry;

/// Matches resolved requests against a catalog for one dependency
#[derive(Debug, Clone)]
pub struct PlanRefinery {
    dependency: String,
    stack: Option<String>,
}

impl PlanRefinery {
    pub fn new(dependency: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            stack: None,
        }
    }

    /// Only consider entries that support `stack`
    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack;
        self
    }

    /// Pick the catalog entry for `request`
    pub fn match_dependency(
        &self,
        request: &ResolvedRequest,
        catalog: &Catalog,
    ) -> PylayerResult<MatchedDependency> {
        let specifier = request.specifier()?;
        let stack = self.stack.as_deref();

        let candidates: Vec<&DependencyCatalogEntry> = catalog
            .for_dependency(&self.dependency)
            .filter(|e| e.supports_stack(stack))
            .filter(|e| specifier.matches(&e.version))
            .collect();

        debug!(
            "{} catalog entries satisfy {} for {}",
            candidates.len(),
            specifier,
            self.dependency
        );

        let best = candidates
            .iter()
            .max_by(|a, b| a.version.cmp(&b.version))
            .ok_or_else(|| PylayerError::NoMatchingVersion {
                dependency: self.dependency.clone(),
                requested: if request.is_unconstrained() {
                    "*".to_string()
                } else {
                    request.chosen_value.clone()
                },
                source_name: request.chosen_source.clone(),
            })?;

        if candidates.iter().filter(|e| e.version == best.version).count() > 1 {
            return Err(PylayerError::DuplicateCatalogVersion {
                version: best.version.to_string(),
            });
        }

        Ok((*best).clone())
    }
}
