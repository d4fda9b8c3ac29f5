//! Plan entry resolution
//!
//! Picks the single effective version request from the ranked candidates.
//! The first candidate with a non-empty value wins; input order is the
//! priority order and is never re-sorted.

use crate::error::{PylayerError, PylayerResult};
use crate::source::{VersionSource, UNKNOWN_SOURCE};
use crate::version::VersionSpecifier;
use serde::Serialize;

/// The effective version request plus every candidate that was considered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequest {
    /// Name of the winning source, or `<unknown>` when nothing was requested
    pub chosen_source: String,

    /// Winning value; empty when unconstrained
    pub chosen_value: String,

    /// All candidates in priority order, including empty and losing ones
    pub candidates: Vec<VersionSource>,
}

impl ResolvedRequest {
    /// No source requested a version
    pub fn is_unconstrained(&self) -> bool {
        self.chosen_value.is_empty()
    }

    /// Parse the chosen value
    pub fn specifier(&self) -> PylayerResult<VersionSpecifier> {
        VersionSpecifier::parse(&self.chosen_value).map_err(|reason| {
            PylayerError::InvalidVersion {
                requested: self.chosen_value.clone(),
                source_name: self.chosen_source.clone(),
                reason,
            }
        })
    }
}

/// Resolve the candidates into one request. Never fails.
pub fn resolve(sources: &[VersionSource]) -> ResolvedRequest {
    let (chosen_source, chosen_value) = sources
        .iter()
        .find(|s| s.is_set())
        .map(|s| (s.name.clone(), s.requested_value.clone()))
        .unwrap_or_else(|| (UNKNOWN_SOURCE.to_string(), String::new()));

    ResolvedRequest {
        chosen_source,
        chosen_value,
        candidates: sources.to_vec(),
    }
}
