//! Reuse-or-rebuild decision

use crate::layer::manifest::LayerMetadata;
use crate::refinery::MatchedDependency;
use serde::Serialize;
use std::fmt;

/// Whether the existing layer can be kept as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheDecision {
    /// Layer matches the resolved dependency; skip install
    Reuse,
    /// No layer, or it holds a different artifact
    Rebuild,
}

impl fmt::Display for CacheDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reuse => write!(f, "reuse"),
            Self::Rebuild => write!(f, "rebuild"),
        }
    }
}

/// Reuse iff the previous layer has the same version and checksum.
///
/// Pure: no filesystem or network access.
pub fn decide(matched: &MatchedDependency, previous: Option<&LayerMetadata>) -> CacheDecision {
    match previous {
        Some(prev)
            if prev.version == matched.version.to_string() && prev.checksum == matched.checksum =>
        {
            CacheDecision::Reuse
        }
        _ => CacheDecision::Rebuild,
    }
}
