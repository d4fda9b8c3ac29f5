//! Version specifiers
//!
//! A requested version string is parsed into a [`VersionSpecifier`] before it
//! is matched against the catalog. All comparisons are semantic (`semver`),
//! never lexical, so `3.9.10` sorts above `3.9.9`.

use semver::{Version, VersionReq};
use std::fmt;

/// Parsed form of a requested version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpecifier {
    /// No constraint: empty, `*`, `x` or `latest`
    Any,

    /// Fully specified `X.Y.Z`
    Exact(Version),

    /// Leading components only: `X`, `X.Y`, `X.*`, `X.Y.*`
    Partial { major: u64, minor: Option<u64> },

    /// Operator constraint such as `~3.10` or `>=3.9, <3.11`
    Requirement(VersionReq),
}

impl VersionSpecifier {
    /// Parse a requested version string.
    ///
    /// Returns the reason as a string on failure so callers can attach the
    /// source name to the error.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();

        if matches!(raw, "" | "*" | "x" | "X" | "latest") {
            return Ok(Self::Any);
        }

        if let Ok(version) = Version::parse(raw) {
            return Ok(Self::Exact(version));
        }

        let prefix = raw
            .strip_suffix(".*")
            .or_else(|| raw.strip_suffix(".x"))
            .unwrap_or(raw);

        if let Some(partial) = parse_partial(prefix) {
            return Ok(partial);
        }

        VersionReq::parse(raw)
            .map(Self::Requirement)
            .map_err(|e| e.to_string())
    }

    /// Whether `version` satisfies this specifier
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(exact) => version == exact,
            Self::Partial { major, minor } => {
                version.major == *major && minor.is_none_or(|m| version.minor == m)
            }
            Self::Requirement(req) => req.matches(version),
        }
    }

    /// Whether this specifier names exactly one version
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

/// `X` or `X.Y`, digits only
fn parse_partial(prefix: &str) -> Option<VersionSpecifier> {
    let parts: Vec<&str> = prefix.split('.').collect();
    if parts.is_empty() || parts.len() > 2 {
        return None;
    }

    let mut numbers = parts.iter().map(|p| {
        if !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()) {
            p.parse::<u64>().ok()
        } else {
            None
        }
    });

    let major = numbers.next()??;
    let minor = match numbers.next() {
        Some(n) => Some(n?),
        None => None,
    };

    Some(VersionSpecifier::Partial { major, minor })
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::Exact(v) => write!(f, "{}", v),
            Self::Partial {
                major,
                minor: Some(minor),
            } => write!(f, "{}.{}.*", major, minor),
            Self::Partial { major, minor: None } => write!(f, "{}.*", major),
            Self::Requirement(req) => write!(f, "{}", req),
        }
    }
}
