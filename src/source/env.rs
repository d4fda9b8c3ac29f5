//! Environment variable version source

use super::{SourceKind, VersionSourceReader};
use crate::error::{PylayerError, PylayerResult};
use async_trait::async_trait;
use std::env::{self, VarError};

/// Default override variable
pub const DEFAULT_VERSION_VAR: &str = "BP_CPYTHON_VERSION";

/// Reads the requested version from an environment variable
#[derive(Debug, Clone)]
pub struct EnvSource {
    var: String,
}

impl EnvSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_VAR)
    }
}

#[async_trait]
impl VersionSourceReader for EnvSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Environment
    }

    fn name(&self) -> &str {
        &self.var
    }

    async fn read(&self) -> PylayerResult<String> {
        match env::var(&self.var) {
            Ok(value) => Ok(value),
            Err(VarError::NotPresent) => Ok(String::new()),
            Err(e @ VarError::NotUnicode(_)) => Err(PylayerError::source_read(&self.var, e)),
        }
    }
}
