//! Inputs shared by `build` and `resolve`

use crate::catalog::Catalog;
use crate::cli::args::SourceArgs;
use crate::config::Config;
use crate::error::PylayerResult;
use crate::refinery::PlanRefinery;
use crate::source::{
    BuildpackYmlSource, EnvSource, PlanRequirementSource, SourceSet, UnknownSource,
};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Every ranked version source for the configured dependency
pub fn source_set(args: &SourceArgs, config: &Config) -> SourceSet {
    let dep = &config.dependency;
    SourceSet::new()
        .with(BuildpackYmlSource::with_path(
            args.app.join(&dep.config_file),
            dep.id.clone(),
        ))
        .with(EnvSource::new(dep.env_var.clone()))
        .with(PlanRequirementSource::new(args.plan.clone(), dep.id.clone()))
        .with(UnknownSource)
}

/// Catalog from `--catalog`, falling back to the configured path
pub async fn load_catalog(path: Option<&Path>, config: &Config) -> PylayerResult<Catalog> {
    let path: PathBuf = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.catalog.path.clone());
    debug!("Loading catalog {}", path.display());
    Catalog::from_file(&path).await
}

/// Refinery for the configured dependency; `--stack` overrides config
pub fn refinery(args: &SourceArgs, config: &Config) -> PlanRefinery {
    let stack = args.stack.clone().or_else(|| config.platform.stack.clone());
    PlanRefinery::new(config.dependency.id.clone()).with_stack(stack)
}
