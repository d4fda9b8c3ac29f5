//! Build command - resolve, install or reuse the dependency layer

use super::inputs;
use crate::build::Build;
use crate::cli::args::BuildArgs;
use crate::config::Config;
use crate::error::PylayerResult;
use crate::install::FetchInstaller;
use crate::layer::FileLayerStore;
use crate::ui::{Emitter, UiContext};
use std::time::Duration;
use tracing::info;

/// Execute the build command
pub async fn execute(args: BuildArgs, config: &Config) -> PylayerResult<()> {
    let emitter = Emitter::stdout(UiContext::detect());
    emitter.title(&config.general.buildpack_name, env!("CARGO_PKG_VERSION"));

    let catalog = inputs::load_catalog(args.sources.catalog.as_deref(), config).await?;
    let store = FileLayerStore::new(&args.layers, config.dependency.id.clone());
    let installer = FetchInstaller::new(
        Duration::from_secs(config.install.timeout_secs),
        config.install.retries,
    );

    let build = Build::new(
        inputs::source_set(&args.sources, config),
        catalog,
        inputs::refinery(&args.sources, config),
        store,
        installer,
    )
    .with_emitter(emitter)
    .with_display_name(config.dependency.display_name.clone());

    let outcome = build.run().await?;
    info!(
        "{} {} {} (built at {})",
        config.dependency.id,
        outcome.dependency.version,
        outcome.decision,
        outcome.metadata.built_at.to_rfc3339()
    );

    Ok(())
}
