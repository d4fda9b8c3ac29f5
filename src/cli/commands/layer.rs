//! Layer command - inspect or clear the cached layer

use crate::cli::args::{LayerAction, LayerArgs, OutputFormat};
use crate::config::Config;
use crate::error::PylayerResult;
use crate::layer::{FileLayerStore, LayerManifest, LayerStore};
use console::style;
use std::io::{self, Write};

/// Execute the layer command
pub async fn execute(args: LayerArgs, config: &Config) -> PylayerResult<()> {
    match args.action {
        LayerAction::Show { layers, format } => {
            let store = FileLayerStore::new(layers, config.dependency.id.clone());
            show_layer(&store, format).await
        }
        LayerAction::Clear { layers, yes } => {
            let store = FileLayerStore::new(layers, config.dependency.id.clone());
            clear_layer(&store, yes).await
        }
    }
}

async fn show_layer(store: &FileLayerStore, format: OutputFormat) -> PylayerResult<()> {
    let Some(manifest) = store.load_manifest().await? else {
        println!("No layer metadata at {}", store.metadata_path().display());
        return Ok(());
    };

    match format {
        OutputFormat::Table => print_table(store, &manifest),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&manifest)?),
        OutputFormat::Plain => println!("{}", manifest.metadata.version),
    }

    Ok(())
}

fn print_table(store: &FileLayerStore, manifest: &LayerManifest) {
    let flag = |on: bool| {
        if on {
            style("yes").green().to_string()
        } else {
            style("no").dim().to_string()
        }
    };

    println!("Layer:    {}", store.layer_dir().display());
    println!("Version:  {}", manifest.metadata.version);
    println!("Checksum: {}", manifest.metadata.checksum);
    println!(
        "Built:    {}",
        manifest.metadata.built_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Types:    launch={} build={} cache={}",
        flag(manifest.types.launch),
        flag(manifest.types.build),
        flag(manifest.types.cache)
    );
}

async fn clear_layer(store: &FileLayerStore, skip_confirm: bool) -> PylayerResult<()> {
    if !store.metadata_path().exists() && !store.layer_dir().exists() {
        println!("No layer to clear.");
        return Ok(());
    }

    println!("This will remove:");
    println!("  {} {}", style("•").red(), store.layer_dir().display());
    println!("  {} {}", style("•").red(), store.metadata_path().display());
    println!();

    if !skip_confirm {
        print!("Are you sure? [y/N] ");
        let _ = io::stdout().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            println!("Failed to read input, aborting.");
            return Ok(());
        }

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if store.clear().await? {
        println!("{} Layer cleared; next build will reinstall", style("✓").green());
    }

    Ok(())
}
