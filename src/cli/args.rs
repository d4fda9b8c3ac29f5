//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// pylayer - CPython layer builder
///
/// Resolves the CPython version for an application from ranked sources,
/// matches it against a dependency catalog and reuses the cached layer
/// when nothing changed.
#[derive(Parser, Debug)]
#[command(name = "pylayer")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PYLAYER_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, install or reuse the CPython layer
    Build(BuildArgs),

    /// Show which version would be selected, without installing
    Resolve(ResolveArgs),

    /// Inspect the dependency catalog
    Catalog(CatalogArgs),

    /// Inspect or clear the cached layer
    Layer(LayerArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Inputs shared by `build` and `resolve`
#[derive(Parser, Debug, Clone)]
pub struct SourceArgs {
    /// Application directory (holds buildpack.yml)
    #[arg(short, long, default_value = ".")]
    pub app: PathBuf,

    /// Dependency catalog (defaults to catalog.path from config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Build plan file carrying a version requirement
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Stack id used to filter catalog entries
    #[arg(long, env = "CNB_STACK_ID")]
    pub stack: Option<String>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Layers directory
    #[arg(short, long)]
    pub layers: PathBuf,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// List catalog entries, highest version first
    List {
        /// Dependency catalog (defaults to catalog.path from config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Arguments for the layer command
#[derive(Parser, Debug)]
pub struct LayerArgs {
    #[command(subcommand)]
    pub action: LayerAction,
}

/// Layer subcommands
#[derive(Subcommand, Debug)]
pub enum LayerAction {
    /// Show the persisted layer metadata
    Show {
        /// Layers directory
        #[arg(short, long)]
        layers: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Remove the layer and its metadata, forcing a rebuild
    Clear {
        /// Layers directory
        #[arg(short, long)]
        layers: PathBuf,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list-style commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Plain,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_build() {
        let cli = Cli::parse_from([
            "pylayer", "build", "--app", "app", "--layers", "layers", "--stack", "jammy",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.sources.app, PathBuf::from("app"));
                assert_eq!(args.layers, PathBuf::from("layers"));
                assert_eq!(args.sources.stack.as_deref(), Some("jammy"));
                assert!(args.sources.catalog.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn build_requires_layers() {
        assert!(Cli::try_parse_from(["pylayer", "build"]).is_err());
    }

    #[test]
    fn cli_parses_resolve_json() {
        let cli = Cli::parse_from(["pylayer", "resolve", "--format", "json"]);
        match cli.command {
            Commands::Resolve(args) => {
                assert!(matches!(args.format, OutputFormat::Json));
                assert_eq!(args.sources.app, PathBuf::from("."));
            }
            _ => panic!("expected Resolve command"),
        }
    }

    #[test]
    fn cli_parses_layer_clear() {
        let cli = Cli::parse_from(["pylayer", "layer", "clear", "--layers", "l", "--yes"]);
        match cli.command {
            Commands::Layer(LayerArgs {
                action: LayerAction::Clear { yes, .. },
            }) => assert!(yes),
            _ => panic!("expected Layer clear"),
        }
    }

    #[test]
    fn verbose_counts() {
        let cli = Cli::parse_from(["pylayer", "-vv", "catalog", "list"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn config_without_action() {
        let cli = Cli::parse_from(["pylayer", "config"]);
        assert!(matches!(cli.command, Commands::Config(ConfigArgs { action: None })));
    }
}
