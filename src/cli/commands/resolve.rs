//! Resolve command - report the selected version without installing

use super::inputs;
use crate::cli::args::{OutputFormat, ResolveArgs};
use crate::config::Config;
use crate::error::PylayerResult;
use crate::report;
use crate::resolve::{resolve, ResolvedRequest};

/// Execute the resolve command
pub async fn execute(args: ResolveArgs, config: &Config) -> PylayerResult<()> {
    let sources = inputs::source_set(&args.sources, config).collect().await?;
    let request = resolve(&sources);

    let catalog = inputs::load_catalog(args.sources.catalog.as_deref(), config).await?;
    let matched = inputs::refinery(&args.sources, config).match_dependency(&request, &catalog)?;
    let version = matched.version.to_string();

    match args.format {
        OutputFormat::Table => {
            print!(
                "{}",
                report::render(&config.dependency.display_name, &request, &version)
            );
        }
        OutputFormat::Json => print_json(&request, &version, &matched.checksum, &matched.uri)?,
        OutputFormat::Plain => println!("{}", version),
    }

    Ok(())
}

fn print_json(
    request: &ResolvedRequest,
    version: &str,
    checksum: &str,
    uri: &str,
) -> PylayerResult<()> {
    #[derive(serde::Serialize)]
    struct ResolveJson<'a> {
        #[serde(flatten)]
        request: &'a ResolvedRequest,
        selected_version: &'a str,
        checksum: &'a str,
        uri: &'a str,
    }

    let json = ResolveJson {
        request,
        selected_version: version,
        checksum,
        uri,
    };
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
