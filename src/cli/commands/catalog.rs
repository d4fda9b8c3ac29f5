//! Catalog command - inspect the dependency catalog

use super::inputs;
use crate::catalog::DependencyCatalogEntry;
use crate::cli::args::{CatalogAction, CatalogArgs, OutputFormat};
use crate::config::Config;
use crate::error::PylayerResult;
use std::cmp::Reverse;

/// Execute the catalog command
pub async fn execute(args: CatalogArgs, config: &Config) -> PylayerResult<()> {
    match args.action {
        CatalogAction::List { catalog, format } => {
            let catalog = inputs::load_catalog(catalog.as_deref(), config).await?;

            let mut entries: Vec<&DependencyCatalogEntry> = catalog.entries().iter().collect();
            entries.sort_by_key(|e| (e.id.clone(), Reverse(e.version.clone())));

            if entries.is_empty() {
                println!("No catalog entries found.");
                return Ok(());
            }

            match format {
                OutputFormat::Table => print_table(&entries),
                OutputFormat::Json => print_json(&entries)?,
                OutputFormat::Plain => print_plain(&entries),
            }
        }
    }

    Ok(())
}

fn print_table(entries: &[&DependencyCatalogEntry]) {
    println!(
        "{:<12} {:<10} {:<20} {:<40}",
        "ID", "VERSION", "CHECKSUM", "STACKS"
    );
    println!("{}", "-".repeat(84));

    for entry in entries {
        let checksum: String = entry.sha256_hex().chars().take(16).collect();
        let stacks = if entry.stacks.is_empty() {
            "*".to_string()
        } else {
            entry.stacks.join(",")
        };

        println!(
            "{:<12} {:<10} {:<20} {:<40}",
            entry.id, entry.version, checksum, stacks
        );
    }

    println!();
    println!("Total: {} entries", entries.len());
}

fn print_json(entries: &[&DependencyCatalogEntry]) -> PylayerResult<()> {
    #[derive(serde::Serialize)]
    struct EntryJson<'a> {
        id: &'a str,
        version: String,
        checksum: &'a str,
        uri: &'a str,
        stacks: &'a [String],
    }

    let json: Vec<EntryJson> = entries
        .iter()
        .map(|e| EntryJson {
            id: &e.id,
            version: e.version.to_string(),
            checksum: &e.checksum,
            uri: &e.uri,
            stacks: &e.stacks,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_plain(entries: &[&DependencyCatalogEntry]) {
    for entry in entries {
        println!("{} {}", entry.id, entry.version);
    }
}
