use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::cli::OutputFormat;
use crate::config::IndexConfig;
use crate::core::types::DEFAULT_GAP;
use crate::store::{FileStore, StoreSchema};

#[derive(Args)]
pub struct CreateArgs {
    /// Store directory to create
    #[arg(required = true)]
    pub store: PathBuf,

    /// Quantization step between stored coordinates
    #[arg(long, default_value_t = DEFAULT_GAP)]
    pub gap: i32,
}

#[derive(Args)]
pub struct ConsolidateArgs {
    /// Store directory
    #[arg(required = true)]
    pub store: PathBuf,
}

/// Execute create subcommand
///
/// # Errors
///
/// Returns an error if the gap is invalid or the store already exists.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_create(args: CreateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = IndexConfig::new(args.gap, 0)?;
    let schema = StoreSchema::new(config.gap)?;
    FileStore::create(&args.store, &schema)
        .with_context(|| format!("Failed to create store {}", args.store.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
        OutputFormat::Tsv => println!("{}\t{}", args.store.display(), schema.gap),
        OutputFormat::Text => {
            println!(
                "Created store {} (gap {})",
                args.store.display(),
                schema.gap
            );
        }
    }
    Ok(())
}

/// Execute consolidate subcommand
///
/// # Errors
///
/// Returns an error if the store is missing or locked.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run_consolidate(args: ConsolidateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let merged = FileStore::consolidate(&args.store)
        .with_context(|| format!("Failed to consolidate {}", args.store.display()))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "fragments_merged": merged })),
        OutputFormat::Tsv => println!("{merged}"),
        OutputFormat::Text => println!("Merged {merged} fragments"),
    }
    Ok(())
}
