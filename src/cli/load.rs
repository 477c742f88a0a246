use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Args;

use crate::cli::{registry_prefix, OutputFormat};
use crate::config::{IndexConfig, INDEX_BASE_ENV};
use crate::ingest::{self, Fetcher, IngestSummary};
use crate::registry::AccessionRegistry;
use crate::store::{FileStore, WriteHandle};

#[derive(Args)]
pub struct LoadArgs {
    /// Store directory (create it first with `region-index create`)
    #[arg(required = true)]
    pub store: PathBuf,

    /// BED sources: local paths, or URLs with --remote
    #[arg(required = true, num_args = 1..)]
    pub sources: Vec<String>,

    /// Treat sources as URLs to download
    #[arg(long)]
    pub remote: bool,

    /// Registry snapshot prefix (defaults to the store path)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// First index for a new registry
    #[arg(long, env = INDEX_BASE_ENV, default_value_t = 0)]
    pub index_base: i32,

    /// Download timeout in seconds (with --remote)
    #[arg(long, default_value = "300")]
    pub timeout: u64,
}

/// Execute load subcommand
///
/// The store's write lock is held from before the registry snapshot is read
/// until after it is saved, so the registry and the store always move
/// together. The snapshot is saved even when ingestion stops early, so
/// indices already written to the store stay resolvable.
///
/// # Errors
///
/// Returns an error if the store cannot be opened for writing, a source
/// cannot be read, or the registry cannot be loaded or saved.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: LoadArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let schema = FileStore::schema(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;
    let config = IndexConfig::new(schema.gap, args.index_base)?;

    let mut writer = FileStore::open_write(&args.store)
        .with_context(|| format!("Failed to lock store {}", args.store.display()))?;

    let prefix = registry_prefix(&args.store, args.registry.as_deref());
    let mut registry = AccessionRegistry::from_snapshot_or_new(&prefix, config.index_base)
        .with_context(|| format!("Failed to load registry {}", prefix.display()))?;

    if verbose {
        eprintln!(
            "Registry has {} accessions, next index {}",
            registry.len(),
            registry.next_index()
        );
    }

    let result = ingest_sources(&args, &mut writer, &mut registry);
    registry
        .save(&prefix)
        .with_context(|| format!("Failed to save registry {}", prefix.display()))?;
    drop(writer);
    let summary = result?;

    print_summary(&summary, format)?;
    Ok(())
}

fn ingest_sources(
    args: &LoadArgs,
    writer: &mut WriteHandle,
    registry: &mut AccessionRegistry,
) -> anyhow::Result<IngestSummary> {
    let summary = if args.remote {
        let fetcher = Fetcher::new(Duration::from_secs(args.timeout))?;
        ingest::load(writer, registry, &fetcher, &args.sources)?
    } else {
        let paths: Vec<PathBuf> = args.sources.iter().map(PathBuf::from).collect();
        ingest::load_local(writer, registry, &paths)?
    };
    Ok(summary)
}

fn print_summary(summary: &IngestSummary, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Tsv => {
            println!("accession\tindex\tintervals\tcells\tskipped");
            for s in &summary.sources {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    s.accession, s.index, s.intervals, s.cells, s.skipped
                );
            }
        }
        OutputFormat::Text => {
            for s in &summary.sources {
                println!(
                    "{} (index {}): {} intervals, {} cells, {} skipped",
                    s.accession, s.index, s.intervals, s.cells, s.skipped
                );
            }
            println!(
                "Loaded {} sources: {} intervals, {} cells, {} skipped",
                summary.sources.len(),
                summary.total_intervals(),
                summary.total_cells(),
                summary.total_skipped()
            );
        }
    }
    Ok(())
}
