use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;

use crate::cli::{registry_prefix, OutputFormat};
use crate::core::chromosome::normalize_chromosome;
use crate::query::{OverlapQuery, RegionHit, DEFAULT_LIMIT};
use crate::registry::AccessionRegistry;
use crate::store::FileStore;

#[derive(Args)]
pub struct QueryArgs {
    /// Store directory
    #[arg(required = true)]
    pub store: PathBuf,

    /// Chromosome (e.g. chr1, 1, chrX, MT)
    #[arg(required = true)]
    pub chrom: String,

    /// Window start
    #[arg(required = true)]
    pub start: i32,

    /// Window end (inclusive)
    #[arg(required = true)]
    pub end: i32,

    /// Maximum number of overlapping regions to consider
    #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Report distinct accessions instead of regions
    #[arg(long)]
    pub files: bool,

    /// Registry snapshot prefix (defaults to the store path)
    #[arg(long)]
    pub registry: Option<PathBuf>,
}

/// Execute query subcommand
///
/// # Errors
///
/// Returns an error if the chromosome is not recognized, the window is
/// inverted, or the store/registry cannot be read.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: QueryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let chromosome = normalize_chromosome(&args.chrom)?;
    if args.start > args.end {
        bail!("Window start {} is after end {}", args.start, args.end);
    }

    let store = FileStore::open_read(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;
    let prefix = registry_prefix(&args.store, args.registry.as_deref());
    let registry = AccessionRegistry::from_snapshot_or_new(&prefix, 0)
        .with_context(|| format!("Failed to load registry {}", prefix.display()))?;

    if verbose {
        eprintln!(
            "Loaded store with {} cells, registry with {} accessions",
            store.cell_count(),
            registry.len()
        );
    }

    let query = OverlapQuery::new(&store, &registry);
    if args.files {
        let files = query.query_files(chromosome, args.start, args.end, args.limit)?;
        print_files(&files, format)?;
    } else {
        let hits = query.query_by_accession(chromosome, args.start, args.end, args.limit)?;
        print_hits(&hits, format)?;
    }
    Ok(())
}

fn print_hits(hits: &[RegionHit], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(hits)?),
        OutputFormat::Tsv => {
            println!("accession\tstart\tend");
            for hit in hits {
                println!(
                    "{}\t{}\t{}",
                    hit.accession.as_deref().unwrap_or("."),
                    hit.start,
                    hit.end
                );
            }
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("No overlapping regions found.");
            }
            for hit in hits {
                println!(
                    "{}\t{}\t{}",
                    hit.accession.as_deref().unwrap_or("<unknown>"),
                    hit.start,
                    hit.end
                );
            }
        }
    }
    Ok(())
}

fn print_files(files: &[String], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(files)?),
        OutputFormat::Tsv | OutputFormat::Text => {
            if files.is_empty() && matches!(format, OutputFormat::Text) {
                println!("No overlapping accessions found.");
            }
            for file in files {
                println!("{file}");
            }
        }
    }
    Ok(())
}
