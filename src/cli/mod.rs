//! Command-line interface for region-index.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **create**: Create an empty coordinate store
//! - **load**: Ingest local or remote BED files
//! - **query**: Find regions or accessions overlapping a window
//! - **registry**: Inspect the accession registry
//! - **consolidate**: Merge store fragments
//! - **serve**: Start the HTTP query API
//!
//! ## Usage
//!
//! ```text
//! # Create a store and ingest local files
//! region-index create regions.store --gap 1000
//! region-index load regions.store ENCFF001XYZ.bed.gz ENCFF002ABC.bed.gz
//!
//! # Ingest remote files, numbering new accessions from 5000
//! FILE_INDEX_START=5000 region-index load regions.store --remote https://example.org/ENCFF003.bed.gz
//!
//! # Which accessions overlap chr1:6500-9000?
//! region-index query regions.store chr1 6500 9000 --files
//!
//! # JSON output for scripting
//! region-index query regions.store chr1 6500 9000 --format json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

pub mod load;
pub mod query;
pub mod registry;
pub mod store;

#[derive(Parser)]
#[command(name = "region-index")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Index BED interval files and query overlapping regions by accession")]
#[command(
    long_about = "region-index stores intervals from many BED files in a quantized coordinate store and answers range-overlap queries.\n\nEach BED file is identified by an accession derived from its file name. Queries return:\n- The overlapping intervals with their accessions\n- Or just the distinct accessions with at least one overlapping interval"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an empty coordinate store
    Create(store::CreateArgs),

    /// Ingest BED files into a store
    Load(load::LoadArgs),

    /// Query regions overlapping a window
    Query(query::QueryArgs),

    /// Inspect the accession registry
    Registry(registry::RegistryArgs),

    /// Merge all store fragments into one
    Consolidate(store::ConsolidateArgs),

    /// Start the HTTP query server
    Serve(ServeArgs),
}

#[derive(clap::Args)]
pub struct ServeArgs {
    /// Store directory
    #[arg(required = true)]
    pub store: PathBuf,

    /// Registry snapshot prefix (defaults to the store path)
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}

/// Registry snapshot prefix: explicit, or the store path itself
/// (`regions.store` -> `regions.store_a_to_i.json`)
#[must_use]
pub fn registry_prefix(store: &Path, registry: Option<&Path>) -> PathBuf {
    registry.map_or_else(|| store.to_path_buf(), Path::to_path_buf)
}
