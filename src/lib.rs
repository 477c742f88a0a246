//! # region-index
//!
//! A library for indexing genomic interval annotations from many BED files and
//! answering range-overlap queries by source accession.
//!
//! Intervals of arbitrary length are quantized onto a fixed-step coordinate
//! grid so that a plain sparse `(chromosome, position)` store can hold them.
//! Each stored cell carries the interval's original bounds, and queries turn
//! the coarse bucket matches back into exact overlaps.
//!
//! ## Features
//!
//! - **Quantized storage**: one cell per `GAP` bases of each interval
//! - **Exact, bounded queries**: widened scan, dedupe, overlap filter capped at `limit`
//! - **Compact sources**: accessions stored as 32-bit indices via a persistent registry
//! - **Skip, don't fail**: unplaced contigs and degenerate intervals are logged and dropped
//!
//! ## Example
//!
//! ```rust,no_run
//! use region_index::ingest::load_local;
//! use region_index::query::OverlapQuery;
//! use region_index::registry::AccessionRegistry;
//! use region_index::store::{FileStore, StoreSchema};
//! use region_index::core::normalize_chromosome;
//! use std::path::{Path, PathBuf};
//!
//! let path = Path::new("regions.store");
//! FileStore::create(path, &StoreSchema::new(1000).unwrap()).unwrap();
//!
//! let mut registry = AccessionRegistry::new(0);
//! {
//!     let mut writer = FileStore::open_write(path).unwrap();
//!     load_local(&mut writer, &mut registry, &[PathBuf::from("ENCFF001XYZ.bed.gz")]).unwrap();
//! }
//! registry.save(path).unwrap();
//!
//! let store = FileStore::open_read(path).unwrap();
//! let query = OverlapQuery::new(&store, &registry);
//! let chr1 = normalize_chromosome("chr1").unwrap();
//! for accession in query.query_files(chr1, 6500, 9000, 25).unwrap() {
//!     println!("{accession}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Chromosomes, intervals, stored records
//! - [`binning`]: Interval quantization
//! - [`registry`]: Accession <-> index registry
//! - [`store`]: Coordinate store traits and implementations
//! - [`query`]: Overlap queries and the bounded filter
//! - [`ingest`]: Loading local and remote BED files
//! - [`parsing`]: BED parsing
//! - [`cli`]: Command-line interface implementation
//! - [`web`]: HTTP query API

pub mod binning;
pub mod cli;
pub mod config;
pub mod core;
pub mod ingest;
pub mod parsing;
pub mod query;
pub mod registry;
pub mod store;
pub mod web;

// Re-export commonly used types for convenience
pub use config::IndexConfig;
pub use core::types::{Chromosome, Interval, RegionRecord, SkipReason, SourceIndex};
pub use query::{OverlapQuery, RegionHit};
pub use registry::AccessionRegistry;
pub use store::{CoordinateReader, CoordinateWriter, FileStore, InMemoryStore};
