//! Ingestion of BED sources into a coordinate store.
//!
//! Each source is identified by an accession derived from its file name. Its
//! records go through chromosome normalization and validation, are binned,
//! and are written to the store in a single bulk write. Records that cannot
//! be placed (unplaced contigs, `start >= end`, malformed lines) are skipped
//! and counted; they never abort the run.
//!
//! ```text
//! BED source ─► normalize chrom ─► registry.find_index ─► bin ─► store.write
//! ```

pub mod fetch;
pub mod loader;

pub use fetch::{FetchError, Fetcher};
pub use loader::{
    accession_from_source, ingest_records, load, load_local, IngestError, IngestSummary,
    SourceSummary,
};
