//! Core data types for interval indexing.
//!
//! - [`Chromosome`]: canonical chromosome number in `[1, 25]`
//! - [`Interval`]: a validated `[start, end)` range tagged with its source index
//! - [`RegionRecord`]: the fixed-width payload stored at every quantized coordinate
//! - [`SkipReason`]: per-record problems that drop a record without aborting ingestion
//!
//! ## Chromosome Numbering
//!
//! | Label              | Number |
//! |--------------------|--------|
//! | `chr1`..`chr22`, `1`..`22` | 1-22 |
//! | `chrX`, `X`        | 23     |
//! | `chrY`, `Y`        | 24     |
//! | `chrM`, `M`, `MT`  | 25     |
//!
//! Anything else (unplaced scaffolds, alt loci, decoys) has no slot and is skipped.

pub mod chromosome;
pub mod types;

pub use chromosome::normalize_chromosome;
pub use types::{Chromosome, Interval, RegionRecord, SkipReason, SourceIndex};
