//! Range-overlap queries over the coordinate store.
//!
//! A query for chromosome `c` and window `[start, end]` proceeds as:
//!
//! 1. **Widened read**: scan positions `[max(0, start - GAP), end]`, since an
//!    interval's stored coordinates sit at `GAP` steps from its own start
//! 2. **Dedupe**: an interval is stored once per bin, keep one copy
//! 3. **Bounded filter**: keep candidates whose original bounds truly overlap,
//!    stopping at `limit`
//! 4. **Resolve**: map source indices back to accessions
//!
//! ## Example
//!
//! ```rust,no_run
//! use region_index::core::normalize_chromosome;
//! use region_index::query::OverlapQuery;
//! use region_index::registry::AccessionRegistry;
//! use region_index::store::FileStore;
//! use std::path::Path;
//!
//! let store = FileStore::open_read(Path::new("regions.store")).unwrap();
//! let registry = AccessionRegistry::from_snapshot(Path::new("regions"), 0).unwrap();
//! let chrom = normalize_chromosome("chr1").unwrap();
//!
//! let query = OverlapQuery::new(&store, &registry);
//! for hit in query.query_by_accession(chrom, 6500, 9000, 25).unwrap() {
//!     println!("{:?}\t{}\t{}", hit.accession, hit.start, hit.end);
//! }
//! ```

pub mod engine;
pub mod filter;

pub use engine::{
    query_by_accession, query_files, widened_window, OverlapQuery, RegionHit, DEFAULT_LIMIT,
};
pub use filter::{dedupe_candidates, filter_overlapping};
