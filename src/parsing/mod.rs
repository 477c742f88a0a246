//! Parsers for interval sources.
//!
//! - **BED files**: plain or gzip/bgzip compressed, local or downloaded
//!
//! ## Example
//!
//! ```rust,no_run
//! use region_index::parsing::bed::open_bed_file;
//! use std::path::Path;
//!
//! for record in open_bed_file(Path::new("ENCFF001XYZ.bed.gz")).unwrap() {
//!     match record {
//!         Ok(r) => println!("{}\t{}\t{}", r.chrom, r.start, r.end),
//!         Err(e) => eprintln!("skipping: {e}"),
//!     }
//! }
//! ```

pub mod bed;
