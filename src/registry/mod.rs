//! Accession registry: compact integer indices for source datasets.
//!
//! Stored records reference their source by a 32-bit index instead of the
//! accession string. The registry keeps the forward (accession -> index) and
//! reverse (index -> accession) maps in lockstep and persists them as two JSON
//! documents next to the coordinate store:
//!
//! ```text
//! regions_a_to_i.json   {"ENCFF001XYZ": 0, "ENCFF002ABC": 1}
//! regions_i_to_a.json   {"0": "ENCFF001XYZ", "1": "ENCFF002ABC"}
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use region_index::registry::AccessionRegistry;
//! use std::path::Path;
//!
//! let mut registry = AccessionRegistry::new(0);
//! let index = registry.find_index("ENCFF001XYZ").unwrap();
//! assert_eq!(registry.find_file(index), Some("ENCFF001XYZ"));
//!
//! registry.save(Path::new("regions")).unwrap();
//! ```

pub mod accession;

pub use accession::{AccessionRegistry, ForwardMap, RegistryError, ReverseMap};
