//! Sparse coordinate store keyed by `(chromosome, position)`.
//!
//! The query and ingestion code only depend on the [`CoordinateReader`] and
//! [`CoordinateWriter`] traits. A handle is opened in exactly one mode, and
//! the mode is part of its type: a reader cannot write and a writer cannot
//! read.
//!
//! Two implementations ship with the crate:
//!
//! - [`FileStore`]: a directory of immutable bincode fragments plus a JSON
//!   schema, with an exclusive write lock released when the handle drops
//! - [`InMemoryStore`]: an ordered map, used by tests and embedders
//!
//! Duplicate keys are allowed; several intervals routinely share a cell.

pub mod file;
pub mod memory;

use std::ops::RangeInclusive;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{Chromosome, RegionRecord};

pub use file::{FileStore, ReadHandle, StoreSchema, WriteHandle};
pub use memory::InMemoryStore;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse store schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Failed to encode or decode fragment: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Failed to persist fragment: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("No store found at {0}")]
    NotFound(PathBuf),

    #[error("A store already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Store at {0} is locked by another writer")]
    Locked(PathBuf),

    #[error("Coordinate count {coords} does not match payload count {payloads}")]
    LengthMismatch { coords: usize, payloads: usize },

    #[error("Position {position} on chromosome {chromosome} is outside the store domain")]
    OutOfDomain { chromosome: Chromosome, position: i32 },

    #[error("Quantization gap must be positive, got {0}")]
    InvalidGap(i32),
}

/// Read side of a coordinate store
pub trait CoordinateReader {
    /// Quantization step the store was created with
    fn gap(&self) -> i32;

    /// All payloads stored on `chromosome` at positions within `positions`,
    /// duplicates included, in position order
    ///
    /// # Errors
    ///
    /// Implementations return `StoreError` on backend failure.
    fn read_range(
        &self,
        chromosome: Chromosome,
        positions: RangeInclusive<i32>,
    ) -> Result<Vec<RegionRecord>, StoreError>;
}

/// Write side of a coordinate store
pub trait CoordinateWriter {
    /// Quantization step the store was created with
    fn gap(&self) -> i32;

    /// Store `payloads[i]` at `coords[i]` for every `i`, as one bulk write
    ///
    /// # Errors
    ///
    /// Returns `StoreError::LengthMismatch` if the slices differ in length,
    /// `StoreError::OutOfDomain` for positions outside the store domain, or a
    /// backend error.
    fn write(
        &mut self,
        coords: &[(Chromosome, i32)],
        payloads: &[RegionRecord],
    ) -> Result<(), StoreError>;
}

/// Shared argument checks for writers
pub(crate) fn validate_write(
    coords: &[(Chromosome, i32)],
    payloads: &[RegionRecord],
    max_position: i32,
) -> Result<(), StoreError> {
    if coords.len() != payloads.len() {
        return Err(StoreError::LengthMismatch {
            coords: coords.len(),
            payloads: payloads.len(),
        });
    }
    if let Some(&(chromosome, position)) = coords
        .iter()
        .find(|(_, position)| !(0..=max_position).contains(position))
    {
        return Err(StoreError::OutOfDomain {
            chromosome,
            position,
        });
    }
    Ok(())
}
