use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use super::{validate_write, CoordinateReader, CoordinateWriter, StoreError};
use crate::core::types::{Chromosome, RegionRecord, MAX_POSITION};

/// Ordered in-memory store with the same semantics as [`super::FileStore`]
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    gap: i32,
    cells: BTreeMap<(Chromosome, i32), Vec<RegionRecord>>,
}

impl InMemoryStore {
    /// # Errors
    ///
    /// Returns `StoreError::InvalidGap` unless `gap` is positive.
    pub fn new(gap: i32) -> Result<Self, StoreError> {
        if gap <= 0 {
            return Err(StoreError::InvalidGap(gap));
        }
        Ok(Self {
            gap,
            cells: BTreeMap::new(),
        })
    }

    /// Positions holding at least one cell on `chromosome`
    #[must_use]
    pub fn positions(&self, chromosome: Chromosome) -> Vec<i32> {
        self.cells
            .range((chromosome, i32::MIN)..=(chromosome, i32::MAX))
            .map(|((_, position), _)| *position)
            .collect()
    }

    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

impl CoordinateReader for InMemoryStore {
    fn gap(&self) -> i32 {
        self.gap
    }

    fn read_range(
        &self,
        chromosome: Chromosome,
        positions: RangeInclusive<i32>,
    ) -> Result<Vec<RegionRecord>, StoreError> {
        let (lo, hi) = positions.into_inner();
        if lo > hi {
            return Ok(Vec::new());
        }
        Ok(self
            .cells
            .range((chromosome, lo)..=(chromosome, hi))
            .flat_map(|(_, records)| records.iter().copied())
            .collect())
    }
}

impl CoordinateWriter for InMemoryStore {
    fn gap(&self) -> i32 {
        self.gap
    }

    fn write(
        &mut self,
        coords: &[(Chromosome, i32)],
        payloads: &[RegionRecord],
    ) -> Result<(), StoreError> {
        validate_write(coords, payloads, MAX_POSITION)?;
        for (&key, &record) in coords.iter().zip(payloads) {
            self.cells.entry(key).or_default().push(record);
        }
        Ok(())
    }
}
