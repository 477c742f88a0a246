use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::filter::{dedupe_candidates, filter_overlapping};
use crate::core::types::{Chromosome, RegionRecord};
use crate::registry::AccessionRegistry;
use crate::store::{CoordinateReader, StoreError};

/// Default cap on returned regions
pub const DEFAULT_LIMIT: usize = 25;

/// One overlapping interval, resolved to its accession when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionHit {
    pub accession: Option<String>,
    pub start: i32,
    pub end: i32,
}

/// Position range to scan for a query window.
///
/// The lower bound moves left by `gap`: an interval starting up to `gap`
/// before `start` may have its nearest stored coordinate left of the window
/// and still overlap it.
#[must_use]
pub fn widened_window(start: i32, end: i32, gap: i32) -> RangeInclusive<i32> {
    start.saturating_sub(gap).max(0)..=end
}

/// Overlap queries against one store snapshot and its registry
pub struct OverlapQuery<'a, S> {
    store: &'a S,
    registry: &'a AccessionRegistry,
}

impl<'a, S: CoordinateReader> OverlapQuery<'a, S> {
    pub fn new(store: &'a S, registry: &'a AccessionRegistry) -> Self {
        Self { store, registry }
    }

    /// Unique payloads stored in the widened window, in arrival order
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn candidates(
        &self,
        chromosome: Chromosome,
        start: i32,
        end: i32,
    ) -> Result<Vec<RegionRecord>, StoreError> {
        let window = widened_window(start, end, self.store.gap());
        let raw = self.store.read_range(chromosome, window.clone())?;
        let raw_count = raw.len();
        let candidates = dedupe_candidates(raw);
        debug!(
            "chr{} {:?}: {} cells, {} unique candidates",
            chromosome,
            window,
            raw_count,
            candidates.len()
        );
        Ok(candidates)
    }

    /// Up to `limit` records truly overlapping `[start, end]`
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn matches(
        &self,
        chromosome: Chromosome,
        start: i32,
        end: i32,
        limit: usize,
    ) -> Result<Vec<RegionRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let candidates = self.candidates(chromosome, start, end)?;
        Ok(filter_overlapping(&candidates, start, end, limit))
    }

    /// Overlapping regions with their accessions; unknown indices are kept
    /// with `accession: None`
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn query_by_accession(
        &self,
        chromosome: Chromosome,
        start: i32,
        end: i32,
        limit: usize,
    ) -> Result<Vec<RegionHit>, StoreError> {
        Ok(self
            .matches(chromosome, start, end, limit)?
            .into_iter()
            .map(|record| RegionHit {
                accession: self
                    .registry
                    .find_file(record.source_index)
                    .map(str::to_string),
                start: record.start,
                end: record.end,
            })
            .collect())
    }

    /// Distinct accessions among the first `limit` overlapping regions;
    /// regions with an unknown index are dropped
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub fn query_files(
        &self,
        chromosome: Chromosome,
        start: i32,
        end: i32,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let mut seen = HashSet::new();
        Ok(self
            .matches(chromosome, start, end, limit)?
            .into_iter()
            .filter_map(|record| self.registry.find_file(record.source_index))
            .filter(|accession| seen.insert(*accession))
            .map(str::to_string)
            .collect())
    }
}

/// Overlapping regions with accessions, see [`OverlapQuery::query_by_accession`]
///
/// # Errors
///
/// Propagates store read failures.
pub fn query_by_accession<S: CoordinateReader>(
    store: &S,
    registry: &AccessionRegistry,
    chromosome: Chromosome,
    start: i32,
    end: i32,
    limit: usize,
) -> Result<Vec<RegionHit>, StoreError> {
    OverlapQuery::new(store, registry).query_by_accession(chromosome, start, end, limit)
}

/// Distinct overlapping accessions, see [`OverlapQuery::query_files`]
///
/// # Errors
///
/// Propagates store read failures.
pub fn query_files<S: CoordinateReader>(
    store: &S,
    registry: &AccessionRegistry,
    chromosome: Chromosome,
    start: i32,
    end: i32,
    limit: usize,
) -> Result<Vec<String>, StoreError> {
    OverlapQuery::new(store, registry).query_files(chromosome, start, end, limit)
}
