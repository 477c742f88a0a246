//! Quantization of intervals onto a fixed-step coordinate space.
//!
//! An interval `[start, end)` is represented in the store by one cell at every
//! position `start, start + GAP, start + 2*GAP, ...` strictly below `end`. Each
//! cell carries the original, unquantized bounds so the query side can discard
//! cells that only share a bucket with the query window.
//!
//! ```text
//! GAP = 1000, interval [5000, 7200)
//!
//!   5000      6000      7000  7200
//!    |---------|---------|-----|
//!    ^         ^         ^
//!    stored    stored    stored   -> payload (source, 5000, 7200) at each
//! ```

use crate::core::types::{Chromosome, Interval, RegionRecord};

/// Emits the quantized coordinates of intervals for a fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBinner {
    gap: i32,
}

impl RegionBinner {
    /// Returns `None` unless `gap` is positive
    #[must_use]
    pub fn new(gap: i32) -> Option<Self> {
        (gap > 0).then_some(Self { gap })
    }

    #[must_use]
    pub fn gap(&self) -> i32 {
        self.gap
    }

    /// Quantized positions for `[start, end)`; empty when `start >= end`
    pub fn positions(&self, start: i32, end: i32) -> impl Iterator<Item = i32> {
        // gap > 0 is guaranteed by the constructor
        #[allow(clippy::cast_sign_loss)]
        let step = self.gap as usize;
        (start..end).step_by(step)
    }

    /// All bin entries for one interval, payload = original bounds
    pub fn bin(&self, interval: &Interval) -> impl Iterator<Item = BinEntry> {
        let chromosome = interval.chromosome;
        let record = interval.record();
        self.positions(interval.start, interval.end)
            .map(move |position| BinEntry {
                chromosome,
                position,
                record,
            })
    }
}

/// One stored cell: coordinate plus payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinEntry {
    pub chromosome: Chromosome,
    pub position: i32,
    pub record: RegionRecord,
}

/// Column-oriented batch of bin entries for one bulk store write
#[derive(Debug, Default, Clone)]
pub struct BinBatch {
    pub coords: Vec<(Chromosome, i32)>,
    pub payloads: Vec<RegionRecord>,
}

impl BinBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every bin of `interval`, returning how many cells were added
    pub fn push_interval(&mut self, binner: &RegionBinner, interval: &Interval) -> usize {
        let before = self.coords.len();
        for entry in binner.bin(interval) {
            self.coords.push((entry.chromosome, entry.position));
            self.payloads.push(entry.record);
        }
        self.coords.len() - before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}
