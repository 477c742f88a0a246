use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default quantization step between stored coordinates of one interval
pub const DEFAULT_GAP: i32 = 1000;

/// Smallest canonical chromosome number
pub const MIN_CHROMOSOME: u8 = 1;

/// Largest canonical chromosome number (25 = mitochondrial)
pub const MAX_CHROMOSOME: u8 = 25;

/// Largest storable genomic position (covers the longest human chromosome)
pub const MAX_POSITION: i32 = 250_000_000;

/// Compact integer standing in for an accession in stored records
pub type SourceIndex = i32;

/// Canonical chromosome number in `[1, 25]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Chromosome(u8);

impl Chromosome {
    /// Returns `None` when `number` is outside `[1, 25]`
    #[must_use]
    pub fn new(number: u8) -> Option<Self> {
        (MIN_CHROMOSOME..=MAX_CHROMOSOME)
            .contains(&number)
            .then_some(Self(number))
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// UCSC-style label, e.g. `chr7`, `chrX`, `chrM`
    #[must_use]
    pub fn label(self) -> String {
        match self.0 {
            23 => "chrX".to_string(),
            24 => "chrY".to_string(),
            25 => "chrM".to_string(),
            n => format!("chr{n}"),
        }
    }
}

impl TryFrom<u8> for Chromosome {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("chromosome {value} outside [1, 25]"))
    }
}

impl From<Chromosome> for u8 {
    fn from(chromosome: Chromosome) -> Self {
        chromosome.0
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fixed-width payload stored at every quantized coordinate of an interval.
///
/// `start` and `end` are the original interval bounds, never the bin position,
/// so exact overlap can be re-derived at query time. Field order is part of the
/// on-disk fragment format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionRecord {
    pub source_index: SourceIndex,
    pub start: i32,
    pub end: i32,
}

impl RegionRecord {
    #[must_use]
    pub fn new(source_index: SourceIndex, start: i32, end: i32) -> Self {
        Self {
            source_index,
            start,
            end,
        }
    }

    /// True overlap against the closed query window `[start, end]`
    #[inline]
    #[must_use]
    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        self.end >= start && self.start <= end
    }
}

/// A validated interval ready for binning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub chromosome: Chromosome,
    pub start: i32,
    pub end: i32,
    pub source: SourceIndex,
}

impl Interval {
    /// Build an interval from raw BED coordinates.
    ///
    /// # Errors
    ///
    /// Returns `SkipReason::Degenerate` when `start >= end` and
    /// `SkipReason::OutOfDomain` when either bound falls outside the storable
    /// position range.
    pub fn new(
        chromosome: Chromosome,
        start: u64,
        end: u64,
        source: SourceIndex,
    ) -> Result<Self, SkipReason> {
        if start >= end {
            return Err(SkipReason::Degenerate { start, end });
        }
        let (Ok(start_i), Ok(end_i)) = (i32::try_from(start), i32::try_from(end)) else {
            return Err(SkipReason::OutOfDomain { start, end });
        };
        if end_i > MAX_POSITION {
            return Err(SkipReason::OutOfDomain { start, end });
        }
        Ok(Self {
            chromosome,
            start: start_i,
            end: end_i,
            source,
        })
    }

    #[must_use]
    pub fn record(&self) -> RegionRecord {
        RegionRecord::new(self.source, self.start, self.end)
    }
}

/// Why a single input record was dropped during ingestion.
///
/// These never abort a run; the record is logged and skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unrecognized chromosome label '{0}'")]
    UnknownChromosome(String),

    #[error("degenerate interval: start {start} >= end {end}")]
    Degenerate { start: u64, end: u64 },

    #[error("interval {start}-{end} outside storable range [0, {MAX_POSITION}]")]
    OutOfDomain { start: u64, end: u64 },

    #[error("malformed line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chromosome_domain() {
        assert!(Chromosome::new(0).is_none());
        assert!(Chromosome::new(1).is_some());
        assert!(Chromosome::new(25).is_some());
        assert!(Chromosome::new(26).is_none());
    }

    #[test]
    fn test_chromosome_label() {
        assert_eq!(Chromosome::new(7).unwrap().label(), "chr7");
        assert_eq!(Chromosome::new(23).unwrap().label(), "chrX");
        assert_eq!(Chromosome::new(25).unwrap().label(), "chrM");
    }

    #[test]
    fn test_record_overlap_is_closed() {
        let record = RegionRecord::new(0, 100, 200);
        assert!(record.overlaps(200, 300));
        assert!(record.overlaps(0, 100));
        assert!(record.overlaps(150, 160));
        assert!(!record.overlaps(201, 300));
        assert!(!record.overlaps(0, 99));
    }

    #[test]
    fn test_interval_rejects_degenerate() {
        let chr1 = Chromosome::new(1).unwrap();
        assert_eq!(
            Interval::new(chr1, 10, 10, 0),
            Err(SkipReason::Degenerate { start: 10, end: 10 })
        );
        assert!(matches!(
            Interval::new(chr1, 20, 10, 0),
            Err(SkipReason::Degenerate { .. })
        ));
    }

    #[test]
    fn test_interval_rejects_out_of_domain() {
        let chr1 = Chromosome::new(1).unwrap();
        assert!(matches!(
            Interval::new(chr1, 0, u64::from(u32::MAX), 0),
            Err(SkipReason::OutOfDomain { .. })
        ));
        assert!(matches!(
            Interval::new(chr1, 0, 250_000_001, 0),
            Err(SkipReason::OutOfDomain { .. })
        ));
    }

    #[test]
    fn test_chromosome_serde_rejects_out_of_range() {
        let ok: Chromosome = serde_json::from_str("23").unwrap();
        assert_eq!(ok.get(), 23);
        assert!(serde_json::from_str::<Chromosome>("26").is_err());
    }
}
