use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::fetch::{FetchError, Fetcher};
use crate::binning::{BinBatch, RegionBinner};
use crate::core::chromosome::normalize_chromosome;
use crate::core::types::{Interval, SkipReason, SourceIndex};
use crate::parsing::bed::{bed_from_bytes, open_bed_file, BedRecord, ParseError};
use crate::registry::{AccessionRegistry, RegistryError};
use crate::store::{CoordinateWriter, StoreError};

const BED_GZ_SUFFIX: &str = ".bed.gz";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to read {source_name}: {error}")]
    Read {
        source_name: String,
        error: std::io::Error,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Store gap must be positive, got {0}")]
    InvalidGap(i32),
}

/// Outcome of ingesting one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub accession: String,
    pub index: SourceIndex,
    /// Intervals written to the store
    pub intervals: usize,
    /// Coordinate cells written (intervals x bins)
    pub cells: usize,
    /// Records dropped as unusable
    pub skipped: usize,
}

/// Outcome of a whole ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub sources: Vec<SourceSummary>,
}

impl IngestSummary {
    #[must_use]
    pub fn total_intervals(&self) -> usize {
        self.sources.iter().map(|s| s.intervals).sum()
    }

    #[must_use]
    pub fn total_cells(&self) -> usize {
        self.sources.iter().map(|s| s.cells).sum()
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.sources.iter().map(|s| s.skipped).sum()
    }
}

/// Accession for a local path or URL: the last path segment without `.bed.gz`
#[must_use]
pub fn accession_from_source(source: &str) -> String {
    let name = source
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source);
    name.strip_suffix(BED_GZ_SUFFIX).unwrap_or(name).to_string()
}

/// Bin every usable record of one source and write them as one bulk write.
///
/// Unknown chromosomes, degenerate or out-of-range intervals and malformed
/// lines are logged and skipped. IO errors abort the source.
///
/// # Errors
///
/// Returns `IngestError::Read` on a read failure, `IngestError::Registry` if
/// no index is left for a new accession, and `IngestError::Store` if the bulk
/// write fails.
pub fn ingest_records<W, I>(
    writer: &mut W,
    registry: &mut AccessionRegistry,
    accession: &str,
    records: I,
) -> Result<SourceSummary, IngestError>
where
    W: CoordinateWriter,
    I: IntoIterator<Item = Result<BedRecord, ParseError>>,
{
    let gap = writer.gap();
    let binner = RegionBinner::new(gap).ok_or(IngestError::InvalidGap(gap))?;
    let index = registry.find_index(accession)?;
    info!("{} -> index {}", accession, index);

    let mut batch = BinBatch::new();
    let mut intervals = 0;
    let mut skipped = 0;

    for result in records {
        let interval = match result {
            Ok(record) => to_interval(&record, index),
            Err(ParseError::Record(reason)) => Err(reason),
            Err(ParseError::Io(error)) => {
                return Err(IngestError::Read {
                    source_name: accession.to_string(),
                    error,
                });
            }
        };
        match interval {
            Ok(interval) => {
                batch.push_interval(&binner, &interval);
                intervals += 1;
            }
            Err(reason) => {
                debug!("{}: skipping record: {}", accession, reason);
                skipped += 1;
            }
        }
    }

    writer.write(&batch.coords, &batch.payloads)?;

    if skipped > 0 {
        warn!("{}: skipped {} unusable records", accession, skipped);
    }
    info!(
        "{}: wrote {} intervals as {} cells",
        accession,
        intervals,
        batch.len()
    );

    Ok(SourceSummary {
        accession: accession.to_string(),
        index,
        intervals,
        cells: batch.len(),
        skipped,
    })
}

fn to_interval(record: &BedRecord, index: SourceIndex) -> Result<Interval, SkipReason> {
    let chromosome = normalize_chromosome(&record.chrom)?;
    Interval::new(chromosome, record.start, record.end, index)
}

/// Ingest local BED files (plain or gzipped)
///
/// # Errors
///
/// Stops at the first source that cannot be read or written.
pub fn load_local<W: CoordinateWriter>(
    writer: &mut W,
    registry: &mut AccessionRegistry,
    paths: &[PathBuf],
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();
    for (i, path) in paths.iter().enumerate() {
        debug!("Source {}/{}: {}", i + 1, paths.len(), path.display());
        let accession = accession_from_source(&path.to_string_lossy());
        let reader = open_bed_file(path).map_err(|e| read_error(path, e))?;
        summary
            .sources
            .push(ingest_records(writer, registry, &accession, reader)?);
    }
    Ok(summary)
}

/// Download and ingest remote BED files (gzip detected from content)
///
/// # Errors
///
/// Stops at the first source that cannot be fetched or written.
pub fn load<W: CoordinateWriter>(
    writer: &mut W,
    registry: &mut AccessionRegistry,
    fetcher: &Fetcher,
    urls: &[String],
) -> Result<IngestSummary, IngestError> {
    let mut summary = IngestSummary::default();
    for (i, url) in urls.iter().enumerate() {
        debug!("Source {}/{}: {}", i + 1, urls.len(), url);
        let body = fetcher.fetch(url)?;
        let accession = accession_from_source(url);
        summary
            .sources
            .push(ingest_records(writer, registry, &accession, bed_from_bytes(body))?);
    }
    Ok(summary)
}

fn read_error(path: &Path, error: ParseError) -> IngestError {
    let error = match error {
        ParseError::Io(e) => e,
        ParseError::Record(reason) => std::io::Error::new(std::io::ErrorKind::InvalidData, reason),
    };
    IngestError::Read {
        source_name: path.display().to_string(),
        error,
    }
}
