//! Streaming reader for BED interval files.
//!
//! Only the first three columns (`chrom`, `chromStart`, `chromEnd`) are used;
//! any further columns are ignored. Coordinates are 0-based half-open as in the
//! BED specification.
//!
//! Supported inputs:
//! - `.bed` (uncompressed)
//! - `.bed.gz`, `.bed.bgz` (gzip or bgzip compressed)
//! - in-memory bytes, gunzipped automatically when they carry the gzip magic

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::core::types::SkipReason;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single bad line; the reader can continue past it
    #[error("{0}")]
    Record(SkipReason),
}

/// One raw BED interval before chromosome normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

/// Line-oriented BED reader yielding one result per data line
pub struct BedReader<R> {
    inner: R,
    line: Vec<u8>,
    line_number: usize,
}

impl<R: BufRead> BedReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: Vec::new(),
            line_number: 0,
        }
    }
}

impl<R: BufRead> Iterator for BedReader<R> {
    type Item = Result<BedRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.inner.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ParseError::Io(e))),
            }
            self.line_number += 1;

            let Ok(line) = std::str::from_utf8(&self.line) else {
                return Some(Err(ParseError::Record(SkipReason::Malformed {
                    line: self.line_number,
                    reason: "line is not valid UTF-8".to_string(),
                })));
            };
            let line = line.trim_end_matches(['\n', '\r']);
            if is_skippable_line(line) {
                continue;
            }
            return Some(parse_bed_line(line, self.line_number).map_err(ParseError::Record));
        }
    }
}

/// Header, comment and blank lines carry no intervals
fn is_skippable_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

/// Parse the first three columns of a BED data line
///
/// # Errors
///
/// Returns `SkipReason::Malformed` when fewer than three columns are present or
/// a coordinate is not a non-negative integer.
pub fn parse_bed_line(line: &str, line_number: usize) -> Result<BedRecord, SkipReason> {
    let mut fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        fields = line.split_whitespace().collect();
    }
    if fields.len() < 3 {
        return Err(SkipReason::Malformed {
            line: line_number,
            reason: format!("expected at least 3 columns, found {}", fields.len()),
        });
    }

    let parse_coord = |name: &str, value: &str| {
        value.trim().parse::<u64>().map_err(|_| SkipReason::Malformed {
            line: line_number,
            reason: format!("invalid {name} '{value}'"),
        })
    };

    Ok(BedRecord {
        chrom: fields[0].trim().to_string(),
        start: parse_coord("start", fields[1])?,
        end: parse_coord("end", fields[2])?,
    })
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a local BED file, decompressing `.gz`/`.bgz` transparently
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_bed_file(path: &Path) -> Result<BedReader<Box<dyn BufRead>>, ParseError> {
    let file = File::open(path)?;
    let inner: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(BedReader::new(inner))
}

/// Read BED records from an in-memory buffer (e.g. a downloaded body)
#[must_use]
pub fn bed_from_bytes(bytes: Vec<u8>) -> BedReader<Box<dyn BufRead>> {
    let inner: Box<dyn BufRead> = if bytes.starts_with(&GZIP_MAGIC) {
        Box::new(BufReader::new(MultiGzDecoder::new(Cursor::new(bytes))))
    } else {
        Box::new(Cursor::new(bytes))
    };
    BedReader::new(inner)
}
