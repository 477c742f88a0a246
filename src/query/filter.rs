use std::collections::HashSet;

use crate::core::types::RegionRecord;

/// Remove repeated payloads, keeping the first occurrence of each.
///
/// An interval spanning several bins inside the widened window comes back
/// once per bin.
#[must_use]
pub fn dedupe_candidates(records: Vec<RegionRecord>) -> Vec<RegionRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records.into_iter().filter(|r| seen.insert(*r)).collect()
}

/// Keep the first `limit` candidates that truly overlap `[start, end]`.
///
/// The sizing pass finds how far into `candidates` the scan must go to
/// collect `limit` matches; the materialization pass copies the matches from
/// that prefix into a buffer allocated once at its final size. Output order is
/// candidate order.
#[must_use]
pub fn filter_overlapping(
    candidates: &[RegionRecord],
    start: i32,
    end: i32,
    limit: usize,
) -> Vec<RegionRecord> {
    let mut scan_length = 0;
    let mut matched = 0;
    while matched < limit && scan_length < candidates.len() {
        if candidates[scan_length].overlaps(start, end) {
            matched += 1;
        }
        scan_length += 1;
    }

    let mut filtered = Vec::with_capacity(matched);
    filtered.extend(
        candidates[..scan_length]
            .iter()
            .filter(|r| r.overlaps(start, end))
            .copied(),
    );
    filtered
}
