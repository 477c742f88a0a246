use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::core::types::SourceIndex;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read or write registry: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Inconsistent registry maps: {0}")]
    Inconsistent(String),

    #[error("No source index left to assign after {0}")]
    Exhausted(SourceIndex),
}

/// accession -> index
pub type ForwardMap = BTreeMap<String, SourceIndex>;

/// index -> accession
pub type ReverseMap = BTreeMap<SourceIndex, String>;

const FORWARD_SUFFIX: &str = "_a_to_i.json";
const REVERSE_SUFFIX: &str = "_i_to_a.json";

/// Bijective mapping between accession strings and compact source indices.
///
/// Indices are handed out in first-seen order starting at `base` and are never
/// reused, so stored records stay valid across resumed ingestion runs as long
/// as the registry snapshot is saved after every run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessionRegistry {
    base: SourceIndex,
    forward: ForwardMap,
    reverse: ReverseMap,
    next_index: SourceIndex,
}

impl AccessionRegistry {
    /// Create an empty registry whose first index will be `base`
    #[must_use]
    pub fn new(base: SourceIndex) -> Self {
        Self {
            base,
            forward: ForwardMap::new(),
            reverse: ReverseMap::new(),
            next_index: base,
        }
    }

    /// Index for `accession`, assigning the next free one on first sight
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Exhausted` when `accession` is new and the
    /// counter has reached the top of the index domain.
    pub fn find_index(&mut self, accession: &str) -> Result<SourceIndex, RegistryError> {
        if let Some(&index) = self.forward.get(accession) {
            return Ok(index);
        }
        let index = self.next_index;
        self.next_index = index
            .checked_add(1)
            .ok_or(RegistryError::Exhausted(index))?;
        self.forward.insert(accession.to_string(), index);
        self.reverse.insert(index, accession.to_string());
        debug!("Assigned index {} to {}", index, accession);
        Ok(index)
    }

    /// Accession for `index`, `None` if it was never assigned
    #[must_use]
    pub fn find_file(&self, index: SourceIndex) -> Option<&str> {
        self.reverse.get(&index).map(String::as_str)
    }

    #[must_use]
    pub fn base(&self) -> SourceIndex {
        self.base
    }

    /// The index the next unseen accession will receive
    #[must_use]
    pub fn next_index(&self) -> SourceIndex {
        self.next_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Iterate `(accession, index)` pairs in accession order
    pub fn iter(&self) -> impl Iterator<Item = (&str, SourceIndex)> {
        self.forward.iter().map(|(a, &i)| (a.as_str(), i))
    }

    /// Borrow both maps for bulk export
    #[must_use]
    pub fn get_maps(&self) -> (&ForwardMap, &ReverseMap) {
        (&self.forward, &self.reverse)
    }

    /// Consume the registry, handing both maps to the caller
    #[must_use]
    pub fn into_maps(self) -> (ForwardMap, ReverseMap) {
        (self.forward, self.reverse)
    }

    /// Replace both maps wholesale.
    ///
    /// The counter moves past the largest imported index so nothing is
    /// reassigned. On error the registry is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Inconsistent` if the maps are not exact inverses
    /// or an index leaves no room for the next assignment.
    pub fn set_maps(&mut self, forward: ForwardMap, reverse: ReverseMap) -> Result<(), RegistryError> {
        validate_maps(&forward, &reverse)?;
        self.next_index = next_free_index(self.base, &reverse);
        self.forward = forward;
        self.reverse = reverse;
        Ok(())
    }

    /// Paths of the two snapshot documents for `prefix`
    #[must_use]
    pub fn snapshot_paths(prefix: &Path) -> (PathBuf, PathBuf) {
        (
            with_suffix(prefix, FORWARD_SUFFIX),
            with_suffix(prefix, REVERSE_SUFFIX),
        )
    }

    /// Whether both snapshot documents exist for `prefix`
    #[must_use]
    pub fn snapshot_exists(prefix: &Path) -> bool {
        let (forward, reverse) = Self::snapshot_paths(prefix);
        forward.is_file() && reverse.is_file()
    }

    /// Save both maps as `{prefix}_a_to_i.json` and `{prefix}_i_to_a.json`.
    ///
    /// The two documents are written independently; a crash between them
    /// leaves a pair that `load` will reject.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io` or `RegistryError::Parse` on write failure.
    pub fn save(&self, prefix: &Path) -> Result<(), RegistryError> {
        let (forward_path, reverse_path) = Self::snapshot_paths(prefix);
        info!("Saving registry to {}", forward_path.display());
        write_json(&forward_path, &self.forward)?;
        info!("Saving registry to {}", reverse_path.display());
        write_json(&reverse_path, &self.reverse)?;
        Ok(())
    }

    /// Replace in-memory state with the snapshot at `prefix`.
    ///
    /// Unsaved assignments are discarded.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Io`/`Parse` if either document cannot be read
    /// and `RegistryError::Inconsistent` if they disagree.
    pub fn load(&mut self, prefix: &Path) -> Result<(), RegistryError> {
        let (forward_path, reverse_path) = Self::snapshot_paths(prefix);
        info!("Loading registry from {}", forward_path.display());
        let forward: ForwardMap = read_json(&forward_path)?;
        info!("Loading registry from {}", reverse_path.display());
        let reverse: ReverseMap = read_json(&reverse_path)?;
        self.set_maps(forward, reverse)
    }

    /// Construct a registry directly from a snapshot
    ///
    /// # Errors
    ///
    /// See [`AccessionRegistry::load`].
    pub fn from_snapshot(prefix: &Path, base: SourceIndex) -> Result<Self, RegistryError> {
        let mut registry = Self::new(base);
        registry.load(prefix)?;
        Ok(registry)
    }

    /// Load the snapshot at `prefix`, or start empty at `base` when neither
    /// document has been written yet
    ///
    /// # Errors
    ///
    /// See [`AccessionRegistry::load`]. A snapshot with only one document
    /// present is an error, not an empty registry.
    pub fn from_snapshot_or_new(prefix: &Path, base: SourceIndex) -> Result<Self, RegistryError> {
        let (forward_path, reverse_path) = Self::snapshot_paths(prefix);
        if !forward_path.exists() && !reverse_path.exists() {
            debug!("No registry at {}, starting at {}", prefix.display(), base);
            return Ok(Self::new(base));
        }
        Self::from_snapshot(prefix, base)
    }
}

impl Default for AccessionRegistry {
    fn default() -> Self {
        Self::new(0)
    }
}

fn validate_maps(forward: &ForwardMap, reverse: &ReverseMap) -> Result<(), RegistryError> {
    if forward.len() != reverse.len() {
        return Err(RegistryError::Inconsistent(format!(
            "{} accessions but {} indices",
            forward.len(),
            reverse.len()
        )));
    }
    for (accession, index) in forward {
        if *index == SourceIndex::MAX {
            return Err(RegistryError::Inconsistent(format!(
                "'{accession}' maps to {index}, the last index in the domain"
            )));
        }
        match reverse.get(index) {
            Some(back) if back == accession => {}
            Some(back) => {
                return Err(RegistryError::Inconsistent(format!(
                    "index {index} maps to '{back}' but '{accession}' maps to {index}"
                )));
            }
            None => {
                return Err(RegistryError::Inconsistent(format!(
                    "'{accession}' maps to {index} which has no reverse entry"
                )));
            }
        }
    }
    Ok(())
}

fn next_free_index(base: SourceIndex, reverse: &ReverseMap) -> SourceIndex {
    reverse
        .keys()
        .next_back()
        .and_then(|&max| max.checked_add(1))
        .map_or(base, |next| base.max(next))
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), RegistryError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_index_is_idempotent() {
        let mut registry = AccessionRegistry::new(0);
        let a = registry.find_index("ENCFF001").unwrap();
        let b = registry.find_index("ENCFF002").unwrap();
        assert_eq!(registry.find_index("ENCFF001").unwrap(), a);
        assert_eq!(registry.find_index("ENCFF002").unwrap(), b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_indices_are_monotonic_from_base() {
        let mut registry = AccessionRegistry::new(100);
        for (n, accession) in ["a", "b", "c", "d"].iter().enumerate() {
            assert_eq!(registry.find_index(accession).unwrap(), 100 + n as i32);
        }
        // repeats do not advance the counter
        registry.find_index("b").unwrap();
        assert_eq!(registry.next_index(), 104);
    }

    #[test]
    fn test_find_file_round_trips() {
        let mut registry = AccessionRegistry::default();
        for accession in ["x", "y", "z"] {
            let index = registry.find_index(accession).unwrap();
            assert_eq!(registry.find_file(index), Some(accession));
        }
        assert_eq!(registry.find_file(999), None);
        assert_eq!(registry.find_file(-1), None);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("regions");

        let mut registry = AccessionRegistry::new(5);
        registry.find_index("acc1").unwrap();
        registry.find_index("acc2").unwrap();
        registry.save(&prefix).unwrap();

        let (forward_path, reverse_path) = AccessionRegistry::snapshot_paths(&prefix);
        assert!(forward_path.ends_with("regions_a_to_i.json"));
        let reverse_text = std::fs::read_to_string(&reverse_path).unwrap();
        assert_eq!(reverse_text, r#"{"5":"acc1","6":"acc2"}"#);

        let loaded = AccessionRegistry::from_snapshot(&prefix, 5).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.find_file(6), Some("acc2"));
    }

    #[test]
    fn test_load_discards_unsaved_state() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");

        let mut registry = AccessionRegistry::new(0);
        registry.find_index("saved").unwrap();
        registry.save(&prefix).unwrap();

        registry.find_index("unsaved").unwrap();
        registry.load(&prefix).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find_file(1), None);
    }

    #[test]
    fn test_resumed_registry_never_reuses_indices() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");

        let mut first = AccessionRegistry::new(0);
        first.find_index("a").unwrap();
        first.find_index("b").unwrap();
        first.save(&prefix).unwrap();

        let mut resumed = AccessionRegistry::from_snapshot(&prefix, 0).unwrap();
        assert_eq!(resumed.find_index("c").unwrap(), 2);
        assert_eq!(resumed.find_index("a").unwrap(), 0);
    }

    #[test]
    fn test_load_rejects_mismatched_pair() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");
        let (forward_path, reverse_path) = AccessionRegistry::snapshot_paths(&prefix);
        std::fs::write(&forward_path, r#"{"a":0,"b":1}"#).unwrap();
        std::fs::write(&reverse_path, r#"{"0":"a","1":"c"}"#).unwrap();

        let err = AccessionRegistry::from_snapshot(&prefix, 0).unwrap_err();
        assert!(matches!(err, RegistryError::Inconsistent(_)));
    }

    #[test]
    fn test_load_rejects_partial_write() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");
        let (forward_path, reverse_path) = AccessionRegistry::snapshot_paths(&prefix);
        std::fs::write(&forward_path, r#"{"a":0,"b":1}"#).unwrap();
        std::fs::write(&reverse_path, r#"{"0":"a"}"#).unwrap();

        let mut registry = AccessionRegistry::new(0);
        registry.find_index("keep").unwrap();
        assert!(registry.load(&prefix).is_err());
        // failed load leaves state untouched
        assert_eq!(registry.find_file(0), Some("keep"));
    }

    #[test]
    fn test_load_missing_snapshot_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AccessionRegistry::from_snapshot(&dir.path().join("nope"), 0).unwrap_err();
        assert!(matches!(err, RegistryError::Io(_)));
        assert!(!AccessionRegistry::snapshot_exists(&dir.path().join("nope")));
    }

    #[test]
    fn test_missing_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");

        let registry = AccessionRegistry::from_snapshot_or_new(&prefix, 40).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.next_index(), 40);

        // half a snapshot is not mistaken for none
        let (forward_path, _) = AccessionRegistry::snapshot_paths(&prefix);
        std::fs::write(&forward_path, r#"{"a":0}"#).unwrap();
        assert!(matches!(
            AccessionRegistry::from_snapshot_or_new(&prefix, 40),
            Err(RegistryError::Io(_))
        ));
    }

    #[test]
    fn test_set_maps_transfers_ownership() {
        let mut source = AccessionRegistry::new(0);
        source.find_index("a").unwrap();
        source.find_index("b").unwrap();
        let (forward, reverse) = source.into_maps();

        let mut target = AccessionRegistry::new(0);
        target.set_maps(forward, reverse).unwrap();
        assert_eq!(target.find_file(1), Some("b"));
        assert_eq!(target.find_index("c").unwrap(), 2);

        let (forward, reverse) = target.get_maps();
        assert_eq!(forward.len(), 3);
        assert_eq!(reverse.get(&2).map(String::as_str), Some("c"));
    }

    #[test]
    fn test_set_maps_rejects_non_inverse() {
        let mut registry = AccessionRegistry::new(0);
        let forward = ForwardMap::from([("a".to_string(), 0)]);
        let reverse = ReverseMap::from([(1, "a".to_string())]);
        assert!(matches!(
            registry.set_maps(forward, reverse),
            Err(RegistryError::Inconsistent(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_index_reports_exhaustion() {
        let mut registry = AccessionRegistry::new(SourceIndex::MAX - 1);
        assert_eq!(registry.find_index("a").unwrap(), SourceIndex::MAX - 1);
        assert!(matches!(
            registry.find_index("b"),
            Err(RegistryError::Exhausted(i)) if i == SourceIndex::MAX
        ));
        // known accessions still resolve
        assert_eq!(registry.find_index("a").unwrap(), SourceIndex::MAX - 1);
        assert_eq!(registry.len(), 1);

        let mut at_top = AccessionRegistry::new(SourceIndex::MAX);
        assert!(at_top.find_index("a").is_err());
        assert!(at_top.is_empty());
    }

    #[test]
    fn test_load_rejects_index_at_domain_top() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("db");
        let (forward_path, reverse_path) = AccessionRegistry::snapshot_paths(&prefix);
        std::fs::write(&forward_path, r#"{"a":2147483647}"#).unwrap();
        std::fs::write(&reverse_path, r#"{"2147483647":"a"}"#).unwrap();

        let err = AccessionRegistry::from_snapshot(&prefix, 0).unwrap_err();
        assert!(matches!(err, RegistryError::Inconsistent(_)));

        std::fs::write(&forward_path, r#"{"a":2147483646}"#).unwrap();
        std::fs::write(&reverse_path, r#"{"2147483646":"a"}"#).unwrap();
        let registry = AccessionRegistry::from_snapshot(&prefix, 0).unwrap();
        assert_eq!(registry.next_index(), SourceIndex::MAX);
    }
}
