use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{validate_write, CoordinateReader, CoordinateWriter, StoreError};
use crate::core::types::{Chromosome, RegionRecord, MAX_CHROMOSOME, MAX_POSITION, MIN_CHROMOSOME};

/// Store format version for compatibility checking
pub const STORE_VERSION: &str = "1.0.0";

const SCHEMA_FILE: &str = "schema.json";
const LOCK_FILE: &str = ".write.lock";
const FRAGMENT_PREFIX: &str = "frag_";
const FRAGMENT_SUFFIX: &str = ".bin";

/// Store-level metadata written once at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSchema {
    pub version: String,
    pub created_at: String,
    pub gap: i32,
    pub chromosome_domain: (u8, u8),
    pub position_domain: (i32, i32),
}

impl StoreSchema {
    /// Schema for a human-genome store with quantization step `gap`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidGap` unless `gap` is positive.
    pub fn new(gap: i32) -> Result<Self, StoreError> {
        if gap <= 0 {
            return Err(StoreError::InvalidGap(gap));
        }
        Ok(Self {
            version: STORE_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            gap,
            chromosome_domain: (MIN_CHROMOSOME, MAX_CHROMOSOME),
            position_domain: (0, MAX_POSITION),
        })
    }
}

/// One stored cell as laid out inside a fragment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Cell {
    chromosome: Chromosome,
    position: i32,
    record: RegionRecord,
}

/// Immutable unit of written data; one per `write` call
#[derive(Debug, Default, Serialize, Deserialize)]
struct Fragment {
    cells: Vec<Cell>,
}

/// Directory-backed sparse store.
///
/// ```text
/// regions.store/
///   schema.json
///   frag_00000000000000000001.bin
///   frag_00000000000000000002.bin
///   .write.lock              (only while a writer is open)
/// ```
pub struct FileStore;

impl FileStore {
    /// Create an empty store at `path`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if `path` already holds a store.
    pub fn create(path: &Path, schema: &StoreSchema) -> Result<(), StoreError> {
        if schema.gap <= 0 {
            return Err(StoreError::InvalidGap(schema.gap));
        }
        let schema_path = path.join(SCHEMA_FILE);
        if schema_path.exists() {
            return Err(StoreError::AlreadyExists(path.to_path_buf()));
        }
        std::fs::create_dir_all(path)?;
        let mut writer = BufWriter::new(File::create(&schema_path)?);
        serde_json::to_writer_pretty(&mut writer, schema)?;
        writer.flush()?;
        info!("Created store at {} (gap {})", path.display(), schema.gap);
        Ok(())
    }

    /// Read the schema of an existing store
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if `path` holds no store.
    pub fn schema(path: &Path) -> Result<StoreSchema, StoreError> {
        let schema_path = path.join(SCHEMA_FILE);
        let file = match File::open(&schema_path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let schema: StoreSchema = serde_json::from_reader(BufReader::new(file))?;

        // Version check (warn but don't fail)
        if schema.version != STORE_VERSION {
            warn!(
                "Store version mismatch (expected {}, found {})",
                STORE_VERSION, schema.version
            );
        }
        if schema.gap <= 0 {
            return Err(StoreError::InvalidGap(schema.gap));
        }
        Ok(schema)
    }

    /// Open a snapshot of the store for reading.
    ///
    /// All fragments present at open time are loaded; later writes are not
    /// visible through this handle.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` while a writer holds the store, or a
    /// backend error if a fragment cannot be decoded.
    pub fn open_read(path: &Path) -> Result<ReadHandle, StoreError> {
        let schema = Self::schema(path)?;
        if path.join(LOCK_FILE).exists() {
            return Err(StoreError::Locked(path.to_path_buf()));
        }

        let mut cells: BTreeMap<(Chromosome, i32), Vec<RegionRecord>> = BTreeMap::new();
        let fragments = list_fragments(path)?;
        for (_, fragment_path) in &fragments {
            for cell in read_fragment(fragment_path)?.cells {
                cells
                    .entry((cell.chromosome, cell.position))
                    .or_default()
                    .push(cell.record);
            }
        }
        debug!(
            "Opened {} for reading: {} fragments, {} distinct cells",
            path.display(),
            fragments.len(),
            cells.len()
        );

        Ok(ReadHandle { schema, cells })
    }

    /// Open the store for writing, taking its exclusive lock.
    ///
    /// The lock is released when the handle is dropped, on every exit path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if another writer holds the store.
    pub fn open_write(path: &Path) -> Result<WriteHandle, StoreError> {
        let schema = Self::schema(path)?;
        let lock_path = path.join(LOCK_FILE);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::Locked(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        }

        // From here on the guard owns the lock, so errors still release it
        let mut handle = WriteHandle {
            root: path.to_path_buf(),
            schema,
            lock_path,
            next_fragment: 0,
        };
        handle.next_fragment = list_fragments(path)?
            .last()
            .map_or(1, |(number, _)| number + 1);
        Ok(handle)
    }

    /// Merge all fragments into one and delete the originals.
    ///
    /// Returns the number of fragments that were merged.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if a writer holds the store.
    pub fn consolidate(path: &Path) -> Result<usize, StoreError> {
        let mut handle = Self::open_write(path)?;
        let fragments = list_fragments(path)?;
        if fragments.len() < 2 {
            return Ok(fragments.len());
        }

        let mut merged = Fragment::default();
        for (_, fragment_path) in &fragments {
            merged.cells.extend(read_fragment(fragment_path)?.cells);
        }
        // stable: equal keys keep their write order
        merged.cells.sort_by_key(|cell| (cell.chromosome, cell.position));
        handle.persist_fragment(&merged)?;

        for (_, fragment_path) in &fragments {
            std::fs::remove_file(fragment_path)?;
        }
        info!(
            "Consolidated {} fragments ({} cells) in {}",
            fragments.len(),
            merged.cells.len(),
            path.display()
        );
        Ok(fragments.len())
    }
}

/// Read-only snapshot of a [`FileStore`]
#[derive(Debug)]
pub struct ReadHandle {
    schema: StoreSchema,
    cells: BTreeMap<(Chromosome, i32), Vec<RegionRecord>>,
}

impl ReadHandle {
    #[must_use]
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    /// Number of stored cells, duplicates included
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

impl CoordinateReader for ReadHandle {
    fn gap(&self) -> i32 {
        self.schema.gap
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

/// Exclusive writer for a [`FileStore`]; releases the lock on drop
#[derive(Debug)]
pub struct WriteHandle {
    root: PathBuf,
    schema: StoreSchema,
    lock_path: PathBuf,
    next_fragment: u64,
}

impl WriteHandle {
    #[must_use]
    pub fn schema(&self) -> &StoreSchema {
        &self.schema
    }

    fn persist_fragment(&mut self, fragment: &Fragment) -> Result<PathBuf, StoreError> {
        let path = self.root.join(fragment_name(self.next_fragment));
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            bincode::serialize_into(&mut writer, fragment)?;
            writer.flush()?;
        }
        tmp.persist(&path)?;
        self.next_fragment += 1;
        debug!(
            "Wrote fragment {} ({} cells)",
            path.display(),
            fragment.cells.len()
        );
        Ok(path)
    }
}

impl CoordinateWriter for WriteHandle {
    fn gap(&self) -> i32 {
        self.schema.gap
    }

    fn write(
        &mut self,
        coords: &[(Chromosome, i32)],
        payloads: &[RegionRecord],
    ) -> Result<(), StoreError> {
        validate_write(coords, payloads, self.schema.position_domain.1)?;
        if coords.is_empty() {
            return Ok(());
        }

        let mut cells: Vec<Cell> = coords
            .iter()
            .zip(payloads)
            .map(|(&(chromosome, position), &record)| Cell {
                chromosome,
                position,
                record,
            })
            .collect();
        cells.sort_by_key(|cell| (cell.chromosome, cell.position));

        self.persist_fragment(&Fragment { cells })?;
        Ok(())
    }
}

impl Drop for WriteHandle {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.lock_path) {
            warn!(
                "Failed to release store lock {}: {}",
                self.lock_path.display(),
                e
            );
        }
    }
}

fn fragment_name(number: u64) -> String {
    format!("{FRAGMENT_PREFIX}{number:020}{FRAGMENT_SUFFIX}")
}

/// Fragment files in write order
fn list_fragments(root: &Path) -> Result<Vec<(u64, PathBuf)>, StoreError> {
    let mut fragments = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(number) = name
            .to_str()
            .and_then(|n| n.strip_prefix(FRAGMENT_PREFIX))
            .and_then(|n| n.strip_suffix(FRAGMENT_SUFFIX))
            .and_then(|n| n.parse::<u64>().ok())
        else {
            continue;
        };
        fragments.push((number, entry.path()));
    }
    fragments.sort_unstable_by_key(|(number, _)| *number);
    Ok(fragments)
}

fn read_fragment(path: &Path) -> Result<Fragment, StoreError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chr(n: u8) -> Chromosome {
        Chromosome::new(n).unwrap()
    }

    fn new_store(gap: i32) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.store");
        FileStore::create(&path, &StoreSchema::new(gap).unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_create_twice_fails() {
        let (_dir, path) = new_store(1000);
        let err = FileStore::create(&path, &StoreSchema::new(1000).unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(_)));
    }

    #[test]
    fn test_schema_rejects_bad_gap() {
        assert!(matches!(StoreSchema::new(0), Err(StoreError::InvalidGap(0))));
    }

    #[test]
    fn test_schema_round_trips_with_timestamp() {
        let (_dir, path) = new_store(250);
        let schema = FileStore::schema(&path).unwrap();
        assert_eq!(schema.gap, 250);
        assert_eq!(schema.version, STORE_VERSION);
        assert!(chrono::DateTime::parse_from_rfc3339(&schema.created_at).is_ok());
    }

    #[test]
    fn test_open_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileStore::open_read(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_write_then_read_range() {
        let (_dir, path) = new_store(1000);
        {
            let mut writer = FileStore::open_write(&path).unwrap();
            let record = RegionRecord::new(0, 5000, 7200);
            writer
                .write(
                    &[(chr(1), 5000), (chr(1), 6000), (chr(1), 7000)],
                    &[record, record, record],
                )
                .unwrap();
            writer
                .write(&[(chr(2), 6000)], &[RegionRecord::new(1, 6000, 6001)])
                .unwrap();
        }

        let reader = FileStore::open_read(&path).unwrap();
        assert_eq!(reader.gap(), 1000);
        assert_eq!(reader.cell_count(), 4);

        let hits = reader.read_range(chr(1), 5500..=6500).unwrap();
        assert_eq!(hits, vec![RegionRecord::new(0, 5000, 7200)]);

        let all = reader.read_range(chr(1), 0..=10_000).unwrap();
        assert_eq!(all.len(), 3);

        assert!(reader.read_range(chr(3), 0..=10_000).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_keys_are_kept_in_write_order() {
        let (_dir, path) = new_store(1000);
        {
            let mut writer = FileStore::open_write(&path).unwrap();
            writer
                .write(&[(chr(1), 100)], &[RegionRecord::new(0, 100, 150)])
                .unwrap();
            writer
                .write(&[(chr(1), 100)], &[RegionRecord::new(1, 100, 120)])
                .unwrap();
        }
        let reader = FileStore::open_read(&path).unwrap();
        let hits = reader.read_range(chr(1), 100..=100).unwrap();
        assert_eq!(
            hits,
            vec![RegionRecord::new(0, 100, 150), RegionRecord::new(1, 100, 120)]
        );
    }

    #[test]
    fn test_writer_lock_excludes_readers_and_writers() {
        let (_dir, path) = new_store(1000);
        let writer = FileStore::open_write(&path).unwrap();

        assert!(matches!(
            FileStore::open_read(&path),
            Err(StoreError::Locked(_))
        ));
        assert!(matches!(
            FileStore::open_write(&path),
            Err(StoreError::Locked(_))
        ));

        drop(writer);
        assert!(FileStore::open_read(&path).is_ok());
    }

    #[test]
    fn test_lock_released_after_failed_write() {
        let (_dir, path) = new_store(1000);
        {
            let mut writer = FileStore::open_write(&path).unwrap();
            let err = writer
                .write(&[(chr(1), -1)], &[RegionRecord::new(0, 0, 1)])
                .unwrap_err();
            assert!(matches!(err, StoreError::OutOfDomain { .. }));
        }
        assert!(FileStore::open_write(&path).is_ok());
    }

    #[test]
    fn test_length_mismatch() {
        let (_dir, path) = new_store(1000);
        let mut writer = FileStore::open_write(&path).unwrap();
        let err = writer.write(&[(chr(1), 1), (chr(1), 2)], &[]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::LengthMismatch {
                coords: 2,
                payloads: 0
            }
        ));
    }

    #[test]
    fn test_fragments_continue_numbering_across_writers() {
        let (_dir, path) = new_store(1000);
        for i in 0..3 {
            let mut writer = FileStore::open_write(&path).unwrap();
            writer
                .write(&[(chr(1), i)], &[RegionRecord::new(i, i, i + 1)])
                .unwrap();
        }
        assert_eq!(list_fragments(&path).unwrap().len(), 3);
    }

    #[test]
    fn test_consolidate_preserves_contents() {
        let (_dir, path) = new_store(1000);
        {
            let mut writer = FileStore::open_write(&path).unwrap();
            writer
                .write(&[(chr(2), 50)], &[RegionRecord::new(1, 50, 60)])
                .unwrap();
            writer
                .write(&[(chr(1), 10)], &[RegionRecord::new(0, 10, 20)])
                .unwrap();
            writer
                .write(&[(chr(2), 50)], &[RegionRecord::new(2, 50, 70)])
                .unwrap();
        }

        assert_eq!(FileStore::consolidate(&path).unwrap(), 3);
        assert_eq!(list_fragments(&path).unwrap().len(), 1);

        let reader = FileStore::open_read(&path).unwrap();
        assert_eq!(reader.cell_count(), 3);
        assert_eq!(
            reader.read_range(chr(2), 0..=100).unwrap(),
            vec![RegionRecord::new(1, 50, 60), RegionRecord::new(2, 50, 70)]
        );
    }

    #[test]
    fn test_empty_write_creates_no_fragment() {
        let (_dir, path) = new_store(1000);
        let mut writer = FileStore::open_write(&path).unwrap();
        writer.write(&[], &[]).unwrap();
        assert!(list_fragments(&path).unwrap().is_empty());
    }
}
