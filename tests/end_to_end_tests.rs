//! End-to-end ingestion and query tests against the file-backed store.

use std::path::{Path, PathBuf};

use region_index::core::normalize_chromosome;
use region_index::ingest::{ingest_records, load_local};
use region_index::parsing::bed::BedReader;
use region_index::query::{query_by_accession, query_files, RegionHit};
use region_index::registry::AccessionRegistry;
use region_index::store::{CoordinateReader, FileStore, StoreError, StoreSchema};
use region_index::Chromosome;

fn chr(label: &str) -> Chromosome {
    normalize_chromosome(label).unwrap()
}

fn new_store(dir: &Path, gap: i32) -> PathBuf {
    let path = dir.join("regions.store");
    FileStore::create(&path, &StoreSchema::new(gap).unwrap()).unwrap();
    path
}

/// Ingest (chrom=1, 5000, 7200) as "acc1" with GAP=1000 and base 0
#[test]
fn test_worked_example() {
    let dir = tempfile::tempdir().unwrap();
    let path = new_store(dir.path(), 1000);
    let mut registry = AccessionRegistry::new(0);

    {
        let mut writer = FileStore::open_write(&path).unwrap();
        let summary = ingest_records(
            &mut writer,
            &mut registry,
            "acc1",
            BedReader::new(&b"chr1\t5000\t7200\n"[..]),
        )
        .unwrap();
        assert_eq!(summary.index, 0);
        assert_eq!(summary.cells, 3);
    }

    let store = FileStore::open_read(&path).unwrap();
    assert_eq!(
        store.read_range(chr("1"), 0..=10_000).unwrap().len(),
        3,
        "coordinates 5000, 6000, 7000"
    );
    for position in [5000, 6000, 7000] {
        assert_eq!(store.read_range(chr("1"), position..=position).unwrap().len(), 1);
    }

    let hits = query_by_accession(&store, &registry, chr("1"), 6500, 9000, 25).unwrap();
    assert_eq!(
        hits,
        vec![RegionHit {
            accession: Some("acc1".to_string()),
            start: 5000,
            end: 7200,
        }]
    );

    let none = query_by_accession(&store, &registry, chr("1"), 0, 100, 25).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_resumed_run_keeps_indices_stable() {
    let dir = tempfile::tempdir().unwrap();
    let path = new_store(dir.path(), 1000);
    let first = dir.path().join("ENCFF001.bed.gz");
    let second = dir.path().join("ENCFF002.bed.gz");
    write_gz(&first, "chr2\t100\t300\n");
    write_gz(&second, "chr2\t200\t400\nchrUn_gl000220\t1\t2\n");

    // first run
    let mut registry = AccessionRegistry::new(0);
    {
        let mut writer = FileStore::open_write(&path).unwrap();
        load_local(&mut writer, &mut registry, &[first]).unwrap();
    }
    registry.save(&path).unwrap();

    // resumed run in a fresh registry instance
    let mut registry = AccessionRegistry::from_snapshot(&path, 0).unwrap();
    {
        let mut writer = FileStore::open_write(&path).unwrap();
        let summary = load_local(&mut writer, &mut registry, &[second]).unwrap();
        assert_eq!(summary.sources[0].index, 1);
        assert_eq!(summary.sources[0].skipped, 1);
    }
    registry.save(&path).unwrap();

    let registry = AccessionRegistry::from_snapshot(&path, 0).unwrap();
    let store = FileStore::open_read(&path).unwrap();
    let files = query_files(&store, &registry, chr("chr2"), 250, 260, 25).unwrap();
    assert_eq!(files, vec!["ENCFF001".to_string(), "ENCFF002".to_string()]);
}

#[test]
fn test_consolidated_store_answers_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = new_store(dir.path(), 100);
    let mut registry = AccessionRegistry::new(0);
    {
        let mut writer = FileStore::open_write(&path).unwrap();
        for (accession, bed) in [
            ("a", "chrX\t0\t1000\n"),
            ("b", "chrX\t450\t460\nchrX\t900\t1200\n"),
            ("c", "chrY\t450\t460\n"),
        ] {
            ingest_records(&mut writer, &mut registry, accession, BedReader::new(bed.as_bytes()))
                .unwrap();
        }
    }

    let before = {
        let store = FileStore::open_read(&path).unwrap();
        query_by_accession(&store, &registry, chr("X"), 400, 950, 25).unwrap()
    };
    assert_eq!(before.len(), 3);

    FileStore::consolidate(&path).unwrap();
    let store = FileStore::open_read(&path).unwrap();
    let after = query_by_accession(&store, &registry, chr("X"), 400, 950, 25).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_reader_blocked_while_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = new_store(dir.path(), 1000);
    let writer = FileStore::open_write(&path).unwrap();
    assert!(matches!(
        FileStore::open_read(&path),
        Err(StoreError::Locked(_))
    ));
    drop(writer);
    assert!(FileStore::open_read(&path).is_ok());
}

fn write_gz(path: &Path, text: &str) {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(std::fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
}
