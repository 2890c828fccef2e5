//! Tests for the Segment Manager
//!
//! These tests verify:
//! - Fresh directories get segment 0
//! - The highest segment id is the active one
//! - Malformed segment names are fatal, unrelated files are ignored
//! - Segment creation truncates

use std::fs::{self, File};
use std::io::Write;

use seqwal::wal::{segment_file_name, SegmentManager, SEGMENT_PREFIX};
use seqwal::WalError;
use tempfile::TempDir;

// =============================================================================
// Discovery Tests
// =============================================================================

#[test]
fn test_empty_directory_creates_segment_zero() {
    let temp = TempDir::new().unwrap();
    let segments = SegmentManager::new(temp.path());

    let id = segments.current_segment().unwrap();

    assert_eq!(id, 0);
    let path = temp.path().join("wal-segment-0");
    assert!(path.exists());
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn test_existing_segment_is_not_recreated() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("wal-segment-0");
    fs::write(&path, b"existing").unwrap();

    let segments = SegmentManager::new(temp.path());
    assert_eq!(segments.current_segment().unwrap(), 0);

    assert_eq!(fs::read(&path).unwrap(), b"existing");
}

#[test]
fn test_highest_id_wins() {
    let temp = TempDir::new().unwrap();
    for id in [0, 3, 12, 7] {
        File::create(temp.path().join(segment_file_name(id))).unwrap();
    }

    let segments = SegmentManager::new(temp.path());

    assert_eq!(segments.current_segment().unwrap(), 12);
    assert_eq!(segments.segment_ids().unwrap(), vec![0, 3, 7, 12]);
}

#[test]
fn test_ids_compare_numerically() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("wal-segment-9")).unwrap();
    File::create(temp.path().join("wal-segment-10")).unwrap();

    let segments = SegmentManager::new(temp.path());
    assert_eq!(segments.current_segment().unwrap(), 10);
}

#[test]
fn test_unrelated_files_ignored() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("README")).unwrap();
    File::create(temp.path().join("segment-5")).unwrap();
    File::create(temp.path().join("wal-segment-2")).unwrap();
    fs::create_dir(temp.path().join("wal-segment-99")).unwrap(); // directories are skipped

    let segments = SegmentManager::new(temp.path());
    assert_eq!(segments.current_segment().unwrap(), 2);
}

// =============================================================================
// Invalid Name Tests
// =============================================================================

#[test]
fn test_non_numeric_suffix_is_fatal() {
    let temp = TempDir::new().unwrap();
    File::create(temp.path().join("wal-segment-0")).unwrap();
    File::create(temp.path().join("wal-segment-abc")).unwrap();

    let segments = SegmentManager::new(temp.path());
    let result = segments.current_segment();

    match result {
        Err(WalError::InvalidSegmentName(name)) => assert_eq!(name, "wal-segment-abc"),
        other => panic!("Expected InvalidSegmentName, got {:?}", other),
    }
}

#[test]
fn test_parse_segment_id() {
    assert_eq!(SegmentManager::parse_segment_id("wal-segment-42").unwrap(), Some(42));
    assert_eq!(SegmentManager::parse_segment_id("wal-segment-007").unwrap(), Some(7));
    assert_eq!(SegmentManager::parse_segment_id("notes.txt").unwrap(), None);

    for bad in ["wal-segment-", "wal-segment-1.bak", "wal-segment--1", "wal-segment-+3"] {
        assert!(
            matches!(
                SegmentManager::parse_segment_id(bad),
                Err(WalError::InvalidSegmentName(_))
            ),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn test_id_overflow_is_fatal() {
    let name = format!("{}{}", SEGMENT_PREFIX, "99999999999999999999999");
    assert!(matches!(
        SegmentManager::parse_segment_id(&name),
        Err(WalError::InvalidSegmentName(_))
    ));
}

// =============================================================================
// Creation Tests
// =============================================================================

#[test]
fn test_create_segment_truncates() {
    let temp = TempDir::new().unwrap();
    let segments = SegmentManager::new(temp.path());

    {
        let mut file = segments.create_segment(4).unwrap();
        file.write_all(b"old contents").unwrap();
    }
    segments.create_segment(4).unwrap();

    assert_eq!(fs::metadata(segments.segment_path(4)).unwrap().len(), 0);
}

#[test]
fn test_create_segment_in_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    let segments = SegmentManager::new(temp.path().join("does/not/exist"));

    assert!(matches!(segments.create_segment(0), Err(WalError::Io(_))));
}

#[test]
fn test_segment_path_naming() {
    let segments = SegmentManager::new("/var/lib/wal");
    assert_eq!(
        segments.segment_path(3),
        std::path::PathBuf::from("/var/lib/wal/wal-segment-3")
    );
}
