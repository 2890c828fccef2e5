//! Tests for WAL Recovery (tolerant scan)
//!
//! These tests verify:
//! - Recovery from a clean segment
//! - Recovery from an empty or missing segment
//! - Recovery with partial writes (truncated tail)
//! - Recovery with corrupted entries (CRC mismatch)
//! - Tail truncation

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use seqwal::wal::{WalEntry, WalReader, WalRecovery, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_segment() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("wal-segment-0");
    (temp_dir, path)
}

/// Write entries using WalWriter (produces a well-formed segment)
fn write_entries_via_writer(path: &PathBuf, count: u64) {
    let mut writer = WalWriter::open(path, false).unwrap();
    for lsn in 1..=count {
        writer
            .append(&WalEntry::new(lsn, format!("value{}", lsn).into_bytes()))
            .unwrap();
    }
    writer.sync().unwrap();
}

/// Write raw bytes directly to a file (for crafting corruption)
fn write_raw(path: &PathBuf, chunks: &[&[u8]]) {
    let mut file = File::create(path).unwrap();
    for chunk in chunks {
        file.write_all(chunk).unwrap();
    }
    file.sync_all().unwrap();
}

fn frame(lsn: u64, payload: &[u8]) -> Vec<u8> {
    WalEntry::new(lsn, payload.to_vec()).encode().unwrap().to_vec()
}

// =============================================================================
// Clean Segment Tests
// =============================================================================

#[test]
fn test_scan_missing_file() {
    let (_temp, path) = setup_temp_segment();

    let result = WalRecovery::scan(&path).unwrap();

    assert!(result.last_entry.is_none());
    assert_eq!(result.last_lsn(), 0);
    assert!(!result.was_truncated);
}

#[test]
fn test_scan_empty_file() {
    let (_temp, path) = setup_temp_segment();
    File::create(&path).unwrap();

    let result = WalRecovery::scan(&path).unwrap();

    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn(), 0);
    assert_eq!(result.valid_bytes, 0);
    assert!(!result.was_truncated);
    assert!(WalRecovery::scan_last_valid(&path).unwrap().is_none());
}

#[test]
fn test_scan_multiple_entries() {
    let (_temp, path) = setup_temp_segment();
    write_entries_via_writer(&path, 10);

    let result = WalRecovery::scan(&path).unwrap();

    assert_eq!(result.entries_recovered, 10);
    assert_eq!(result.last_lsn(), 10);
    assert_eq!(result.valid_bytes, result.file_len);
    assert_eq!(result.damaged_bytes(), 0);
    assert!(!result.was_truncated);

    let last = WalRecovery::scan_last_valid(&path).unwrap().unwrap();
    assert_eq!(last.payload, b"value10");
}

// =============================================================================
// Partial Write Tests
// =============================================================================

#[test]
fn test_partial_prefix_at_tail() {
    let (_temp, path) = setup_temp_segment();
    let good = frame(1, b"k");
    write_raw(&path, &[&good, &[0u8; 2]]);

    let result = WalRecovery::scan(&path).unwrap();

    assert_eq!(result.entries_recovered, 1);
    assert_eq!(result.last_lsn(), 1);
    assert_eq!(result.valid_bytes, good.len() as u64);
    assert_eq!(result.damaged_bytes(), 2);
    assert!(result.was_truncated);
}

#[test]
fn test_partial_body_at_tail() {
    let (_temp, path) = setup_temp_segment();
    let first = frame(1, b"one");
    let second = frame(2, b"two");
    let third = frame(3, b"three");
    write_raw(&path, &[&first, &second, &third[..third.len() - 4]]);

    let result = WalRecovery::scan(&path).unwrap();

    assert_eq!(result.entries_recovered, 2);
    assert_eq!(result.last_lsn(), 2);
    assert_eq!(result.valid_bytes, (first.len() + second.len()) as u64);
    assert!(result.was_truncated);
}

#[test]
fn test_prefix_only_first_frame() {
    let (_temp, path) = setup_temp_segment();
    write_raw(&path, &[&100i32.to_le_bytes()]);

    let result = WalRecovery::scan(&path).unwrap();

    assert!(result.last_entry.is_none());
    assert!(result.was_truncated);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_corrupted_entry_stops_scan() {
    let (_temp, path) = setup_temp_segment();
    let good = frame(1, b"v1");
    let mut bad = frame(2, b"v2");
    bad[20] ^= 0xFF; // payload byte
    let after = frame(3, b"v3");
    write_raw(&path, &[&good, &bad, &after]);

    let result = WalRecovery::scan(&path).unwrap();

    // Entry 3 is well-formed but sits behind the damage
    assert_eq!(result.entries_recovered, 1);
    assert_eq!(result.last_lsn(), 1);
    assert!(result.was_truncated);
}

#[test]
fn test_corruption_at_first_entry() {
    let (_temp, path) = setup_temp_segment();
    let mut bad = frame(1, b"v");
    bad[20] ^= 0xFF;
    write_raw(&path, &[&bad]);

    let result = WalRecovery::scan(&path).unwrap();

    assert_eq!(result.entries_recovered, 0);
    assert_eq!(result.last_lsn(), 0);
    assert_eq!(result.valid_bytes, 0);
    assert!(result.was_truncated);
}

// =============================================================================
// Verify + Truncate Tests
// =============================================================================

#[test]
fn test_verify_matches_scan() {
    let (_temp, path) = setup_temp_segment();
    write_entries_via_writer(&path, 20);

    let scanned = WalRecovery::scan(&path).unwrap();
    let verified = WalRecovery::verify(&path).unwrap();

    assert_eq!(scanned.entries_recovered, verified.entries_recovered);
    assert_eq!(scanned.last_lsn(), verified.last_lsn());
    assert_eq!(scanned.valid_bytes, verified.valid_bytes);
    assert_eq!(scanned.was_truncated, verified.was_truncated);
}

#[test]
fn test_truncate_repairs_tail() {
    let (_temp, path) = setup_temp_segment();
    let first = frame(1, b"a");
    let second = frame(2, b"b");
    write_raw(&path, &[&first, &second, &[9u8; 7]]);

    let result = WalRecovery::scan(&path).unwrap();
    WalRecovery::truncate(&path, result.valid_bytes).unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), result.valid_bytes);
    let entries = WalReader::read_all_strict(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert!(!WalRecovery::scan(&path).unwrap().was_truncated);
}
