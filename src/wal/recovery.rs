//! WAL Recovery
//!
//! Finds the last durable entry of a segment after a crash.
//!
//! A crash mid-write leaves a truncated or half-written trailing frame. The
//! scan here stops at the first frame that fails to read or verify and reports
//! everything before it, so the log stays usable from its last good point.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, WalError};
use super::reader::WalReader;
use super::WalEntry;

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Default)]
pub struct RecoveryResult {
    /// Number of entries read before the scan stopped
    pub entries_recovered: u64,

    /// Last entry that decoded and verified
    pub last_entry: Option<WalEntry>,

    /// Offset just past the last good frame
    pub valid_bytes: u64,

    /// Segment length at scan time
    pub file_len: u64,

    /// Whether bytes past `valid_bytes` were unreadable
    pub was_truncated: bool,
}

impl RecoveryResult {
    /// LSN of the last good entry, 0 for an empty log
    pub fn last_lsn(&self) -> u64 {
        self.last_entry.as_ref().map_or(0, |e| e.lsn)
    }

    /// Bytes of damaged tail
    pub fn damaged_bytes(&self) -> u64 {
        self.file_len.saturating_sub(self.valid_bytes)
    }
}

impl WalRecovery {
    /// Scan a segment tolerantly
    ///
    /// Only a failure to open the file is returned as an error; a missing
    /// file is an empty log. Damage ends the scan and sets `was_truncated`.
    pub fn scan(path: &Path) -> Result<RecoveryResult> {
        let mut reader = match WalReader::open(path) {
            Ok(reader) => reader,
            Err(WalError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Ok(RecoveryResult::default());
            }
            Err(e) => return Err(e),
        };

        let mut result = RecoveryResult {
            file_len: reader.file_len(),
            ..RecoveryResult::default()
        };

        loop {
            match reader.read_frame() {
                Ok(Some(entry)) => {
                    result.entries_recovered += 1;
                    result.valid_bytes = reader.position();
                    result.last_entry = Some(entry);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        offset = reader.position(),
                        error = %e,
                        "recovery scan stopped at damaged frame"
                    );
                    result.was_truncated = true;
                    break;
                }
            }
        }

        Ok(result)
    }

    /// Last valid entry of a segment, if any
    pub fn scan_last_valid(path: &Path) -> Result<Option<WalEntry>> {
        Ok(Self::scan(path)?.last_entry)
    }

    /// Verify integrity of a segment without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        Self::scan(path)
    }

    /// Cut a segment down to `len` bytes and fsync it
    pub fn truncate(path: &Path, len: u64) -> Result<()> {
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(len)?;
        file.sync_all()?;
        Ok(())
    }
}
