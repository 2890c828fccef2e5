//! Segment Manager
//!
//! Discovers, names and creates segment files.
//!
//! ## Responsibilities
//! - Discover existing segments on startup
//! - Pick the active segment (highest id)
//! - Create a fresh segment 0 in an empty directory
//! - Refuse to start next to malformed segment names

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;

use crate::error::{Result, WalError};

/// Filename prefix shared by every segment
pub const SEGMENT_PREFIX: &str = "wal-segment-";

/// Manages the segment files of one WAL directory
///
/// Only one segment is active today; `segment_ids` already returns the full
/// set so a rotation/retention policy can be layered on later.
#[derive(Debug, Clone)]
pub struct SegmentManager {
    /// Directory holding the segment files
    dir: PathBuf,
}

impl SegmentManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Return the id of the active segment, creating segment 0 if the
    /// directory holds none
    pub fn current_segment(&self) -> Result<u64> {
        let ids = self.segment_ids()?;

        match ids.last() {
            Some(&id) => {
                tracing::debug!(segment_id = id, segments = ids.len(), "found active segment");
                Ok(id)
            }
            None => {
                // Handle is dropped right away; the engine reopens for append
                self.create_segment(0)?;
                tracing::info!(dir = %self.dir.display(), "created initial segment 0");
                Ok(0)
            }
        }
    }

    /// Create (or truncate) the segment file for `id`
    pub fn create_segment(&self, id: u64) -> Result<File> {
        let path = self.segment_path(id);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        Ok(file)
    }

    /// All segment ids in the directory, ascending
    ///
    /// Fails with `InvalidSegmentName` if a file carries the segment prefix
    /// but no valid id.
    pub fn segment_ids(&self) -> Result<Vec<u64>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let name = entry.file_name();
            if let Some(id) = Self::parse_segment_id(&name.to_string_lossy())? {
                ids.push(id);
            }
        }

        ids.sort_unstable();
        Ok(ids)
    }

    /// Generate the file path for a segment with given ID
    pub fn segment_path(&self, id: u64) -> PathBuf {
        self.dir.join(segment_file_name(id))
    }

    /// Parse a segment ID from a filename
    /// "wal-segment-42" → Ok(Some(42)), "notes.txt" → Ok(None),
    /// "wal-segment-x" → Err(InvalidSegmentName)
    pub fn parse_segment_id(name: &str) -> Result<Option<u64>> {
        let Some(suffix) = name.strip_prefix(SEGMENT_PREFIX) else {
            return Ok(None);
        };

        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(WalError::InvalidSegmentName(name.to_string()));
        }

        suffix
            .parse::<u64>()
            .map(Some)
            .map_err(|_| WalError::InvalidSegmentName(name.to_string()))
    }
}

/// "wal-segment-<id>"
pub fn segment_file_name(id: u64) -> String {
    format!("{}{}", SEGMENT_PREFIX, id)
}
