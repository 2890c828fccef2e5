//! WAL Writer
//!
//! Handles appending framed entries to the active segment.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::WalEntry;

/// Buffered append handle over one segment file
pub struct WalWriter {
    /// Path of the segment being written
    path: PathBuf,

    /// Buffered writer; bytes reach the OS only on flush/sync
    writer: BufWriter<File>,

    /// Whether sync forces data to stable storage
    fsync: bool,

    /// Segment length including bytes still buffered
    len: u64,

    /// Bytes written since the last successful sync
    dirty: bool,
}

impl WalWriter {
    /// Open a segment for appending, positioned at end-of-file
    pub fn open(path: &Path, fsync: bool) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let len = file.seek(SeekFrom::End(0))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            fsync,
            len,
            dirty: false,
        })
    }

    /// Encode an entry into the buffer. Does not flush.
    ///
    /// Returns the number of bytes appended.
    pub fn append(&mut self, entry: &WalEntry) -> Result<usize> {
        let frame = entry.encode()?;
        self.dirty = true;
        self.writer.write_all(&frame)?;
        self.len += frame.len() as u64;
        Ok(frame.len())
    }

    /// Flush the buffer to the OS and, if enabled, fsync
    ///
    /// A no-op when nothing was written since the last successful sync.
    pub fn sync(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        self.writer.flush()?;
        if self.fsync {
            self.writer.get_ref().sync_all()?;
        }

        self.dirty = false;
        Ok(())
    }

    /// Segment length in bytes, buffered bytes included
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes sitting in the buffer, not yet handed to the OS
    pub fn buffered(&self) -> usize {
        self.writer.buffer().len()
    }

    /// Whether sync forces data to stable storage
    pub fn fsync_enabled(&self) -> bool {
        self.fsync
    }

    /// Get the segment path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
