//! WAL Reader
//!
//! Walks a segment file frame by frame from offset 0.
//!
//! `next_entry` and `entries` are strict: any truncated, malformed or
//! checksum-failing record is a `CorruptLog` error. Startup recovery uses the
//! same walk through `read_frame` but stops quietly at the first bad frame.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::Path;

use crate::error::{Result, WalError};
use super::entry::LENGTH_PREFIX_SIZE;
use super::WalEntry;

/// Reads entries from a segment file
pub struct WalReader {
    /// Buffered file handle
    reader: BufReader<File>,

    /// Offset of the next frame
    position: u64,

    /// File length at open time; frames may not extend past it
    file_len: u64,

    /// LSN of the last entry returned by the strict path
    last_lsn: Option<u64>,
}

impl WalReader {
    /// Open a segment file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
            last_lsn: None,
        })
    }

    /// Read the next entry, failing on any damage
    ///
    /// Returns `Ok(None)` at a clean end-of-file between frames.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        let offset = self.position;

        let entry = match self.read_frame() {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(None),
            Err(e) => return Err(WalError::corrupt(offset, e)),
        };

        if let Some(prev) = self.last_lsn {
            if entry.lsn <= prev {
                return Err(WalError::corrupt(
                    offset,
                    WalError::MalformedRecord(format!(
                        "sequence number {} does not follow {}",
                        entry.lsn, prev
                    )),
                ));
            }
        }
        self.last_lsn = Some(entry.lsn);

        Ok(Some(entry))
    }

    /// Iterate over all entries, strictly
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Read every entry, failing on the first damaged record
    pub fn read_all_strict(path: &Path) -> Result<Vec<WalEntry>> {
        Self::open(path)?.entries().collect()
    }

    /// Offset of the next frame (end of the last frame read)
    pub fn position(&self) -> u64 {
        self.position
    }

    /// File length at open time
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Read one frame without ordering checks
    ///
    /// - `Ok(None)`: clean EOF, zero bytes of a new prefix were available
    /// - `Err(Io(UnexpectedEof))`: truncated prefix or body
    /// - `Err(MalformedRecord | ChecksumMismatch)`: bad body
    ///
    /// `position` only advances past frames that decoded successfully.
    pub(crate) fn read_frame(&mut self) -> Result<Option<WalEntry>> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        let filled = read_up_to(&mut self.reader, &mut prefix)?;

        if filled == 0 {
            return Ok(None);
        }
        if filled < LENGTH_PREFIX_SIZE {
            return Err(truncated(format!(
                "length prefix cut short: {} of {} bytes",
                filled, LENGTH_PREFIX_SIZE
            )));
        }

        let body_len = WalEntry::parse_length_prefix(&prefix)?;

        // Check against the file before allocating a garbage length
        let body_start = self.position + LENGTH_PREFIX_SIZE as u64;
        let remaining = self.file_len.saturating_sub(body_start);
        if body_len as u64 > remaining {
            return Err(truncated(format!(
                "record declares {} bytes, only {} remain",
                body_len, remaining
            )));
        }

        let mut body = vec![0u8; body_len];
        self.reader.read_exact(&mut body)?;

        let entry = WalEntry::decode_body(&body)?;
        self.position = body_start + body_len as u64;
        Ok(Some(entry))
    }
}

/// Iterator over WAL entries; stops after the first error
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Fill `buf` as far as the reader allows; returns bytes read
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn truncated(msg: String) -> WalError {
    WalError::Io(io::Error::new(ErrorKind::UnexpectedEof, msg))
}
