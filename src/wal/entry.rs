//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.
//!
//! The entry checksum covers the payload. A second CRC32 trails every body
//! and covers all of it, so damage to the lsn or flag bytes of the final
//! record is caught even with no later record to compare against.

use bincode::Options;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalError};

/// Length prefix size: signed 32-bit little-endian body length
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Trailing CRC32 (LE) over the bincode body, counted in the length prefix
pub const RECORD_CRC_SIZE: usize = 4;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - strictly increasing, assigned by the engine
    pub lsn: u64,

    /// Caller-supplied bytes, opaque to the log
    pub payload: Vec<u8>,

    /// CRC32 (IEEE) of `payload`
    pub checksum: u32,

    /// Set only for entries written through `append_checkpoint`
    pub is_checkpoint: bool,
}

/// Body codec: fixed-width little-endian integers, no trailing garbage
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

impl WalEntry {
    /// Create a regular entry, computing its checksum
    pub fn new(lsn: u64, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        Self {
            lsn,
            checksum: Self::compute_checksum(&payload),
            payload,
            is_checkpoint: false,
        }
    }

    /// Create a checkpoint entry
    pub fn checkpoint(lsn: u64, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            is_checkpoint: true,
            ..Self::new(lsn, payload)
        }
    }

    /// CRC32 over a payload
    pub fn compute_checksum(payload: &[u8]) -> u32 {
        crc32fast::hash(payload)
    }

    /// True when the stored checksum matches the payload
    pub fn verify_checksum(&self) -> bool {
        self.checksum == Self::compute_checksum(&self.payload)
    }

    /// Encode into a self-delimiting frame: `[len: i32 LE][body][crc: u32 LE]`
    ///
    /// `len` counts the body and its trailing CRC.
    pub fn encode(&self) -> Result<Bytes> {
        let body = codec()
            .serialize(self)
            .map_err(|e| WalError::MalformedRecord(format!("failed to serialize entry: {}", e)))?;

        let record_len = body.len() + RECORD_CRC_SIZE;
        let len = i32::try_from(record_len).map_err(|_| {
            WalError::MalformedRecord(format!("entry body too large: {} bytes", record_len))
        })?;

        let mut frame = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + record_len);
        frame.put_i32_le(len);
        frame.extend_from_slice(&body);
        frame.put_u32_le(crc32fast::hash(&body));
        Ok(frame.freeze())
    }

    /// Decode a complete frame (prefix + body) and verify the checksum
    pub fn decode(frame: &[u8]) -> Result<Self> {
        if frame.len() < LENGTH_PREFIX_SIZE {
            return Err(WalError::MalformedRecord(format!(
                "frame too short: expected at least {} bytes, got {}",
                LENGTH_PREFIX_SIZE,
                frame.len()
            )));
        }

        let body_len = Self::parse_length_prefix(&frame[..LENGTH_PREFIX_SIZE])?;
        let body = &frame[LENGTH_PREFIX_SIZE..];
        if body.len() != body_len {
            return Err(WalError::MalformedRecord(format!(
                "length prefix declares {} bytes, frame carries {}",
                body_len,
                body.len()
            )));
        }

        Self::decode_body(body)
    }

    /// Decode the bytes after the prefix (body + record CRC) and verify
    /// both checksums
    ///
    /// The payload checksum is checked first so payload damage reports
    /// `ChecksumMismatch`; any other altered body byte fails the record CRC
    /// as `MalformedRecord`.
    pub fn decode_body(record: &[u8]) -> Result<Self> {
        if record.len() < RECORD_CRC_SIZE {
            return Err(WalError::MalformedRecord(format!(
                "record too short: {} bytes",
                record.len()
            )));
        }
        let (body, mut crc_bytes) = record.split_at(record.len() - RECORD_CRC_SIZE);
        let stored_crc = crc_bytes.get_u32_le();

        let entry: WalEntry = codec()
            .deserialize(body)
            .map_err(|e| WalError::MalformedRecord(format!("failed to parse entry body: {}", e)))?;

        let computed = Self::compute_checksum(&entry.payload);
        if computed != entry.checksum {
            return Err(WalError::ChecksumMismatch {
                lsn: entry.lsn,
                stored: entry.checksum,
                computed,
            });
        }

        let computed_crc = crc32fast::hash(body);
        if computed_crc != stored_crc {
            return Err(WalError::MalformedRecord(format!(
                "record checksum mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, computed_crc
            )));
        }

        Ok(entry)
    }

    /// Read a length prefix. Negative lengths are malformed.
    pub fn parse_length_prefix(mut prefix: &[u8]) -> Result<usize> {
        if prefix.len() < LENGTH_PREFIX_SIZE {
            return Err(WalError::MalformedRecord(format!(
                "length prefix too short: {} bytes",
                prefix.len()
            )));
        }
        let len = prefix.get_i32_le();
        usize::try_from(len)
            .map_err(|_| WalError::MalformedRecord(format!("negative record length: {}", len)))
    }

    /// Size of the encoded frame in bytes
    pub fn serialized_size(&self) -> Result<usize> {
        let body = codec()
            .serialized_size(self)
            .map_err(|e| WalError::MalformedRecord(format!("failed to size entry: {}", e)))?;
        Ok(LENGTH_PREFIX_SIZE + body as usize + RECORD_CRC_SIZE)
    }
}
