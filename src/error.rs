//! Error types for seqwal
//!
//! Provides a unified error type for all WAL operations.

use thiserror::Error;

/// Result type alias using WalError
pub type Result<T> = std::result::Result<T, WalError>;

/// Unified error type for WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Checksum mismatch for entry lsn={lsn}: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { lsn: u64, stored: u32, computed: u32 },

    /// Raised by strict reads; `source` is the record-level failure
    #[error("Corrupt log at offset {offset}: {source}")]
    CorruptLog {
        offset: u64,
        source: Box<WalError>,
    },

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Invalid segment file name: {0}")]
    InvalidSegmentName(String),
}

impl WalError {
    /// Wrap a record-level failure found at `offset` during a strict read
    pub fn corrupt(offset: u64, source: WalError) -> Self {
        WalError::CorruptLog {
            offset,
            source: Box::new(source),
        }
    }

    /// True for errors that mean on-disk data cannot be trusted
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            WalError::MalformedRecord(_)
                | WalError::ChecksumMismatch { .. }
                | WalError::CorruptLog { .. }
        )
    }
}
