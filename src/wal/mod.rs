//! Write-Ahead Log (WAL) Module
//!
//! Building blocks of the log engine.
//!
//! ## Responsibilities
//! - Frame entries with a length prefix and CRC32 checksum
//! - Discover and create segment files
//! - Buffer appends to the active segment
//! - Scan segments strictly (reads) or tolerantly (crash recovery)
//! - Run the periodic background sync
//!
//! ## File Format
//! ```text
//! wal-segment-<id>: frames written back to back
//! ┌─────────┬─────────┬────────────┬─────────┬─────────┬──────────┬───────────┐
//! │ Len (4) │ LSN (8) │ PayLen (8) │ Payload │ CRC (4) │ Ckpt (1) │ RecCRC(4) │
//! └─────────┴─────────┴────────────┴─────────┴─────────┴──────────┴───────────┘
//!   i32 LE   └────────────── bincode body ──────────────────────┘   u32 LE
//!            └──────────────────────── Len bytes ────────────────────────────┘
//! ```
//! No header, footer or index. CRC covers the payload, RecCRC the whole body.

mod entry;
mod reader;
mod recovery;
mod segment;
pub(crate) mod sync;
mod writer;

pub use entry::{WalEntry, LENGTH_PREFIX_SIZE, RECORD_CRC_SIZE};
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
pub use segment::{segment_file_name, SegmentManager, SEGMENT_PREFIX};
pub use writer::WalWriter;
