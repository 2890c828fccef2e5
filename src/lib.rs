//! # seqwal
//!
//! A single-node, append-only write-ahead log with:
//! - Length-prefixed, CRC32-checksummed records
//! - Strictly increasing sequence numbers (LSNs)
//! - Crash recovery that tolerates a truncated or damaged tail
//! - Checkpoint entries that fence everything before them to disk
//! - Periodic background sync on a dedicated thread
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Caller                               │
//! │      append / append_checkpoint / sync / read_all / close   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Wal (engine)                            │
//! │          Mutex<state>  ◄──────  wal-sync thread             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!       ┌───────────────┼──────────────────┐
//!       │               │                  │
//!       ▼               ▼                  ▼
//! ┌───────────┐  ┌─────────────┐   ┌───────────────┐
//! │  Segment  │  │  WalWriter  │   │ WalReader /   │
//! │  Manager  │  │  (buffered) │   │ WalRecovery   │
//! └───────────┘  └──────┬──────┘   └───────┬───────┘
//!                       │                  │
//!                       ▼                  ▼
//!               ┌────────────────────────────────┐
//!               │       wal-segment-<id>         │
//!               └────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use seqwal::{Wal, WalConfig};
//!
//! # fn main() -> seqwal::Result<()> {
//! let wal = Wal::open(WalConfig::new("/tmp/my-wal"))?;
//! wal.append(b"first")?;
//! wal.append_checkpoint(b"snapshot-1")?;
//! wal.sync()?;
//!
//! for entry in wal.read_all()? {
//!     println!("{} {:?} checkpoint={}", entry.lsn, entry.payload, entry.is_checkpoint);
//! }
//! wal.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{WalError, Result};
pub use config::WalConfig;
pub use engine::Wal;
pub use wal::WalEntry;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seqwal
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
