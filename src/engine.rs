//! Engine Module
//!
//! The WAL engine that coordinates all components.
//!
//! ## Responsibilities
//! - Resolve the active segment and recover its last valid entry on open
//! - Assign sequence numbers and buffer appends
//! - Flush/fsync on demand, before checkpoints, and periodically
//! - Serve strict full reads of the segment
//! - Stop the background worker and sync on close

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::WalConfig;
use crate::error::Result;
use crate::wal::sync::SyncWorker;
use crate::wal::{RecoveryResult, SegmentManager, WalEntry, WalReader, WalRecovery, WalWriter};

/// Mutable engine state, only touched under the engine mutex
struct WalState {
    /// Buffered writer over the active segment
    writer: WalWriter,

    /// Last assigned sequence number (0 = none yet)
    last_lsn: u64,

    /// Period of the background sync
    sync_interval: Duration,

    /// When the background worker should next sync; pushed out by every sync
    sync_deadline: Instant,

    /// Rotation threshold (warn only)
    max_file_size: u64,
    size_warned: bool,
}

impl WalState {
    /// Assign the next LSN and buffer the entry
    ///
    /// The counter advances before the write, so a failed append still
    /// consumes its sequence number.
    fn append(&mut self, payload: &[u8], is_checkpoint: bool) -> Result<u64> {
        self.last_lsn += 1;
        let lsn = self.last_lsn;

        let entry = if is_checkpoint {
            WalEntry::checkpoint(lsn, payload)
        } else {
            WalEntry::new(lsn, payload)
        };
        self.writer.append(&entry)?;

        if !self.size_warned && self.writer.len() > self.max_file_size {
            self.size_warned = true;
            tracing::warn!(
                segment = %self.writer.path().display(),
                size = self.writer.len(),
                max_file_size = self.max_file_size,
                "segment exceeds max_file_size; rotation is not implemented"
            );
        }

        Ok(lsn)
    }

    /// Flush + optional fsync, then reset the periodic-sync timer
    fn sync(&mut self) -> Result<()> {
        self.writer.sync()?;
        self.sync_deadline = Instant::now() + self.sync_interval;
        Ok(())
    }

    /// Background tick: sync if the deadline has passed, return the next wait
    fn tick(&mut self) -> Duration {
        let now = Instant::now();
        if now < self.sync_deadline {
            return self.sync_deadline - now;
        }

        if let Err(e) = self.sync() {
            // Retried on the next tick
            tracing::warn!(error = %e, "periodic WAL sync failed");
        }
        self.sync_interval
    }
}

/// The write-ahead log
///
/// ## Concurrency Model
///
/// - All mutable state (writer, buffer, LSN counter, sync timer) sits behind
///   one mutex held for the whole of each public operation
/// - One background thread syncs every `sync_interval` under the same mutex
/// - `read_all` opens its own read handle, so it sees only flushed bytes
///
/// The engine is `Send + Sync`; share it through `Arc` if several threads
/// append. Append order, LSN order and on-disk order always agree.
pub struct Wal {
    /// WAL configuration
    config: WalConfig,

    /// Active segment
    segment_id: u64,
    segment_path: PathBuf,

    /// What the startup scan found
    recovery: RecoveryResult,

    /// Shared with the sync worker
    state: Arc<Mutex<WalState>>,

    /// `None` once stopped
    sync_worker: Option<SyncWorker>,
}

impl Wal {
    /// Open or create a WAL with the given config
    ///
    /// On startup:
    /// 1. Validate config, create the directory tree
    /// 2. Resolve (or create) the active segment
    /// 3. Scan it for the last valid entry to seed the LSN counter
    /// 4. Open it for append and start the background sync
    pub fn open(config: WalConfig) -> Result<Self> {
        // Step 1: Validate and create directory
        config.validate()?;
        fs::create_dir_all(&config.directory)?;

        // Step 2: Active segment
        let segments = SegmentManager::new(&config.directory);
        let segment_id = segments.current_segment()?;
        let segment_path = segments.segment_path(segment_id);

        // Step 3: Recover last valid entry
        let recovery = WalRecovery::scan(&segment_path)?;
        if recovery.was_truncated {
            if config.truncate_corrupt_tail {
                WalRecovery::truncate(&segment_path, recovery.valid_bytes)?;
                tracing::warn!(
                    segment_id,
                    valid_bytes = recovery.valid_bytes,
                    removed_bytes = recovery.damaged_bytes(),
                    "truncated damaged segment tail"
                );
            } else {
                tracing::warn!(
                    segment_id,
                    valid_bytes = recovery.valid_bytes,
                    damaged_bytes = recovery.damaged_bytes(),
                    "segment has a damaged tail; new entries will follow it"
                );
            }
        }

        // Step 4: Writer, then background sync
        let writer = WalWriter::open(&segment_path, config.enable_fsync)?;
        let last_lsn = recovery.last_lsn();

        let state = Arc::new(Mutex::new(WalState {
            writer,
            last_lsn,
            sync_interval: config.sync_interval,
            sync_deadline: Instant::now() + config.sync_interval,
            max_file_size: config.max_file_size,
            size_warned: false,
        }));

        let worker_state = Arc::clone(&state);
        let sync_worker = SyncWorker::spawn("wal-sync", config.sync_interval, move || {
            worker_state.lock().tick()
        })?;

        tracing::info!(
            dir = %config.directory.display(),
            segment_id,
            entries = recovery.entries_recovered,
            last_lsn,
            "WAL opened"
        );

        Ok(Self {
            config,
            segment_id,
            segment_path,
            recovery,
            state,
            sync_worker: Some(sync_worker),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(WalConfig::new(path))
    }

    /// Append a payload; returns its sequence number
    ///
    /// Buffered only. The entry reaches the file on the next sync.
    pub fn append(&self, payload: &[u8]) -> Result<u64> {
        let lsn = self.state.lock().append(payload, false)?;
        tracing::trace!(lsn, len = payload.len(), "appended entry");
        Ok(lsn)
    }

    /// Append a checkpoint entry; returns its sequence number
    ///
    /// Everything appended before this call is flushed and fsynced before the
    /// checkpoint is buffered. The checkpoint itself is durable only after
    /// the next sync. If the pre-sync fails nothing is appended.
    pub fn append_checkpoint(&self, payload: &[u8]) -> Result<u64> {
        let mut state = self.state.lock();
        state.sync()?;
        let lsn = state.append(payload, true)?;
        tracing::debug!(lsn, "appended checkpoint");
        Ok(lsn)
    }

    /// Flush the buffer and, if enabled, fsync the segment
    pub fn sync(&self) -> Result<()> {
        self.state.lock().sync()
    }

    /// Read every entry currently in the segment file
    ///
    /// Fails with `CorruptLog` on the first damaged record. Entries still in
    /// the write buffer are not visible.
    pub fn read_all(&self) -> Result<Vec<WalEntry>> {
        let _state = self.state.lock();
        WalReader::read_all_strict(&self.segment_path)
    }

    /// Stop the background sync, sync once more and release the segment
    pub fn close(mut self) -> Result<()> {
        if let Some(worker) = self.sync_worker.take() {
            worker.stop();
        }

        self.state.lock().sync()?;
        tracing::info!(segment_id = self.segment_id, last_lsn = self.last_lsn(), "WAL closed");
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Last assigned sequence number
    pub fn last_lsn(&self) -> u64 {
        self.state.lock().last_lsn
    }

    /// Active segment id
    pub fn segment_id(&self) -> u64 {
        self.segment_id
    }

    /// Active segment path
    pub fn segment_path(&self) -> &Path {
        &self.segment_path
    }

    /// Result of the startup recovery scan
    pub fn recovery(&self) -> &RecoveryResult {
        &self.recovery
    }

    /// Get the configuration
    pub fn config(&self) -> &WalConfig {
        &self.config
    }
}

impl Drop for Wal {
    /// Without `close`, stop the worker; the buffer is flushed when the
    /// writer drops, errors ignored
    fn drop(&mut self) {
        if let Some(worker) = self.sync_worker.take() {
            worker.stop();
        }
    }
}
