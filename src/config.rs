//! Configuration for seqwal
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, WalError};

/// Main configuration for a WAL instance
#[derive(Debug, Clone)]
pub struct WalConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for segment files
    /// Internal structure:
    ///   {directory}/
    ///     ├── wal-segment-0
    ///     └── wal-segment-N   (highest id is the active segment)
    pub directory: PathBuf,

    /// Max size in bytes of a single segment.
    /// Reserved for rotation; exceeding it only logs a warning.
    pub max_file_size: u64,

    /// Max number of segments to retain. Reserved for retention.
    pub max_segments: usize,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// When false, sync flushes to the OS but skips fsync
    pub enable_fsync: bool,

    /// Period of the background sync worker
    pub sync_interval: Duration,

    /// Cut a damaged tail off the active segment on open instead of
    /// appending behind it
    pub truncate_corrupt_tail: bool,
}

impl WalConfig {
    /// Default max segment size (16 MB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

    /// Default background sync period
    pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(300);

    /// Default config rooted at `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Create a new config builder
    pub fn builder() -> WalConfigBuilder {
        WalConfigBuilder::default()
    }

    /// Check the values `Wal::open` depends on
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(WalError::InvalidConfig(
                "directory must not be empty".to_string(),
            ));
        }
        if self.sync_interval.is_zero() {
            return Err(WalError::InvalidConfig(
                "sync_interval must be greater than zero".to_string(),
            ));
        }
        if self.max_segments == 0 {
            return Err(WalError::InvalidConfig(
                "max_segments must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WalConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./seqwal_data"),
            max_file_size: Self::DEFAULT_MAX_FILE_SIZE,
            max_segments: 1, // single active segment until rotation exists
            enable_fsync: true,
            sync_interval: Self::DEFAULT_SYNC_INTERVAL,
            truncate_corrupt_tail: false,
        }
    }
}

/// Builder for WalConfig
#[derive(Default)]
pub struct WalConfigBuilder {
    config: WalConfig,
}

impl WalConfigBuilder {
    /// Set the segment directory
    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.directory = path.into();
        self
    }

    /// Enable or disable fsync on sync
    pub fn enable_fsync(mut self, enabled: bool) -> Self {
        self.config.enable_fsync = enabled;
        self
    }

    /// Set the max segment size (in bytes)
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Set the max number of retained segments
    pub fn max_segments(mut self, count: usize) -> Self {
        self.config.max_segments = count;
        self
    }

    /// Set the background sync period
    pub fn sync_interval(mut self, interval: Duration) -> Self {
        self.config.sync_interval = interval;
        self
    }

    /// Truncate a damaged segment tail on open
    pub fn truncate_corrupt_tail(mut self, enabled: bool) -> Self {
        self.config.truncate_corrupt_tail = enabled;
        self
    }

    pub fn build(self) -> WalConfig {
        self.config
    }
}
