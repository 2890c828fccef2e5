//! walctl
//!
//! Small command-line driver for a seqwal directory.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use seqwal::wal::WalRecovery;
use seqwal::{Wal, WalConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// seqwal CLI
#[derive(Parser, Debug)]
#[command(name = "walctl")]
#[command(about = "Append to, dump and verify a write-ahead log")]
#[command(version)]
struct Args {
    /// WAL directory
    #[arg(short, long, default_value = "./seqwal_data")]
    dir: PathBuf,

    /// Skip fsync on sync (flush to the OS only)
    #[arg(long)]
    no_fsync: bool,

    /// Background sync interval in milliseconds
    #[arg(short = 'i', long, default_value = "300")]
    sync_interval_ms: u64,

    /// Cut a damaged segment tail on open
    #[arg(long)]
    truncate_tail: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append a payload
    Append {
        /// Payload (stored as UTF-8 bytes)
        payload: String,
    },

    /// Append a payload as a checkpoint
    Checkpoint {
        /// Payload (stored as UTF-8 bytes)
        payload: String,
    },

    /// Print every entry in the active segment
    Dump,

    /// Scan the active segment and report damage without opening the WAL
    Verify,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,seqwal=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("walctl failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> seqwal::Result<()> {
    let config = WalConfig::builder()
        .directory(&args.dir)
        .enable_fsync(!args.no_fsync)
        .sync_interval(Duration::from_millis(args.sync_interval_ms.max(1)))
        .truncate_corrupt_tail(args.truncate_tail)
        .build();

    if let Commands::Verify = args.command {
        return verify(&config);
    }

    let wal = Wal::open(config)?;

    let outcome = match &args.command {
        Commands::Append { payload } => wal.append(payload.as_bytes()).map(|lsn| {
            println!("appended lsn={}", lsn);
        }),
        Commands::Checkpoint { payload } => wal.append_checkpoint(payload.as_bytes()).map(|lsn| {
            println!("appended checkpoint lsn={}", lsn);
        }),
        Commands::Dump => wal.read_all().map(|entries| {
            println!("{} entries in segment {}", entries.len(), wal.segment_id());
            for entry in entries {
                println!(
                    "lsn={} checkpoint={} crc={:#010x} payload={}",
                    entry.lsn,
                    entry.is_checkpoint,
                    entry.checksum,
                    String::from_utf8_lossy(&entry.payload)
                );
            }
        }),
        Commands::Verify => Ok(()),
    };

    // Close even when the command failed, report the first error
    let closed = wal.close();
    outcome.and(closed)
}

fn verify(config: &WalConfig) -> seqwal::Result<()> {
    config.validate()?;
    let segments = seqwal::wal::SegmentManager::new(&config.directory);

    let ids = segments.segment_ids()?;
    let Some(&id) = ids.last() else {
        println!("no segments in {}", config.directory.display());
        return Ok(());
    };

    let result = WalRecovery::verify(&segments.segment_path(id))?;
    println!(
        "segment {}: {} valid entries, last_lsn={}, {} of {} bytes valid{}",
        id,
        result.entries_recovered,
        result.last_lsn(),
        result.valid_bytes,
        result.file_len,
        if result.was_truncated { ", DAMAGED TAIL" } else { "" }
    );
    Ok(())
}
