//! Background sync worker
//!
//! A dedicated thread that wakes on a timer and runs a tick callback until it
//! is cancelled. The callback returns how long to wait before the next tick,
//! which lets a foreground sync push the next background sync out.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

/// Handle to the running sync thread
pub(crate) struct SyncWorker {
    /// Dropping the sender is the cancellation signal
    shutdown_tx: Sender<()>,
    handle: JoinHandle<()>,
}

impl SyncWorker {
    /// Spawn the worker; the first tick fires after `first_wait`
    pub(crate) fn spawn<F>(name: &str, first_wait: Duration, tick: F) -> io::Result<Self>
    where
        F: FnMut() -> Duration + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = channel::bounded(1);

        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || Self::worker_loop(shutdown_rx, first_wait, tick))?;

        Ok(Self {
            shutdown_tx,
            handle,
        })
    }

    fn worker_loop<F>(shutdown_rx: Receiver<()>, first_wait: Duration, mut tick: F)
    where
        F: FnMut() -> Duration,
    {
        let mut wait = first_wait;
        loop {
            let cancelled = select! {
                recv(shutdown_rx) -> _ => true,
                recv(channel::after(wait)) -> _ => false,
            };
            if cancelled {
                break;
            }
            wait = tick();
        }
        tracing::debug!("sync worker stopped");
    }

    /// Cancel the worker and wait for it to exit. No final tick runs.
    pub(crate) fn stop(self) {
        drop(self.shutdown_tx);
        if self.handle.join().is_err() {
            tracing::error!("sync worker panicked");
        }
    }
}
