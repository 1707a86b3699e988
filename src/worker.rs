//! Asynchronous persistence worker.
//!
//! One dedicated thread per engine drains the [`TradeJournal`] into a
//! [`TradeSink`]. It waits on a timed interval (or an early wake from the
//! journal), takes the active buffer by swap, and writes it outside the lock.
//! A failed write is retried on the next wake; during shutdown it is discarded
//! and counted in [`FlushStats::trades_discarded`].

use crate::journal::{Handoff, TradeJournal};
use crate::persistence::TradeSink;
use log::{debug, error, info, warn};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Outcome of a worker's lifetime, returned when it is joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct FlushStats {
    pub trades_written: u64,
    /// Trades dropped because the sink kept failing during shutdown.
    pub trades_discarded: u64,
    pub failed_flushes: u64,
}

/// Handle to the background flush thread. Dropping it shuts the worker down and joins it.
pub struct PersistenceWorker {
    journal: Arc<TradeJournal>,
    handle: Option<JoinHandle<FlushStats>>,
}

impl PersistenceWorker {
    pub fn spawn(
        journal: Arc<TradeJournal>,
        sink: Box<dyn TradeSink>,
        flush_interval: Duration,
    ) -> io::Result<Self> {
        let worker_journal = Arc::clone(&journal);
        let handle = thread::Builder::new()
            .name("trade-journal".into())
            .spawn(move || run(&worker_journal, sink, flush_interval))?;
        info!("persistence worker started interval_ms={}", flush_interval.as_millis());
        Ok(Self {
            journal,
            handle: Some(handle),
        })
    }

    /// Request shutdown, wait for the final drain, and return the worker's stats.
    /// Subsequent calls return default stats.
    pub fn shutdown(&mut self) -> FlushStats {
        let Some(handle) = self.handle.take() else {
            return FlushStats::default();
        };
        self.journal.request_shutdown();
        match handle.join() {
            Ok(stats) => {
                if stats.trades_discarded > 0 {
                    error!(
                        "persistence worker stopped with data loss trades_discarded={} trades_written={}",
                        stats.trades_discarded, stats.trades_written
                    );
                } else {
                    info!(
                        "persistence worker stopped trades_written={} failed_flushes={}",
                        stats.trades_written, stats.failed_flushes
                    );
                }
                stats
            }
            Err(_) => {
                error!("persistence worker panicked; unwritten trades are lost");
                FlushStats::default()
            }
        }
    }
}

impl Drop for PersistenceWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(journal: &TradeJournal, mut sink: Box<dyn TradeSink>, interval: Duration) -> FlushStats {
    let mut stats = FlushStats::default();
    let mut passive = Vec::new();
    loop {
        match journal.wait_and_swap(&mut passive, interval) {
            Handoff::Done => break,
            Handoff::Idle => continue,
            Handoff::Flush => {}
        }
        match sink.write_batch(&passive) {
            Ok(()) => {
                debug!("flushed trades count={}", passive.len());
                stats.trades_written += passive.len() as u64;
                passive.clear();
            }
            Err(e) => {
                stats.failed_flushes += 1;
                if journal.shutdown_requested() {
                    error!(
                        "trade flush failed during shutdown, discarding count={} error={}",
                        passive.len(),
                        e
                    );
                    stats.trades_discarded += passive.len() as u64;
                    passive.clear();
                } else {
                    warn!(
                        "trade flush failed, will retry count={} error={}",
                        passive.len(),
                        e
                    );
                }
            }
        }
    }
    stats
}
