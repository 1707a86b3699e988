//! Trade journal: the double-buffered tape shared by the engine thread and the
//! persistence worker.
//!
//! The engine appends to the *active* buffer under a single mutex. The worker
//! owns the *passive* buffer and, under the same lock, exchanges it with the
//! active one when its own buffer is empty. Writing happens outside the lock.
//! Every trade moves from active to passive exactly once, in append order.

use crate::execution::Trade;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct JournalState {
    active: Vec<Trade>,
    /// Trades appended since the worker was last signalled or last swapped.
    pending: usize,
    wake_requested: bool,
    shutdown: bool,
}

/// What the worker should do after a wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Handoff {
    /// The passive buffer holds trades to write.
    Flush,
    /// Nothing to write yet.
    Idle,
    /// Shutdown was requested and both buffers are empty.
    Done,
}

/// Append-only, sequenced record of executed trades.
#[derive(Debug)]
pub struct TradeJournal {
    state: Mutex<JournalState>,
    signal: Condvar,
    flush_threshold: usize,
}

impl TradeJournal {
    /// `flush_threshold` is the number of appended trades after which the worker
    /// is woken early. Zero is treated as one.
    pub fn new(flush_threshold: usize) -> Self {
        Self {
            state: Mutex::new(JournalState::default()),
            signal: Condvar::new(),
            flush_threshold: flush_threshold.max(1),
        }
    }

    /// Append one trade to the active buffer.
    pub fn record(&self, trade: Trade) {
        self.record_all(std::iter::once(trade));
    }

    /// Append trades in order under one lock acquisition.
    pub fn record_all(&self, trades: impl IntoIterator<Item = Trade>) {
        let mut state = self.lock();
        let before = state.active.len();
        state.active.extend(trades);
        state.pending += state.active.len() - before;
        if state.pending >= self.flush_threshold {
            state.pending = 0;
            state.wake_requested = true;
            drop(state);
            self.signal.notify_one();
        }
    }

    /// Copy of the active buffer only. Trades already handed to the worker and
    /// not yet written are not included.
    pub fn snapshot(&self) -> Vec<Trade> {
        self.lock().active.clone()
    }

    /// Number of trades in the active buffer.
    pub fn active_len(&self) -> usize {
        self.lock().active.len()
    }

    /// Set the shutdown flag and wake the worker.
    pub fn request_shutdown(&self) {
        self.lock().shutdown = true;
        self.signal.notify_all();
    }

    pub fn shutdown_requested(&self) -> bool {
        self.lock().shutdown
    }

    /// Block for up to `interval`, or until an early wake or shutdown, then hand
    /// the active buffer over if `passive` is empty.
    pub(crate) fn wait_and_swap(&self, passive: &mut Vec<Trade>, interval: Duration) -> Handoff {
        let state = self.lock();
        let (mut state, _) = self
            .signal
            .wait_timeout_while(state, interval, |s| !s.shutdown && !s.wake_requested)
            .unwrap_or_else(PoisonError::into_inner);
        state.wake_requested = false;
        if passive.is_empty() {
            if !state.active.is_empty() {
                std::mem::swap(&mut state.active, passive);
                state.pending = 0;
            } else if state.shutdown {
                return Handoff::Done;
            }
        }
        if passive.is_empty() {
            Handoff::Idle
        } else {
            Handoff::Flush
        }
    }

    fn lock(&self) -> MutexGuard<'_, JournalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn wake_requested(&self) -> bool {
        self.lock().wake_requested
    }
}
