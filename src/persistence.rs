//! Durable trade sinks.
//!
//! The persistence worker is the only writer. [`FileTradeSink`] appends one
//! record per trade to a file opened in append mode; the file is truncated only
//! by the driver, via [`truncate_trade_log`], never by the engine.

use crate::execution::{is_valid_separator, Trade};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for flushed trades.
///
/// A failed `write_batch` leaves the batch with the worker, which retries the
/// whole batch on its next wake.
pub trait TradeSink: Send {
    fn write_batch(&mut self, trades: &[Trade]) -> io::Result<()>;
}

/// Append-only trade log file.
#[derive(Debug)]
pub struct FileTradeSink {
    path: PathBuf,
    file: File,
    separator: char,
}

impl FileTradeSink {
    /// Open (creating if needed) `path` in append mode.
    ///
    /// Fails with `InvalidInput` if `separator` could appear inside a field.
    pub fn open(path: impl AsRef<Path>, separator: char) -> io::Result<Self> {
        if !is_valid_separator(separator) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid trade log separator {:?}", separator),
            ));
        }
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file,
            separator,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeSink for FileTradeSink {
    fn write_batch(&mut self, trades: &[Trade]) -> io::Result<()> {
        let mut buf = String::with_capacity(trades.len() * 48);
        for trade in trades {
            trade.write_record(&mut buf, self.separator);
        }
        self.file.write_all(buf.as_bytes())?;
        self.file.flush()
    }
}

/// In-memory sink for tests and embedding. Clone shares the same backing buffer.
#[derive(Clone, Debug, Default)]
pub struct InMemoryTradeSink {
    trades: Arc<Mutex<Vec<Trade>>>,
}

impl InMemoryTradeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, in write order.
    pub fn trades(&self) -> Vec<Trade> {
        self.trades
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TradeSink for InMemoryTradeSink {
    fn write_batch(&mut self, trades: &[Trade]) -> io::Result<()> {
        self.trades
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(trades);
        Ok(())
    }
}

/// Errors reading a trade log back.
#[derive(Debug, thiserror::Error)]
pub enum TradeLogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Truncate (or create) the trade log. Called once by the driver at process start.
pub fn truncate_trade_log(path: impl AsRef<Path>) -> io::Result<()> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    Ok(())
}

/// Read every record of a trade log, in file order. Blank lines are skipped.
pub fn read_trade_log(path: impl AsRef<Path>, separator: char) -> Result<Vec<Trade>, TradeLogError> {
    let reader = BufReader::new(File::open(path)?);
    let mut trades = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let trade = Trade::from_record(&line, separator).map_err(|reason| TradeLogError::Parse {
            line: idx + 1,
            reason,
        })?;
        trades.push(trade);
    }
    Ok(trades)
}
