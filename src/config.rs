//! Engine configuration.
//!
//! Defaults suit a single local run; [`EngineConfig::from_env`] overrides them
//! from environment variables. Unset or unparseable values keep the default.

use crate::execution::is_valid_separator;
use crate::types::Symbol;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one engine instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// The only symbol the engine accepts orders for.
    pub symbol: Symbol,
    /// Trade log file, opened in append mode.
    pub trade_log_path: PathBuf,
    /// Separator between fields of a trade record.
    pub field_separator: char,
    /// Longest the persistence worker sleeps between flushes.
    pub flush_interval: Duration,
    /// Appended trades that wake the worker before the interval elapses.
    pub flush_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: Symbol::AAPL,
            trade_log_path: PathBuf::from("trades.log"),
            field_separator: ',',
            flush_interval: Duration::from_millis(250),
            flush_threshold: 1024,
        }
    }
}

impl EngineConfig {
    /// Reads `SYMBOL`, `TRADE_LOG_PATH`, `TRADE_LOG_SEPARATOR`, `FLUSH_INTERVAL_MS`
    /// and `FLUSH_THRESHOLD`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            symbol: lookup("SYMBOL")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.symbol),
            trade_log_path: lookup("TRADE_LOG_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.trade_log_path),
            field_separator: lookup("TRADE_LOG_SEPARATOR")
                .and_then(|s| single_char(&s))
                .unwrap_or(defaults.field_separator),
            flush_interval: lookup("FLUSH_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.flush_interval),
            flush_threshold: lookup("FLUSH_THRESHOLD")
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.flush_threshold),
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if is_valid_separator(c) => Some(c),
        _ => None,
    }
}
