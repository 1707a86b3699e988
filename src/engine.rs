//! Single-entry matching engine facade.
//!
//! Holds the order book, the trade sequence counter, and the trade journal with
//! its persistence worker. Submission and matching are separate calls and run on
//! the caller's thread without I/O; the worker writes trades in the background.

use crate::config::EngineConfig;
use crate::execution::Trade;
use crate::journal::TradeJournal;
use crate::matching::match_book;
use crate::order_book::{OrderBook, OrderBookDebugSnapshot};
use crate::persistence::{FileTradeSink, TradeSink};
use crate::types::{Order, Price, Symbol};
use crate::worker::{FlushStats, PersistenceWorker};
use log::{debug, info, warn};
use std::io;
use std::sync::Arc;

/// Single-instrument matching engine.
///
/// Use [`Engine::submit_order`] to rest orders and [`Engine::match_orders`] to
/// cross the book. Calls must be serialized by the caller. Dropping the engine
/// (or calling [`Engine::shutdown`]) drains the journal and joins the worker.
pub struct Engine {
    book: OrderBook,
    next_trade_seq: u64,
    journal: Arc<TradeJournal>,
    worker: PersistenceWorker,
}

impl Engine {
    /// Creates an engine writing its trade log to `config.trade_log_path`.
    pub fn new(config: &EngineConfig) -> io::Result<Self> {
        let sink = FileTradeSink::open(&config.trade_log_path, config.field_separator)?;
        info!(
            "trade log opened path={} separator={:?}",
            config.trade_log_path.display(),
            config.field_separator
        );
        Self::with_sink(config, Box::new(sink))
    }

    /// Creates an engine flushing to a caller-supplied sink. `trade_log_path` and
    /// `field_separator` are ignored.
    pub fn with_sink(config: &EngineConfig, sink: Box<dyn TradeSink>) -> io::Result<Self> {
        let journal = Arc::new(TradeJournal::new(config.flush_threshold));
        let worker = PersistenceWorker::spawn(Arc::clone(&journal), sink, config.flush_interval)?;
        info!("engine started symbol={}", config.symbol);
        Ok(Self {
            book: OrderBook::new(config.symbol),
            next_trade_seq: 0,
            journal,
            worker,
        })
    }

    /// Rests an order on the book without matching.
    ///
    /// Returns `false` (and leaves the book untouched) if the order is for another
    /// symbol or has zero quantity.
    pub fn submit_order(&mut self, order: Order) -> bool {
        let (order_id, order_type, price, quantity) =
            (order.order_id, order.order_type, order.price, order.quantity);
        match self.book.add_order(order) {
            Ok(()) => {
                debug!(
                    "order accepted order_id={} type={:?} quantity={} price={}",
                    order_id.0, order_type, quantity, price
                );
                true
            }
            Err(reason) => {
                warn!("order rejected order_id={} reason={}", order_id.0, reason);
                false
            }
        }
    }

    /// Crosses the book until best bid < best ask or a side is empty, journaling
    /// every trade. Returns the number of trades this pass emitted.
    pub fn match_orders(&mut self) -> usize {
        let trades = match_book(&mut self.book, &mut self.next_trade_seq);
        if trades.is_empty() {
            return 0;
        }
        for trade in &trades {
            debug!(
                "trade seq={} buy_order={} sell_order={} price={} quantity={}",
                trade.trade_seq, trade.buy_order_id.0, trade.sell_order_id.0, trade.price, trade.quantity
            );
        }
        let count = trades.len();
        self.journal.record_all(trades);
        count
    }

    /// Trades still in the journal's active buffer. Trades already handed to the
    /// persistence worker are not included.
    pub fn active_trade_history_snapshot(&self) -> Vec<Trade> {
        self.journal.snapshot()
    }

    /// Up to `max_levels` levels per side, best price first.
    pub fn debug_snapshot(&self, max_levels: usize) -> OrderBookDebugSnapshot {
        self.book.debug_snapshot(max_levels)
    }

    pub fn num_buy_levels(&self) -> usize {
        self.book.num_buy_levels()
    }

    pub fn num_sell_levels(&self) -> usize {
        self.book.num_sell_levels()
    }

    pub fn symbol(&self) -> Symbol {
        self.book.symbol()
    }

    /// Best bid price, if any.
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Best ask price, if any.
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Trades executed over the engine's lifetime (also the next sequence number).
    pub fn trades_executed(&self) -> u64 {
        self.next_trade_seq
    }

    /// Drains the journal, joins the worker and reports what was written.
    pub fn shutdown(mut self) -> FlushStats {
        self.worker.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryTradeSink;
    use crate::types::{OrderId, OrderType, SenderId, TimeInForce};

    fn init_log() {
        let _ = env_logger::try_init();
    }

    fn engine_with_memory_sink() -> (Engine, InMemoryTradeSink) {
        init_log();
        let sink = InMemoryTradeSink::new();
        let engine = Engine::with_sink(&EngineConfig::default(), Box::new(sink.clone())).unwrap();
        (engine, sink)
    }

    fn order(id: u64, order_type: OrderType, qty: u64, price: i64) -> Order {
        Order {
            order_id: OrderId(id),
            symbol: Symbol::AAPL,
            order_type,
            price,
            quantity: qty,
            time_in_force: TimeInForce::DAY,
            sender_id: SenderId(1),
            timestamp: id,
        }
    }

    #[test]
    fn sell_then_buy_same_price_clears_book() {
        let (mut engine, sink) = engine_with_memory_sink();
        assert!(engine.submit_order(order(1, OrderType::LimitSell, 4, 50)));
        assert!(engine.submit_order(order(2, OrderType::LimitBuy, 4, 50)));
        assert_eq!(engine.match_orders(), 1);
        assert_eq!(engine.num_buy_levels(), 0);
        assert_eq!(engine.num_sell_levels(), 0);

        let stats = engine.shutdown();
        assert_eq!(stats.trades_written, 1);
        let trades = sink.trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity, 4);
        assert_eq!(trades[0].price, 50);
        assert_eq!(trades[0].trade_seq, 0);
    }

    #[test]
    fn wrong_symbol_rejected() {
        let (mut engine, _) = engine_with_memory_sink();
        let mut o = order(1, OrderType::LimitBuy, 10, 100);
        o.symbol = Symbol::GOOG;
        assert!(!engine.submit_order(o));
        assert_eq!(engine.num_buy_levels(), 0);
        assert_eq!(engine.symbol(), Symbol::AAPL);
    }

    #[test]
    fn submit_does_not_match_until_match_orders() {
        let (mut engine, _) = engine_with_memory_sink();
        engine.submit_order(order(1, OrderType::LimitBuy, 10, 100));
        engine.submit_order(order(2, OrderType::LimitBuy, 5, 101));
        engine.submit_order(order(3, OrderType::LimitSell, 8, 100));
        assert_eq!(engine.best_bid(), Some(101));
        assert_eq!(engine.best_ask(), Some(100));
        assert!(engine.active_trade_history_snapshot().is_empty());

        assert_eq!(engine.match_orders(), 2);
        assert_eq!(engine.match_orders(), 0);
        assert_eq!(engine.trades_executed(), 2);
        let snap = engine.debug_snapshot(10);
        assert_eq!(snap.buy_levels.len(), 1);
        assert_eq!(snap.buy_levels[0].price, 100);
        assert_eq!(snap.buy_levels[0].orders[0].quantity, 7);
        assert!(snap.sell_levels.is_empty());
    }

    #[test]
    fn active_snapshot_sees_recent_trades_until_flushed() {
        init_log();
        let sink = InMemoryTradeSink::new();
        let config = EngineConfig {
            flush_interval: std::time::Duration::from_secs(60),
            flush_threshold: 1_000,
            ..EngineConfig::default()
        };
        let mut engine = Engine::with_sink(&config, Box::new(sink.clone())).unwrap();
        engine.submit_order(order(1, OrderType::LimitSell, 3, 10));
        engine.submit_order(order(2, OrderType::LimitBuy, 1, 10));
        engine.submit_order(order(3, OrderType::LimitBuy, 1, 10));
        engine.match_orders();
        let seqs: Vec<u64> = engine
            .active_trade_history_snapshot()
            .iter()
            .map(|t| t.trade_seq)
            .collect();
        assert_eq!(seqs, vec![0, 1]);
        drop(engine);
        assert_eq!(sink.trades().len(), 2);
    }

    #[test]
    fn new_rejects_separator_that_breaks_records() {
        init_log();
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            trade_log_path: dir.path().join("trades.log"),
            field_separator: '-',
            ..EngineConfig::default()
        };
        let err = Engine::new(&config).err().expect("engine must not start");
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn file_backed_engine_writes_all_trades_on_shutdown() {
        init_log();
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            trade_log_path: dir.path().join("trades.log"),
            field_separator: ';',
            ..EngineConfig::default()
        };
        let mut engine = Engine::new(&config).unwrap();
        for i in 0..10 {
            engine.submit_order(order(2 * i + 1, OrderType::LimitSell, 2, 100 + i as i64));
            engine.submit_order(order(2 * i + 2, OrderType::LimitBuy, 2, 100 + i as i64));
            engine.match_orders();
        }
        let stats = engine.shutdown();
        assert_eq!(stats.trades_written, 10);
        let trades = crate::persistence::read_trade_log(&config.trade_log_path, ';').unwrap();
        let seqs: Vec<u64> = trades.iter().map(|t| t.trade_seq).collect();
        assert_eq!(seqs, (0..10).collect::<Vec<_>>());
    }
}
