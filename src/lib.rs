//! # Tape Matching Engine
//!
//! Single-instrument limit order matching engine: a two-sided order book with
//! price-time priority, a matching pass that crosses the book to a fixed point,
//! and a trade journal flushed to durable storage by a background worker.
//!
//! ## Entry point
//!
//! Use [`Engine`]: create with [`Engine::new`] (file-backed) or
//! [`Engine::with_sink`], rest orders with [`Engine::submit_order`], then cross
//! them with [`Engine::match_orders`]. Submission never matches on its own.
//!
//! ## Example
//!
//! ```rust
//! use tape_matching_engine::{Engine, EngineConfig, InMemoryTradeSink, Order, OrderId, OrderType, SenderId, Symbol, TimeInForce};
//!
//! let sink = InMemoryTradeSink::new();
//! let mut engine = Engine::with_sink(&EngineConfig::default(), Box::new(sink.clone())).unwrap();
//! let order = |id, order_type, price| Order {
//!     order_id: OrderId(id),
//!     symbol: Symbol::AAPL,
//!     order_type,
//!     price,
//!     quantity: 4,
//!     time_in_force: TimeInForce::GTC,
//!     sender_id: SenderId(1),
//!     timestamp: id,
//! };
//! assert!(engine.submit_order(order(1, OrderType::LimitSell, 50)));
//! assert!(engine.submit_order(order(2, OrderType::LimitBuy, 50)));
//! assert_eq!(engine.match_orders(), 1);
//! assert_eq!(engine.num_sell_levels(), 0);
//!
//! let stats = engine.shutdown();
//! assert_eq!(stats.trades_written, 1);
//! assert_eq!(sink.trades()[0].price, 50);
//! ```
//!
//! ## Lower-level API
//!
//! [`OrderBook`] and [`match_book`] can be used directly if you manage trade
//! sequence numbers and journaling yourself.

pub mod config;
pub mod engine;
pub mod execution;
pub mod journal;
pub mod market_data_gen;
pub mod matching;
pub mod order_book;
pub mod persistence;
pub mod types;
pub mod worker;

pub use config::EngineConfig;
pub use engine::Engine;
pub use execution::Trade;
pub use journal::TradeJournal;
pub use market_data_gen::{replay_into_engine, Generator, GeneratorConfig, ReplaySummary};
pub use matching::match_book;
pub use order_book::{OrderBook, OrderBookDebugSnapshot, OrderDebugView, PriceLevelDebugView, RejectReason};
pub use persistence::{read_trade_log, truncate_trade_log, FileTradeSink, InMemoryTradeSink, TradeLogError, TradeSink};
pub use types::{Order, OrderId, OrderType, Price, Quantity, SenderId, Side, Symbol, TimeInForce};
pub use worker::{FlushStats, PersistenceWorker};
