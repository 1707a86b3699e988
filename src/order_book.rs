//! Single-instrument order book: bids and asks, price-time priority.
//!
//! Each side maps price to a FIFO queue of resting orders. Best bid is the
//! highest bid price, best ask the lowest ask price. Levels are never empty
//! while present; matching ([`crate::matching`]) removes them as they drain.

use crate::types::{Order, OrderId, Price, Quantity, Side, Symbol};
use std::collections::btree_map::OccupiedEntry;
use std::collections::{BTreeMap, VecDeque};

/// Price level: resting orders in arrival order.
pub(crate) type PriceLevel = VecDeque<Order>;

/// Why an order was not accepted into the book.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("order symbol {got} does not match book symbol {expected}")]
    WrongSymbol { expected: Symbol, got: Symbol },
    #[error("order quantity must be positive")]
    ZeroQuantity,
}

/// One resting order in a debug snapshot.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderDebugView {
    pub timestamp: u64,
    pub order_id: OrderId,
    pub quantity: Quantity,
}

/// One price level in a debug snapshot, orders in FIFO order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PriceLevelDebugView {
    pub price: Price,
    pub orders: Vec<OrderDebugView>,
}

/// Read-only, depth-limited view of both sides, best price first.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OrderBookDebugSnapshot {
    pub symbol: Symbol,
    pub buy_levels: Vec<PriceLevelDebugView>,
    pub sell_levels: Vec<PriceLevelDebugView>,
}

/// Single-instrument order book.
#[derive(Debug)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    /// Append the order to the tail of its price level, creating the level if absent.
    /// Does not run matching. On rejection the book is untouched.
    pub fn add_order(&mut self, order: Order) -> Result<(), RejectReason> {
        if order.symbol != self.symbol {
            return Err(RejectReason::WrongSymbol {
                expected: self.symbol,
                got: order.symbol,
            });
        }
        if order.quantity == 0 {
            return Err(RejectReason::ZeroQuantity);
        }
        let side = match order.side() {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        side.entry(order.price).or_default().push_back(order);
        Ok(())
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Best bid price (None if empty).
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next_back().copied()
    }

    /// Best ask price (None if empty).
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    pub fn num_buy_levels(&self) -> usize {
        self.bids.len()
    }

    pub fn num_sell_levels(&self) -> usize {
        self.asks.len()
    }

    /// True when best bid >= best ask.
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid(), self.best_ask()), (Some(bid), Some(ask)) if bid >= ask)
    }

    /// Best bid level and best ask level, both mutable. None if either side is empty.
    pub(crate) fn top_of_book_mut(
        &mut self,
    ) -> Option<(
        OccupiedEntry<'_, Price, PriceLevel>,
        OccupiedEntry<'_, Price, PriceLevel>,
    )> {
        let bid = self.bids.last_entry()?;
        let ask = self.asks.first_entry()?;
        Some((bid, ask))
    }

    /// Up to `max_levels` levels per side, best price first.
    pub fn debug_snapshot(&self, max_levels: usize) -> OrderBookDebugSnapshot {
        OrderBookDebugSnapshot {
            symbol: self.symbol,
            buy_levels: self
                .bids
                .iter()
                .rev()
                .take(max_levels)
                .map(level_view)
                .collect(),
            sell_levels: self
                .asks
                .iter()
                .take(max_levels)
                .map(level_view)
                .collect(),
        }
    }
}

fn level_view((price, queue): (&Price, &PriceLevel)) -> PriceLevelDebugView {
    PriceLevelDebugView {
        price: *price,
        orders: queue
            .iter()
            .map(|o| OrderDebugView {
                timestamp: o.timestamp,
                order_id: o.order_id,
                quantity: o.quantity,
            })
            .collect(),
    }
}
