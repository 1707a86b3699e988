//! Price-time priority matching.
//!
//! [`match_book`] crosses the best bid against the best ask until the book is no
//! longer crossed. Each step fills the head order of both best levels by the
//! smaller remaining quantity, at the sell order's limit price, and retires any
//! order and level that drain to zero. Fills are committed as they happen.

use crate::execution::Trade;
use crate::order_book::{OrderBook, PriceLevel};
use crate::types::Price;
use std::collections::btree_map::OccupiedEntry;

/// Run matching to a fixed point. Returns the trades in execution order.
///
/// `next_trade_seq` is the sequence number of the next trade and is advanced by
/// one per emitted trade. A book that is not crossed is left untouched.
pub fn match_book(book: &mut OrderBook, next_trade_seq: &mut u64) -> Vec<Trade> {
    let mut trades = Vec::new();
    while let Some((mut bid_level, mut ask_level)) = book.top_of_book_mut() {
        if bid_level.key() < ask_level.key() {
            break;
        }
        let (Some(buy), Some(sell)) = (bid_level.get_mut().front_mut(), ask_level.get_mut().front_mut())
        else {
            // Unreachable while levels are removed as soon as they empty.
            break;
        };
        let quantity = buy.quantity.min(sell.quantity);
        buy.quantity -= quantity;
        sell.quantity -= quantity;
        trades.push(Trade {
            buy_order_id: buy.order_id,
            sell_order_id: sell.order_id,
            price: sell.price,
            quantity,
            timestamp: buy.timestamp.max(sell.timestamp),
            trade_seq: *next_trade_seq,
        });
        *next_trade_seq += 1;
        retire_filled_head(bid_level);
        retire_filled_head(ask_level);
    }
    trades
}

/// Pop the head order if it is exhausted, then drop the level if it is empty.
fn retire_filled_head(mut level: OccupiedEntry<'_, Price, PriceLevel>) {
    if level.get().front().is_some_and(|o| o.quantity == 0) {
        level.get_mut().pop_front();
    }
    if level.get().is_empty() {
        level.remove();
    }
}
