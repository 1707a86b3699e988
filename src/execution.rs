//! Trades emitted by the matching pass.
//!
//! A [`Trade`] is immutable once created. Its durable form is one line per trade:
//! buy id, sell id, price, quantity, timestamp, trade sequence, joined by a single
//! separator character and terminated by `\n`.

use crate::types::{OrderId, Price, Quantity};
use std::fmt::Write;

/// Whether `c` can delimit record fields. Digits, `-`, `\r` and `\n` occur inside
/// fields or line endings and would make the record unreadable.
pub fn is_valid_separator(c: char) -> bool {
    !(c.is_ascii_digit() || matches!(c, '-' | '\r' | '\n'))
}

/// One execution between a resting buy and a resting sell.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Trade {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    /// Always the sell order's limit price.
    pub price: Price,
    pub quantity: Quantity,
    /// Max of the two participants' submission timestamps.
    pub timestamp: u64,
    /// Strictly increasing per engine, starting at 0.
    pub trade_seq: u64,
}

impl Trade {
    /// Appends this trade's journal line (including the newline) to `out`.
    pub fn write_record(&self, out: &mut String, separator: char) {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}\n",
            self.buy_order_id.0,
            self.sell_order_id.0,
            self.price,
            self.quantity,
            self.timestamp,
            self.trade_seq,
            sep = separator
        );
    }

    /// Journal line for this trade, newline-terminated.
    pub fn to_record(&self, separator: char) -> String {
        let mut out = String::with_capacity(48);
        self.write_record(&mut out, separator);
        out
    }

    /// Parses one journal line. A trailing `\n` (or `\r\n`) is accepted.
    pub fn from_record(line: &str, separator: char) -> Result<Self, String> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let fields: Vec<&str> = line.split(separator).collect();
        if fields.len() != 6 {
            return Err(format!("expected 6 fields, found {}", fields.len()));
        }
        fn field<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, String> {
            raw.parse()
                .map_err(|_| format!("invalid {} field {:?}", name, raw))
        }
        Ok(Trade {
            buy_order_id: OrderId(field(fields[0], "buy id")?),
            sell_order_id: OrderId(field(fields[1], "sell id")?),
            price: field(fields[2], "price")?,
            quantity: field(fields[3], "quantity")?,
            timestamp: field(fields[4], "timestamp")?,
            trade_seq: field(fields[5], "trade sequence")?,
        })
    }
}
