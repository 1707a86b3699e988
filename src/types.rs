//! Core types for the matching engine.
//!
//! Identifiers are newtype wrappers. Prices are signed integers in minor currency
//! units and quantities are unsigned whole units.

use std::fmt;
use std::str::FromStr;

/// Limit price in minor currency units.
pub type Price = i64;

/// Remaining (unfilled) quantity.
pub type Quantity = u64;

/// Caller-assigned order identifier. Opaque: not required to be monotonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub u64);

/// Originating sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SenderId(pub u64);

/// Instrument symbol. An engine instance trades exactly one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Symbol {
    AAPL,
    MSFT,
    GOOG,
}

impl Symbol {
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::AAPL => "AAPL",
            Symbol::MSFT => "MSFT",
            Symbol::GOOG => "GOOG",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AAPL" => Ok(Symbol::AAPL),
            "MSFT" => Ok(Symbol::MSFT),
            "GOOG" => Ok(Symbol::GOOG),
            other => Err(format!("unknown symbol {:?}", other)),
        }
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Order type. Only limit orders exist; the type carries the side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    LimitBuy,
    LimitSell,
}

impl OrderType {
    pub fn side(self) -> Side {
        match self {
            OrderType::LimitBuy => Side::Buy,
            OrderType::LimitSell => Side::Sell,
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, OrderType::LimitBuy)
    }
}

/// Time-in-force tag. Stored with the order; matching does not inspect it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TimeInForce {
    /// Valid for the trading day.
    DAY,
    /// Good-Till-Cancel.
    GTC,
}

/// Order message, resting or incoming.
///
/// `quantity` is the remaining unfilled amount and is decremented in place while
/// the order rests. `timestamp` is informational: priority within a level is
/// arrival order, never this value.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub time_in_force: TimeInForce,
    pub sender_id: SenderId,
    pub timestamp: u64,
}

impl Order {
    pub fn side(&self) -> Side {
        self.order_type.side()
    }

    pub fn is_buy(&self) -> bool {
        self.order_type.is_buy()
    }
}
