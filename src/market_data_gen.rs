//! Synthetic order stream.
//!
//! Deterministic, configurable limit orders for replay tests, demos, and load tests.
//! The same seed gives the same sequence of orders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::Engine;
use crate::types::{Order, OrderId, OrderType, Price, Quantity, SenderId, Symbol, TimeInForce};

/// Configuration for the synthetic order generator.
/// All ranges are inclusive. Same config + seed produces the same stream.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed, same order stream.
    pub seed: u64,
    /// Symbol for all generated orders.
    pub symbol: Symbol,
    /// Number of orders produced by [`Generator::all_orders`].
    pub num_orders: usize,
    /// Probability of LimitBuy (0.0..=1.0). LimitSell otherwise.
    pub buy_ratio: f64,
    pub price_min: Price,
    pub price_max: Price,
    /// Quantity range; a minimum of zero is raised to one.
    pub quantity_min: Quantity,
    pub quantity_max: Quantity,
    /// Probability of DAY time-in-force. GTC otherwise.
    pub day_ratio: f64,
    /// Number of distinct sender IDs (1..=num_senders).
    pub num_senders: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            symbol: Symbol::AAPL,
            num_orders: 1000,
            buy_ratio: 0.5,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
            day_ratio: 0.5,
            num_senders: 5,
        }
    }
}

/// Deterministic order stream. Create with [`Generator::new`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_order_id: u64,
    next_timestamp: u64,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            next_order_id: 1,
            next_timestamp: 1,
        }
    }

    /// Generates the next order. Advances internal state (order id, timestamp, RNG).
    pub fn next_order(&mut self) -> Order {
        let order_id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        let order_type = if self.rng.gen::<f64>() < self.config.buy_ratio {
            OrderType::LimitBuy
        } else {
            OrderType::LimitSell
        };
        let price = self
            .rng
            .gen_range(self.config.price_min..=self.config.price_max.max(self.config.price_min));
        let quantity_min = self.config.quantity_min.max(1);
        let quantity = self
            .rng
            .gen_range(quantity_min..=self.config.quantity_max.max(quantity_min));
        let time_in_force = if self.rng.gen::<f64>() < self.config.day_ratio {
            TimeInForce::DAY
        } else {
            TimeInForce::GTC
        };
        let timestamp = self.next_timestamp;
        self.next_timestamp += 1;
        let sender_id = SenderId(self.rng.gen_range(1..=self.config.num_senders.max(1)));
        Order {
            order_id,
            symbol: self.config.symbol,
            order_type,
            price,
            quantity,
            time_in_force,
            sender_id,
            timestamp,
        }
    }

    pub fn take_orders(&mut self, n: usize) -> Vec<Order> {
        (0..n).map(|_| self.next_order()).collect()
    }

    /// Returns the full stream of orders as defined by config.num_orders.
    pub fn all_orders(&mut self) -> Vec<Order> {
        self.take_orders(self.config.num_orders)
    }
}

/// Totals from [`replay_into_engine`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub accepted: usize,
    pub rejected: usize,
    pub trades: usize,
}

/// Submits `orders` into the engine, running a match pass after every
/// `match_every` submissions and once at the end. `match_every == 0` matches
/// only at the end.
pub fn replay_into_engine(
    engine: &mut Engine,
    orders: impl IntoIterator<Item = Order>,
    match_every: usize,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (i, order) in orders.into_iter().enumerate() {
        if engine.submit_order(order) {
            summary.accepted += 1;
        } else {
            summary.rejected += 1;
        }
        if match_every > 0 && (i + 1) % match_every == 0 {
            summary.trades += engine.match_orders();
        }
    }
    summary.trades += engine.match_orders();
    summary
}
