//! Demo driver: replays a synthetic order stream through one engine.
//!
//! Configuration comes from the environment (see `EngineConfig::from_env`), plus
//! `ORDER_COUNT`, `SEED` and `MATCH_EVERY` for the generated stream.

use tape_matching_engine::{
    replay_into_engine, truncate_trade_log, Engine, EngineConfig, Generator, GeneratorConfig,
};

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() {
    let _ = env_logger::try_init();
    let config = EngineConfig::from_env();

    if let Err(e) = truncate_trade_log(&config.trade_log_path) {
        eprintln!("cannot reset trade log {}: {}", config.trade_log_path.display(), e);
        std::process::exit(1);
    }
    let mut engine = match Engine::new(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("cannot start engine: {}", e);
            std::process::exit(1);
        }
    };

    let orders = Generator::new(GeneratorConfig {
        seed: env_or("SEED", 42),
        symbol: config.symbol,
        num_orders: env_or("ORDER_COUNT", 10_000),
        ..Default::default()
    })
    .all_orders();
    let summary = replay_into_engine(&mut engine, orders, env_or("MATCH_EVERY", 16));
    log::info!(
        "replay done accepted={} rejected={} trades={}",
        summary.accepted,
        summary.rejected,
        summary.trades
    );

    match serde_json::to_string(&engine.debug_snapshot(5)) {
        Ok(json) => log::info!("top of book {}", json),
        Err(e) => log::warn!("cannot serialize book snapshot: {}", e),
    }

    let stats = engine.shutdown();
    match serde_json::to_string(&stats) {
        Ok(json) => log::info!("flush stats {}", json),
        Err(e) => log::warn!("cannot serialize flush stats: {}", e),
    }
    eprintln!(
        "trades written={} discarded={} failed_flushes={} log={}",
        stats.trades_written,
        stats.trades_discarded,
        stats.failed_flushes,
        config.trade_log_path.display()
    );
    if stats.trades_discarded > 0 {
        std::process::exit(2);
    }
}
