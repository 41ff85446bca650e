use async_trait::async_trait;

use crate::{Candle, Result};

/// Source of OHLCV candles for the dispatch loop.
///
/// `BinanceClient` implements this against the public REST API. Tests supply
/// in-memory fakes.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch the most recent `limit` candles for `pair` at `interval`
    /// (e.g. "15m"), oldest first.
    async fn fetch_candles(&self, pair: &str, interval: &str, limit: usize) -> Result<Vec<Candle>>;
}

/// Delivery channel for rendered signal and lifecycle messages.
///
/// The core never talks to a chat API directly; only the forwarder task in
/// `telegram-ctrl` and the binary hold a `dyn Notifier`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}
