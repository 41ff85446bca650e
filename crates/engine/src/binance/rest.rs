use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use common::{Candle, Error, MarketDataSource, Result};

const BASE_URL: &str = "https://api.binance.com";

/// Binance's hard cap on klines per request.
const MAX_LIMIT: usize = 1000;

/// Public (unsigned) REST client for Binance market data.
pub struct BinanceClient {
    http: Client,
}

impl BinanceClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn fetch_candles(&self, pair: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        let limit = limit.clamp(1, MAX_LIMIT).to_string();
        let url = format!("{BASE_URL}/api/v3/klines");

        debug!(pair, interval, limit = %limit, "Fetching klines");
        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", pair), ("interval", interval), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        parse_klines(&body)
    }
}

// ─── Kline JSON parsing ──────────────────────────────────────────────────────

/// Parse a `/api/v3/klines` body:
/// `[[openTime, "open", "high", "low", "close", "volume", closeTime, ...], ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_row(row)).collect()
}

fn parse_row(row: &[Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(Error::Exchange(format!(
            "kline row has {} fields, expected at least 6",
            row.len()
        )));
    }
    let timestamp = row[0]
        .as_i64()
        .ok_or_else(|| Error::Exchange(format!("kline open time is not an integer: {}", row[0])))?;

    Ok(Candle {
        timestamp,
        open: number(&row[1], "open")?,
        high: number(&row[2], "high")?,
        low: number(&row[3], "low")?,
        close: number(&row[4], "close")?,
        volume: number(&row[5], "volume")?,
    })
}

/// Binance sends decimals as strings; accept plain numbers too.
fn number(value: &Value, field: &str) -> Result<f64> {
    let parsed = match value {
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.ok_or_else(|| Error::Exchange(format!("kline {field} is not a number: {value}")))
}
