use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV bar as delivered by the exchange.
///
/// `timestamp` is the exchange-assigned interval open time in milliseconds.
/// The most recent bar of a series may still be forming; it is replaced in
/// place while its timestamp stays the same.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Reject bars that would poison the indicators: negative or non-finite
    /// prices/volume, or `high < low`.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(self.invalid(format!("{name} is not finite")));
            }
            if value < 0.0 {
                return Err(self.invalid(format!("{name} is negative ({value})")));
            }
        }
        if self.high < self.low {
            return Err(self.invalid(format!(
                "high {} is below low {}",
                self.high, self.low
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> Error {
        Error::InvalidCandle {
            timestamp: self.timestamp,
            reason,
        }
    }
}

/// Direction of a trade recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Trend classification from the fast/slow EMA pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
        }
    }
}

/// A directional recommendation produced by the signal evaluator and
/// consumed by the notification layer. Prices are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub pair: String,
    pub direction: Direction,
    /// Latest close the signal was evaluated against.
    pub price: f64,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub confidence: f64,
    /// True when the Bollinger position (not only RSI) satisfied the
    /// extremity condition.
    pub bollinger_confirmed: bool,
    pub rsi: f64,
    pub macd: f64,
    pub volume_ratio: f64,
    /// Raw volume of the bar the signal was evaluated on.
    pub volume: f64,
    pub generated_at: DateTime<Utc>,
}

impl Signal {
    /// De-duplication key used by the cooldown map.
    pub fn cooldown_key(&self) -> String {
        format!("{}:{}", self.pair, self.direction)
    }
}

/// Current state of the dispatch engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Running => write!(f, "running"),
            EngineState::Paused => write!(f, "paused"),
        }
    }
}

/// Commands sent to the engine via the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Pause,
    Resume,
    /// Run a scan immediately instead of waiting for the next tick.
    ScanNow,
}
