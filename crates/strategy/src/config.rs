use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use common::{Error, Result};

use crate::candles::DEFAULT_CAPACITY;
use crate::format::PricePrecision;
use crate::indicators::macd::MacdAlignment;

/// Top-level signal config file (TOML). Every field has a default.
///
/// Example `config/signals.toml`:
/// ```toml
/// pairs = ["BTCUSDT", "ETHUSDT"]
/// interval = "15m"
/// poll_interval_secs = 120
/// min_confidence = 75.0
///
/// [indicators]
/// rsi_period = 14
///
/// [signal]
/// volume_ratio_min = 1.5
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalFileConfig {
    /// Exchange symbols to watch, e.g. "BTCUSDT".
    pub pairs: Vec<String>,
    /// Kline interval requested from the exchange, e.g. "15m".
    pub interval: String,
    /// Seconds between scans.
    pub poll_interval_secs: u64,
    /// Pause between pairs within one scan (rate limiting).
    pub pair_delay_ms: u64,
    /// Candles retained per pair.
    pub history_capacity: usize,
    /// Candles requested per refresh once a pair is warm.
    pub refresh_limit: usize,
    /// Signals below this confidence are not forwarded.
    pub min_confidence: f64,
    /// Same pair+direction is not re-sent within this window.
    pub cooldown_secs: u64,
    /// Hard cap on remembered cooldown keys.
    pub cooldown_max_entries: usize,
    pub fetch_retries: u32,
    pub fetch_backoff_ms: u64,
    pub price_precision: PricePrecision,
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
}

impl Default for SignalFileConfig {
    fn default() -> Self {
        Self {
            pairs: ["BTCUSDT", "ETHUSDT", "SOLUSDT", "AVAXUSDT", "MATICUSDT"]
                .into_iter()
                .map(String::from)
                .collect(),
            interval: "15m".to_string(),
            poll_interval_secs: 120,
            pair_delay_ms: 500,
            history_capacity: DEFAULT_CAPACITY,
            refresh_limit: 3,
            min_confidence: 75.0,
            cooldown_secs: 1800,
            cooldown_max_entries: 256,
            fetch_retries: 3,
            fetch_backoff_ms: 1000,
            price_precision: PricePrecision::Standard,
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
        }
    }
}

impl SignalFileConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid signal config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read signal config at '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Signal config not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pairs.is_empty() {
            return Err(Error::Config("at least one pair must be configured".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be > 0".into()));
        }
        if self.refresh_limit == 0 {
            return Err(Error::Config("refresh_limit must be > 0".into()));
        }
        let needed = self.indicators.min_history();
        if self.history_capacity < needed {
            return Err(Error::Config(format!(
                "history_capacity {} is smaller than the {needed} candles the indicators need",
                self.history_capacity
            )));
        }
        if !self.min_confidence.is_finite() {
            return Err(Error::Config("min_confidence must be a finite number".into()));
        }
        self.indicators.validate()?;
        self.signal.validate()
    }
}

/// Indicator periods.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_alignment: MacdAlignment,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub volume_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast: 12,
            ema_slow: 26,
            macd_fast: 12,
            macd_slow: 26,
            macd_alignment: MacdAlignment::Offset,
            bollinger_period: 20,
            bollinger_k: 2.0,
            volume_window: 20,
        }
    }
}

impl IndicatorConfig {
    /// Candles required before a snapshot can be computed.
    pub fn min_history(&self) -> usize {
        [
            self.rsi_period + 1,
            self.ema_slow,
            self.macd_slow,
            self.bollinger_period,
            self.volume_window,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("bollinger_period", self.bollinger_period),
            ("volume_window", self.volume_window),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(Error::Config(format!("{name} must be > 0")));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(Error::Config("ema_fast must be less than ema_slow".into()));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(Error::Config("macd_fast must be less than macd_slow".into()));
        }
        if !(self.bollinger_k.is_finite() && self.bollinger_k >= 0.0) {
            return Err(Error::Config(format!(
                "bollinger_k must be a finite non-negative number, got {}",
                self.bollinger_k
            )));
        }
        Ok(())
    }
}

/// Signal confidence always lands in this range.
pub const MIN_CONFIDENCE: f64 = 75.0;
pub const MAX_CONFIDENCE: f64 = 95.0;

/// Decision thresholds, confidence scoring and price-target ratios.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// LONG requires the Bollinger position below this.
    pub bollinger_low: f64,
    /// SHORT requires the Bollinger position above this.
    pub bollinger_high: f64,
    pub volume_ratio_min: f64,
    pub base_confidence: f64,
    /// Added when the Bollinger condition held.
    pub bollinger_bonus: f64,
    pub max_confidence: f64,
    /// Entry is placed this fraction better than the current price.
    pub entry_offset: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            bollinger_low: 0.2,
            bollinger_high: 0.8,
            volume_ratio_min: 1.5,
            base_confidence: 75.0,
            bollinger_bonus: 10.0,
            max_confidence: 95.0,
            entry_offset: 0.002,
            stop_loss_pct: 0.01,
            take_profit_pct: 0.015,
        }
    }
}

impl SignalConfig {
    /// Rejects thresholds that would break the confidence range or invert
    /// the target ordering.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("rsi_oversold", self.rsi_oversold),
            ("rsi_overbought", self.rsi_overbought),
            ("bollinger_low", self.bollinger_low),
            ("bollinger_high", self.bollinger_high),
            ("volume_ratio_min", self.volume_ratio_min),
            ("base_confidence", self.base_confidence),
            ("bollinger_bonus", self.bollinger_bonus),
            ("max_confidence", self.max_confidence),
            ("entry_offset", self.entry_offset),
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!("{name} must be finite, got {value}")));
        }

        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(Error::Config(
                "rsi_oversold must be below rsi_overbought, both within [0, 100]".into(),
            ));
        }
        if self.bollinger_low >= self.bollinger_high {
            return Err(Error::Config(
                "bollinger_low must be below bollinger_high".into(),
            ));
        }
        if self.volume_ratio_min < 0.0 {
            return Err(Error::Config("volume_ratio_min must be non-negative".into()));
        }
        if self.bollinger_bonus < 0.0 {
            return Err(Error::Config("bollinger_bonus must be non-negative".into()));
        }
        if !(MIN_CONFIDENCE <= self.base_confidence
            && self.base_confidence <= self.max_confidence
            && self.max_confidence <= MAX_CONFIDENCE)
        {
            return Err(Error::Config(format!(
                "confidence must satisfy {MIN_CONFIDENCE} <= base_confidence <= max_confidence <= {MAX_CONFIDENCE}"
            )));
        }
        if !(0.0..1.0).contains(&self.entry_offset) {
            return Err(Error::Config("entry_offset must be within [0, 1)".into()));
        }
        for (name, pct) in [
            ("stop_loss_pct", self.stop_loss_pct),
            ("take_profit_pct", self.take_profit_pct),
        ] {
            if !(pct > 0.0 && pct < 1.0) {
                return Err(Error::Config(format!("{name} must be within (0, 1), got {pct}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = SignalFileConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.indicators.min_history(), 26);
        assert_eq!(cfg.pairs.len(), 5);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = SignalFileConfig::from_toml(
            r#"
            pairs = ["BTCUSDT"]
            interval = "1h"
            price_precision = "fine"

            [indicators]
            rsi_period = 7
            macd_alignment = "same_index"

            [signal]
            volume_ratio_min = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.pairs, vec!["BTCUSDT".to_string()]);
        assert_eq!(cfg.interval, "1h");
        assert_eq!(cfg.price_precision, PricePrecision::Fine);
        assert_eq!(cfg.indicators.rsi_period, 7);
        assert_eq!(cfg.indicators.macd_alignment, MacdAlignment::SameIndex);
        assert_eq!(cfg.indicators.ema_slow, 26);
        assert_eq!(cfg.signal.volume_ratio_min, 2.0);
        assert_eq!(cfg.signal.rsi_oversold, 30.0);
        assert_eq!(cfg.poll_interval_secs, 120);
    }

    #[test]
    fn capacity_below_indicator_needs_is_rejected() {
        let err = SignalFileConfig::from_toml("history_capacity = 10").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn inverted_ema_periods_are_rejected() {
        let toml = "[indicators]\nema_fast = 30\nema_slow = 10\n";
        assert!(SignalFileConfig::from_toml(toml).is_err());
    }

    #[test]
    fn empty_pairs_are_rejected() {
        assert!(SignalFileConfig::from_toml("pairs = []").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = SignalFileConfig::load_or_default("/nonexistent/signals.toml").unwrap();
        assert_eq!(cfg.min_confidence, 75.0);
    }

    #[test]
    fn nan_bollinger_multiplier_is_rejected() {
        let err = SignalFileConfig::from_toml("[indicators]\nbollinger_k = nan\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(SignalFileConfig::from_toml("[indicators]\nbollinger_k = inf\n").is_err());
        assert!(SignalFileConfig::from_toml("[indicators]\nbollinger_k = -1.0\n").is_err());
        assert!(SignalFileConfig::from_toml("[indicators]\nbollinger_k = 0.0\n").is_ok());
    }

    #[test]
    fn confidence_outside_range_is_rejected() {
        let toml = "[signal]\nbase_confidence = 10.0\nmax_confidence = 5.0\n";
        assert!(matches!(
            SignalFileConfig::from_toml(toml).unwrap_err(),
            Error::Config(_)
        ));
        assert!(SignalFileConfig::from_toml("[signal]\nmax_confidence = 99.0\n").is_err());
        assert!(SignalFileConfig::from_toml("[signal]\nbase_confidence = 96.0\n").is_err());
        assert!(SignalFileConfig::from_toml("[signal]\nbase_confidence = 80.0\n").is_ok());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let rsi = "[signal]\nrsi_oversold = 70.0\nrsi_overbought = 30.0\n";
        assert!(SignalFileConfig::from_toml(rsi).is_err());
        let bands = "[signal]\nbollinger_low = 0.9\nbollinger_high = 0.1\n";
        assert!(SignalFileConfig::from_toml(bands).is_err());
    }

    #[test]
    fn target_percentages_must_be_fractions() {
        for toml in [
            "[signal]\nstop_loss_pct = -0.01\n",
            "[signal]\nstop_loss_pct = 0.0\n",
            "[signal]\ntake_profit_pct = 1.5\n",
            "[signal]\ntake_profit_pct = nan\n",
            "[signal]\nentry_offset = -0.002\n",
            "[signal]\nvolume_ratio_min = nan\n",
        ] {
            assert!(SignalFileConfig::from_toml(toml).is_err(), "accepted {toml}");
        }
    }

    #[test]
    fn default_signal_thresholds_are_valid() {
        assert!(SignalConfig::default().validate().is_ok());
    }
}
