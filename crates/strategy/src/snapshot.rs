use serde::Serialize;
use tracing::warn;

use common::{Candle, Trend};

use crate::config::IndicatorConfig;
use crate::indicators::ema::ema_last;
use crate::indicators::{
    BollingerBands, BollingerIndicator, MacdIndicator, RsiIndicator, VolumeRatio,
};

/// Latest indicator values for one instrument, derived from its candle window.
///
/// Recomputed on every evaluation and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub macd: f64,
    pub bollinger: BollingerBands,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub volume_ratio: f64,
    /// Raw volume of the latest bar.
    pub volume: f64,
    pub trend: Trend,
}

impl IndicatorSnapshot {
    /// Compute the snapshot from candles (oldest first).
    ///
    /// Returns `None` if the window is shorter than
    /// [`IndicatorConfig::min_history`], the volume ratio is undefined
    /// (zero trailing volume) or `cfg` does not validate.
    pub fn compute(candles: &[Candle], cfg: &IndicatorConfig) -> Option<Self> {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
        Self::from_series(&closes, &volumes, cfg)
    }

    /// Same as [`compute`](Self::compute) over parallel close and volume
    /// columns.
    pub fn from_series(closes: &[f64], volumes: &[f64], cfg: &IndicatorConfig) -> Option<Self> {
        if closes.len() < cfg.min_history() || volumes.len() != closes.len() {
            return None;
        }
        if let Err(e) = cfg.validate() {
            warn!(error = %e, "Invalid indicator config, skipping snapshot");
            return None;
        }

        let rsi = RsiIndicator::new(cfg.rsi_period).compute(closes)?;
        let macd = MacdIndicator::new(cfg.macd_fast, cfg.macd_slow)
            .with_alignment(cfg.macd_alignment)
            .compute(closes)?;
        let bollinger =
            BollingerIndicator::new(cfg.bollinger_period, cfg.bollinger_k).compute(closes)?;
        let ema_fast = ema_last(closes, cfg.ema_fast)?;
        let ema_slow = ema_last(closes, cfg.ema_slow)?;
        let volume_ratio = VolumeRatio::new(cfg.volume_window).compute(volumes)?;
        let volume = *volumes.last()?;

        let trend = if ema_fast > ema_slow {
            Trend::Bullish
        } else {
            Trend::Bearish
        };

        Some(Self {
            rsi,
            macd,
            bollinger,
            ema_fast,
            ema_slow,
            volume_ratio,
            volume,
            trend,
        })
    }
}
