use chrono::{DateTime, Utc};

use common::{Direction, Signal, Trend};

use crate::config::SignalConfig;
use crate::snapshot::IndicatorSnapshot;

/// Turns a price and an indicator snapshot into at most one signal.
///
/// Rules are checked LONG first, then SHORT; the first rule whose conditions
/// all hold wins. Most evaluations produce nothing.
#[derive(Debug, Clone, Default)]
pub struct SignalEvaluator {
    pub config: SignalConfig,
}

impl SignalEvaluator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, pair: &str, price: f64, snap: &IndicatorSnapshot) -> Option<Signal> {
        self.evaluate_at(pair, price, snap, Utc::now())
    }

    /// Same as [`evaluate`](Self::evaluate) with an explicit timestamp.
    pub fn evaluate_at(
        &self,
        pair: &str,
        price: f64,
        snap: &IndicatorSnapshot,
        now: DateTime<Utc>,
    ) -> Option<Signal> {
        let direction = self.direction(price, snap)?;
        Some(self.build(pair, direction, price, snap, now))
    }

    /// Which rule, if any, matches. Pure decision table.
    pub fn direction(&self, price: f64, snap: &IndicatorSnapshot) -> Option<Direction> {
        let cfg = &self.config;
        if snap.volume_ratio <= cfg.volume_ratio_min {
            return None;
        }

        let long = snap.trend == Trend::Bullish
            && price > snap.ema_fast
            && snap.macd > 0.0
            && (snap.rsi < cfg.rsi_oversold || self.bollinger_low(price, snap));
        if long {
            return Some(Direction::Long);
        }

        let short = snap.trend == Trend::Bearish
            && price < snap.ema_fast
            && snap.macd < 0.0
            && (snap.rsi > cfg.rsi_overbought || self.bollinger_high(price, snap));
        if short {
            return Some(Direction::Short);
        }
        None
    }

    // A zero-width band has no position; the Bollinger branch is then not met.
    fn bollinger_low(&self, price: f64, snap: &IndicatorSnapshot) -> bool {
        snap.bollinger
            .position(price)
            .is_some_and(|p| p < self.config.bollinger_low)
    }

    fn bollinger_high(&self, price: f64, snap: &IndicatorSnapshot) -> bool {
        snap.bollinger
            .position(price)
            .is_some_and(|p| p > self.config.bollinger_high)
    }

    fn build(
        &self,
        pair: &str,
        direction: Direction,
        price: f64,
        snap: &IndicatorSnapshot,
        now: DateTime<Utc>,
    ) -> Signal {
        let cfg = &self.config;
        let bollinger_confirmed = match direction {
            Direction::Long => self.bollinger_low(price, snap),
            Direction::Short => self.bollinger_high(price, snap),
        };

        let mut confidence = cfg.base_confidence;
        if bollinger_confirmed {
            confidence += cfg.bollinger_bonus;
        }
        let confidence = confidence.min(cfg.max_confidence);

        let (entry, stop_loss, take_profit) = match direction {
            Direction::Long => {
                let entry = price * (1.0 - cfg.entry_offset);
                let stop = (entry * (1.0 - cfg.stop_loss_pct)).min(snap.bollinger.lower);
                (entry, stop, entry * (1.0 + cfg.take_profit_pct))
            }
            Direction::Short => {
                let entry = price * (1.0 + cfg.entry_offset);
                let stop = (entry * (1.0 + cfg.stop_loss_pct)).max(snap.bollinger.upper);
                (entry, stop, entry * (1.0 - cfg.take_profit_pct))
            }
        };

        Signal {
            pair: pair.to_string(),
            direction,
            price,
            entry,
            take_profit,
            stop_loss,
            confidence,
            bollinger_confirmed,
            rsi: snap.rsi,
            macd: snap.macd,
            volume_ratio: snap.volume_ratio,
            volume: snap.volume,
            generated_at: now,
        }
    }
}
