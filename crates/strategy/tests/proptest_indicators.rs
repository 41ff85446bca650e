use proptest::prelude::*;

use common::{Candle, Direction, Trend};
use strategy::indicators::{ema, BollingerBands, BollingerIndicator, MacdIndicator, RsiIndicator};
use strategy::{CandleStore, IndicatorConfig, IndicatorSnapshot, SignalEvaluator, UpsertOutcome};

fn closes_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0001f64..1_000_000.0f64, min..max)
}

fn candles_from(closes: &[f64], volumes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| Candle::new(i as i64, c, c, c, c, v))
        .collect()
}

proptest! {
    /// RSI stays within [0, 100] for any positive close series.
    #[test]
    fn rsi_is_bounded(closes in closes_strategy(15, 120)) {
        let rsi = RsiIndicator::new(14);
        for v in rsi.values(&closes) {
            prop_assert!((0.0..=100.0).contains(&v), "RSI out of range: {}", v);
        }
    }

    /// Every Bollinger window keeps lower <= middle <= upper.
    #[test]
    fn bollinger_bands_are_ordered(closes in closes_strategy(20, 120)) {
        let bb = BollingerIndicator::default();
        for BollingerBands { upper, middle, lower } in bb.values(&closes) {
            prop_assert!(lower <= middle && middle <= upper, "{} {} {}", lower, middle, upper);
        }
    }

    /// Indicators are pure: the same input gives bit-identical output.
    #[test]
    fn indicators_are_deterministic(closes in closes_strategy(30, 100)) {
        prop_assert_eq!(ema(&closes, 12), ema(&closes, 12));
        let rsi = RsiIndicator::new(14);
        prop_assert_eq!(rsi.compute(&closes), rsi.compute(&closes));
        let macd = MacdIndicator::default();
        prop_assert_eq!(macd.compute(&closes), macd.compute(&closes));
        let bb = BollingerIndicator::default();
        prop_assert_eq!(bb.compute(&closes), bb.compute(&closes));
    }

    /// EMA output has the input's length and stays within the input's range.
    #[test]
    fn ema_is_bounded_by_input(closes in closes_strategy(1, 100), period in 1usize..50) {
        let out = ema(&closes, period);
        prop_assert_eq!(out.len(), closes.len());
        let lo = closes.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = closes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for v in out {
            prop_assert!(v >= lo - 1e-6 * hi && v <= hi + 1e-6 * hi);
        }
    }

    /// Distinct increasing timestamps never grow a series past its capacity,
    /// and the window always holds the newest candles.
    #[test]
    fn store_respects_capacity(cap in 1usize..50, extra in 0usize..60) {
        let mut store = CandleStore::new(cap);
        let total = cap + extra;
        for ts in 0..total as i64 {
            store.upsert("X", Candle::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0)).unwrap();
            prop_assert!(store.len("X") <= cap);
        }
        let series = store.candles("X");
        prop_assert_eq!(series.len(), cap);
        prop_assert_eq!(series[0].timestamp, (total - cap) as i64);
        prop_assert!(series.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    /// Re-sending the tail timestamp replaces the bar in place.
    #[test]
    fn tail_replacement_keeps_length(n in 1usize..30, close in 0.01f64..1000.0) {
        let mut store = CandleStore::new(100);
        for ts in 0..n as i64 {
            store.upsert("X", Candle::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0)).unwrap();
        }
        let tail_ts = n as i64 - 1;
        let outcome = store
            .upsert("X", Candle::new(tail_ts, close, close, close, close, 2.0))
            .unwrap();
        prop_assert_eq!(outcome, UpsertOutcome::Replaced);
        prop_assert_eq!(store.len("X"), n);
        prop_assert_eq!(store.last("X").unwrap().close, close);
    }

    /// Any emitted signal has a confidence in [75, 95] and consistent targets.
    #[test]
    fn emitted_signals_are_well_formed(
        closes in closes_strategy(26, 100),
        spike in 0.0f64..50.0,
    ) {
        let mut volumes = vec![1.0; closes.len()];
        if let Some(last) = volumes.last_mut() {
            *last += spike;
        }
        let candles = candles_from(&closes, &volumes);
        let cfg = IndicatorConfig::default();
        let Some(snap) = IndicatorSnapshot::compute(&candles, &cfg) else {
            return Ok(());
        };
        let price = closes[closes.len() - 1];
        let eval = SignalEvaluator::default();
        if let Some(sig) = eval.evaluate("X", price, &snap) {
            prop_assert!((75.0..=95.0).contains(&sig.confidence));
            match sig.direction {
                Direction::Long => {
                    prop_assert_eq!(snap.trend, Trend::Bullish);
                    prop_assert!(sig.take_profit > sig.entry);
                    prop_assert!(sig.stop_loss < sig.entry);
                }
                Direction::Short => {
                    prop_assert_eq!(snap.trend, Trend::Bearish);
                    prop_assert!(sig.take_profit < sig.entry);
                    prop_assert!(sig.stop_loss > sig.entry);
                }
            }
        }
    }
}
