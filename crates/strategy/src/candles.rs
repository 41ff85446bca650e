use std::collections::{HashMap, VecDeque};

use tracing::debug;

use common::{Candle, Result};

/// Default number of candles retained per instrument.
pub const DEFAULT_CAPACITY: usize = 100;

/// What `upsert` did with a candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// Newer than the tail; appended.
    Appended,
    /// Appended and the oldest candle was evicted to stay within capacity.
    Evicted,
    /// Same timestamp as the tail; the still-forming bar was replaced.
    Replaced,
    /// Older than the tail; ignored.
    Dropped,
}

/// Bounded, strictly time-ordered window of candles for one instrument.
#[derive(Debug, Clone)]
pub struct CandleSeries {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleSeries {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "candle series capacity must be > 0");
        Self {
            candles: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert or replace per the tail policy. Invalid candles are rejected
    /// before the series is touched.
    pub fn upsert(&mut self, candle: Candle) -> Result<UpsertOutcome> {
        candle.validate()?;

        let outcome = match self.candles.back_mut() {
            Some(tail) if candle.timestamp == tail.timestamp => {
                *tail = candle;
                UpsertOutcome::Replaced
            }
            Some(tail) if candle.timestamp < tail.timestamp => UpsertOutcome::Dropped,
            _ => {
                self.candles.push_back(candle);
                if self.candles.len() > self.capacity {
                    self.candles.pop_front();
                    UpsertOutcome::Evicted
                } else {
                    UpsertOutcome::Appended
                }
            }
        };
        Ok(outcome)
    }

    /// Candles oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Candle> {
        self.candles.get(index)
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.back()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Close prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    /// Volumes, oldest first.
    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }
}

/// Per-instrument candle windows. Each series is independent; callers must
/// serialize `upsert` calls for the same instrument.
#[derive(Debug, Clone)]
pub struct CandleStore {
    series: HashMap<String, CandleSeries>,
    capacity: usize,
}

impl Default for CandleStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CandleStore {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "candle store capacity must be > 0");
        Self {
            series: HashMap::new(),
            capacity,
        }
    }

    pub fn upsert(&mut self, pair: &str, candle: Candle) -> Result<UpsertOutcome> {
        // Validate before creating an entry so a bad first candle leaves no trace.
        candle.validate()?;
        let capacity = self.capacity;
        let outcome = self
            .series
            .entry(pair.to_string())
            .or_insert_with(|| CandleSeries::new(capacity))
            .upsert(candle)?;

        if outcome == UpsertOutcome::Dropped {
            debug!(pair, timestamp = candle.timestamp, "Dropped out-of-order candle");
        }
        Ok(outcome)
    }

    pub fn get(&self, pair: &str) -> Option<&CandleSeries> {
        self.series.get(pair)
    }

    /// Copy of the current window for `pair`, oldest first. Empty if nothing
    /// is loaded.
    pub fn candles(&self, pair: &str) -> Vec<Candle> {
        self.get(pair)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of candles held for `pair`.
    pub fn len(&self, pair: &str) -> usize {
        self.get(pair).map_or(0, CandleSeries::len)
    }

    pub fn last(&self, pair: &str) -> Option<&Candle> {
        self.get(pair)?.last()
    }

    pub fn has_min_history(&self, pair: &str, n: usize) -> bool {
        self.len(pair) >= n
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
