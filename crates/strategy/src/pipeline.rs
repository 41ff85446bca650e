use tracing::debug;

use common::{Candle, Result, Signal};

use crate::candles::{CandleStore, UpsertOutcome};
use crate::config::{IndicatorConfig, SignalFileConfig};
use crate::evaluator::SignalEvaluator;
use crate::snapshot::IndicatorSnapshot;

/// Candle store, indicator settings and evaluator for every watched pair.
///
/// Owned by a single dispatch task; not shared across threads.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    store: CandleStore,
    indicators: IndicatorConfig,
    evaluator: SignalEvaluator,
}

/// Tally of one `ingest` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub appended: usize,
    pub replaced: usize,
    pub dropped: usize,
}

impl SignalPipeline {
    pub fn new(cfg: &SignalFileConfig) -> Self {
        Self {
            store: CandleStore::new(cfg.history_capacity),
            indicators: cfg.indicators.clone(),
            evaluator: SignalEvaluator::new(cfg.signal.clone()),
        }
    }

    /// Feed a batch of candles (oldest first) into the pair's window.
    /// Stops at the first invalid candle and returns its validation error.
    pub fn ingest(&mut self, pair: &str, candles: &[Candle]) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        for candle in candles {
            match self.store.upsert(pair, *candle)? {
                UpsertOutcome::Appended | UpsertOutcome::Evicted => summary.appended += 1,
                UpsertOutcome::Replaced => summary.replaced += 1,
                UpsertOutcome::Dropped => summary.dropped += 1,
            }
        }
        debug!(
            pair,
            appended = summary.appended,
            replaced = summary.replaced,
            dropped = summary.dropped,
            len = self.store.len(pair),
            "Candles ingested"
        );
        Ok(summary)
    }

    /// Whether the pair has enough candles for a snapshot.
    pub fn is_warm(&self, pair: &str) -> bool {
        self.store
            .has_min_history(pair, self.indicators.min_history())
    }

    /// Indicator snapshot for the pair, or `None` while it is still warming up.
    pub fn snapshot(&self, pair: &str) -> Option<IndicatorSnapshot> {
        if !self.is_warm(pair) {
            return None;
        }
        let series = self.store.get(pair)?;
        IndicatorSnapshot::from_series(&series.closes(), &series.volumes(), &self.indicators)
    }

    /// Evaluate the pair against its latest close.
    pub fn evaluate(&self, pair: &str) -> Option<Signal> {
        let snapshot = self.snapshot(pair)?;
        let price = self.store.last(pair)?.close;
        self.evaluator.evaluate(pair, price, &snapshot)
    }

    pub fn store(&self) -> &CandleStore {
        &self.store
    }
}
