use serde::{Deserialize, Serialize};

use super::ema::ema;

/// How the fast EMA is paired with the slow EMA when forming the MACD line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdAlignment {
    /// `macd[i] = ema_fast[i + (slow - fast)] - ema_slow[i]`.
    ///
    /// The fast EMA is shifted forward by `slow - fast` bars. This is the
    /// behaviour the alerting rules were tuned against.
    #[default]
    Offset,
    /// `macd[i] = ema_fast[i] - ema_slow[i]`.
    SameIndex,
}

/// MACD line (fast EMA minus slow EMA) over close prices.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub alignment: MacdAlignment,
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self::new(12, 26)
    }
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1, "MACD fast period must be >= 1");
        assert!(fast < slow, "MACD fast period must be less than slow period");
        Self {
            fast,
            slow,
            alignment: MacdAlignment::Offset,
        }
    }

    pub fn with_alignment(mut self, alignment: MacdAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Number of closes needed before the line is reported.
    pub fn min_len(&self) -> usize {
        self.slow
    }

    fn offset(&self) -> usize {
        match self.alignment {
            MacdAlignment::Offset => self.slow - self.fast,
            MacdAlignment::SameIndex => 0,
        }
    }

    /// The full MACD line, oldest first. With [`MacdAlignment::Offset`] it is
    /// `slow - fast` values shorter than the input.
    pub fn line(&self, closes: &[f64]) -> Vec<f64> {
        let offset = self.offset();
        if closes.len() <= offset {
            return Vec::new();
        }
        let ema_fast = ema(closes, self.fast);
        let ema_slow = ema(closes, self.slow);

        (0..closes.len() - offset)
            .map(|i| ema_fast[i + offset] - ema_slow[i])
            .collect()
    }

    /// Most recent MACD value. Returns `None` with fewer than `slow` closes.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_len() {
            return None;
        }
        self.line(closes).last().copied()
    }
}
