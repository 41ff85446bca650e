/// RSI (Relative Strength Index) indicator.
///
/// Each value is computed from a plain (unsmoothed) window of the last
/// `period` price changes: `avg_gain = gains / period`,
/// `avg_loss = losses / period`, `rsi = 100 - 100 / (1 + rs)`.
///
/// When `avg_loss == 0` the ratio is replaced by the sentinel `rs = 100`,
/// so an all-gain window reads ≈ 99.01 rather than exactly 100.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

/// `rs` used in place of `avg_gain / avg_loss` when there were no losses.
pub const ZERO_LOSS_RS: f64 = 100.0;

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }

    /// Number of closes needed for one value.
    pub fn min_len(&self) -> usize {
        self.period + 1
    }

    /// RSI of the most recent window. Returns `None` if there are fewer than
    /// `period + 1` closes.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.min_len() {
            return None;
        }
        Some(self.at(closes, closes.len() - 1))
    }

    /// RSI for every window, one value per close from index `period` on.
    pub fn values(&self, closes: &[f64]) -> Vec<f64> {
        if closes.len() < self.min_len() {
            return Vec::new();
        }
        (self.period..closes.len())
            .map(|end| self.at(closes, end))
            .collect()
    }

    /// RSI of the window of changes ending at `closes[end]`.
    fn at(&self, closes: &[f64], end: usize) -> f64 {
        let mut gains = 0.0;
        let mut losses = 0.0;
        for j in end + 1 - self.period..=end {
            let change = closes[j] - closes[j - 1];
            if change > 0.0 {
                gains += change;
            } else {
                losses += change.abs();
            }
        }

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;
        let rs = if avg_loss == 0.0 {
            ZERO_LOSS_RS
        } else {
            avg_gain / avg_loss
        };
        100.0 - 100.0 / (1.0 + rs)
    }
}
