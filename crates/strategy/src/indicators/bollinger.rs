use serde::Serialize;

/// Upper/middle/lower band for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Where `price` sits inside the band: 0 at `lower`, 1 at `upper`.
    ///
    /// `None` when the band has zero width (flat window), where the position
    /// is 0/0.
    pub fn position(&self, price: f64) -> Option<f64> {
        let width = self.width();
        if width <= 0.0 || !width.is_finite() {
            return None;
        }
        Some((price - self.lower) / width)
    }
}

/// Bollinger Bands: rolling mean ± `k` population standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerIndicator {
    pub period: usize,
    pub k: f64,
}

impl Default for BollingerIndicator {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

impl BollingerIndicator {
    pub fn new(period: usize, k: f64) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        assert!(k >= 0.0, "Bollinger multiplier must be non-negative");
        Self { period, k }
    }

    pub fn min_len(&self) -> usize {
        self.period
    }

    /// Bands of the trailing window. Returns `None` with fewer than `period`
    /// closes.
    pub fn compute(&self, closes: &[f64]) -> Option<BollingerBands> {
        if closes.len() < self.period {
            return None;
        }
        Some(self.window(&closes[closes.len() - self.period..]))
    }

    /// Bands for every full window, oldest first.
    pub fn values(&self, closes: &[f64]) -> Vec<BollingerBands> {
        closes.windows(self.period).map(|w| self.window(w)).collect()
    }

    fn window(&self, window: &[f64]) -> BollingerBands {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        // Population variance (divide by n, not n - 1).
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let spread = self.k * variance.sqrt();
        BollingerBands {
            upper: mean + spread,
            middle: mean,
            lower: mean - spread,
        }
    }
}
