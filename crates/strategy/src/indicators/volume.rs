/// Current volume relative to its trailing average.
///
/// The average covers the last `window` samples, the current one included.
#[derive(Debug, Clone)]
pub struct VolumeRatio {
    pub window: usize,
}

impl Default for VolumeRatio {
    fn default() -> Self {
        Self::new(20)
    }
}

impl VolumeRatio {
    pub fn new(window: usize) -> Self {
        assert!(window >= 1, "volume window must be >= 1");
        Self { window }
    }

    pub fn min_len(&self) -> usize {
        self.window
    }

    /// `current / mean(last window)`. `None` with fewer than `window`
    /// samples or when the trailing average is zero.
    pub fn compute(&self, volumes: &[f64]) -> Option<f64> {
        if volumes.len() < self.window {
            return None;
        }
        let trailing = &volumes[volumes.len() - self.window..];
        let average = trailing.iter().sum::<f64>() / self.window as f64;
        if average <= 0.0 {
            return None;
        }
        let current = *trailing.last()?;
        Some(current / average)
    }
}
