/// Exponential moving average over the whole series.
///
/// Seeded with `series[0]`, then `ema[i] = value*k + ema[i-1]*(1-k)` with
/// `k = 2/(period+1)`. The output has the same length as the input; the
/// first `period - 1` values are warm-up and carry no marker, so callers
/// should only rely on the last value.
pub fn ema(series: &[f64], period: usize) -> Vec<f64> {
    debug_assert!(period >= 1, "EMA period must be >= 1");
    let Some((&first, rest)) = series.split_first() else {
        return Vec::new();
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    out.push(first);

    let mut prev = first;
    for &value in rest {
        prev = value * k + prev * (1.0 - k);
        out.push(prev);
    }
    out
}

/// Last value of [`ema`], or `None` for an empty series.
pub fn ema_last(series: &[f64], period: usize) -> Option<f64> {
    ema(series, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_period_3_on_ramp() {
        // k = 0.5
        let out = ema(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        let expected = [1.0, 1.5, 2.25, 3.125, 4.0625];
        assert_eq!(out.len(), expected.len());
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {got}, want {want}");
        }
        assert!(out.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn ema_of_empty_is_empty() {
        assert!(ema(&[], 12).is_empty());
        assert!(ema_last(&[], 12).is_none());
    }

    #[test]
    fn ema_of_constant_is_constant() {
        let out = ema(&[7.0; 30], 12);
        assert!(out.iter().all(|v| (v - 7.0).abs() < 1e-12));
    }

    #[test]
    fn ema_single_value_is_seed() {
        assert_eq!(ema_last(&[42.0], 26), Some(42.0));
    }
}
