//! Small numeric helpers shared by the processing steps and the regression.
use kahan::{KahanSum, KahanSummator};

#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

/// Compensated sum of the given values.
#[must_use]
pub fn kahan_sum(values: &[f64]) -> f64 {
    let sum: KahanSum<f64> = values.iter().kahan_sum();
    sum.sum()
}

/// Arithmetic mean using a compensated sum.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn kahan_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(kahan_sum(values) / usize_to_f64(values.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;
    #[test]
    fn sum() {
        assert_eq!(kahan_sum(&[]), 0.0);
        assert_abs_diff_eq!(kahan_sum(&[0.1, 0.2, 0.3]), 0.6);
    }
    #[test]
    fn mean() {
        assert_eq!(kahan_mean(&[]), None);
        assert_eq!(kahan_mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }
}
