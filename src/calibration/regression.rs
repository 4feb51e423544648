#![warn(missing_docs)]
//! Ordinary least squares regression of a straight line.
//!
//! All sums are calculated using compensated (Kahan) summation.
use crate::utils::{kahan_mean, kahan_sum};
use std::fmt::Display;

/// A straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    /// slope of the line
    pub slope: f64,
    /// y value at x = 0
    pub intercept: f64,
}
impl LinearFit {
    /// Fit a straight line to the given points using ordinary least squares.
    ///
    /// If all x values are equal the slope is 0.0 and the intercept is the mean of y (the minimum norm
    /// solution of the degenerate problem).
    ///
    /// Returns `None` if fewer than two points are given or `x` and `y` differ in length.
    #[must_use]
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return None;
        }
        let x_mean = kahan_mean(x)?;
        let y_mean = kahan_mean(y)?;
        let sxx: Vec<f64> = x.iter().map(|xi| (xi - x_mean).powi(2)).collect();
        let sxy: Vec<f64> = x
            .iter()
            .zip(y)
            .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
            .collect();
        let sxx = kahan_sum(&sxx);
        let sxy = kahan_sum(&sxy);
        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Some(Self {
            slope,
            intercept: slope.mul_add(-x_mean, y_mean),
        })
    }
    /// Evaluate the line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
    /// Residuals `y - predict(x)` of the given points.
    #[must_use]
    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y)
            .map(|(xi, yi)| yi - self.predict(*xi))
            .collect()
    }
    /// Coefficient of determination (R²) of this line for the given points.
    ///
    /// For points without variance in y the value is 1.0 if the line reproduces them exactly and 0.0
    /// otherwise. An empty point set yields 0.0.
    #[must_use]
    pub fn r_squared(&self, x: &[f64], y: &[f64]) -> f64 {
        let Some(y_mean) = kahan_mean(y) else {
            return 0.0;
        };
        let ss_res: Vec<f64> = self.residuals(x, y).iter().map(|r| r * r).collect();
        let ss_tot: Vec<f64> = y.iter().map(|yi| (yi - y_mean).powi(2)).collect();
        let ss_res = kahan_sum(&ss_res);
        let ss_tot = kahan_sum(&ss_tot);
        if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res > 0.0 {
            0.0
        } else {
            1.0
        }
    }
}
impl Display for LinearFit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "y = {:.4}x + {:.4}", self.slope, self.intercept)
    }
}

/// Population standard deviation (no degrees of freedom correction) of the given values.
///
/// Returns 0.0 for an empty slice.
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    let Some(mean) = kahan_mean(values) else {
        return 0.0;
    };
    let squares: Vec<f64> = values.iter().map(|v| (v - mean).powi(2)).collect();
    kahan_mean(&squares).unwrap_or_default().sqrt()
}
