//! Axis limits of a plot.
use approx::{abs_diff_ne, RelativeEq};
use itertools::{Itertools, MinMaxResult};
use log::warn;

/// Struct that holds the maximum and minimum values of an axis
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct AxLims {
    /// minimum value of the axis
    pub min: f64,
    /// maximum value of the axis
    pub max: f64,
}

impl AxLims {
    /// Creates a new [`AxLims`] struct.
    ///
    /// Returns `None` if one of the limits is not finite or `min >= max`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Option<Self> {
        let axlim = Self { min, max };
        if axlim.check_validity() {
            Some(axlim)
        } else {
            warn!("Invalid axis limits. Must be finite and min < max. Use default");
            None
        }
    }
    /// Creates [`AxLims`] spanning all finite values of the given data.
    ///
    /// Limits of data without a range are widened (see [`AxLims::create_useful_axlims`]). Returns `None` if
    /// no value is finite.
    #[must_use]
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        match values.into_iter().filter(|v| v.is_finite()).minmax() {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Self::create_useful_axlims(v, v),
            MinMaxResult::MinMax(min, max) => Self::create_useful_axlims(min, max),
        }
    }
    /// Checks the validity of the delivered min and max values.
    #[must_use]
    pub fn check_validity(self) -> bool {
        self.max.is_finite()
            && self.min.is_finite()
            && abs_diff_ne!(self.max, self.min)
            && self.max > self.min
    }
    /// Shifts the minimum and the maximum to lower and higher values, respectively. The range grows by
    /// `expansion_factor`.
    pub fn expand_lim_range_by_factor(&mut self, expansion_factor: f64) {
        if expansion_factor.is_normal() && expansion_factor.is_sign_positive() {
            let range = self.max - self.min;
            self.max += range * (expansion_factor - 1.) / 2.;
            self.min -= range * (expansion_factor - 1.) / 2.;
        } else {
            warn!("Cannot expand ax limits! Expansion factor must be normal and positive!");
        }
    }
    /// Create valid [`AxLims`] from possibly degenerate limits.
    ///
    /// Swapped limits are reordered. Equal limits are widened by half of their magnitude in both directions
    /// (or by 0.5 for zero).
    #[must_use]
    pub fn create_useful_axlims(min_in: f64, max_in: f64) -> Option<Self> {
        if !min_in.is_finite() || !max_in.is_finite() {
            return None;
        }
        let (mut min, mut max) = if max_in < min_in {
            (max_in, min_in)
        } else {
            (min_in, max_in)
        };
        if max.relative_eq(&min, f64::EPSILON, f64::EPSILON) {
            let half = if max.abs() > 0.0 { max.abs() / 2. } else { 0.5 };
            min -= half;
            max += half;
        }
        Self::new(min, max)
    }
}
