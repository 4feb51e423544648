//! Module for additional computational capabilities
pub mod math_utils;
pub mod test_helper;
pub use math_utils::{kahan_mean, kahan_sum, usize_to_f64};
