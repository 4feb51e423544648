//! Thresholds and scan parameters of the calibration wavelength selection.
use crate::error::{SpecError, SpecResult};
use serde::Deserialize;
use std::{fs, path::Path};

/// Configuration of a calibration wavelength scan.
///
/// All fields have defaults, so a YAML file only needs to contain the values which differ, e.g.
///
/// ```yaml
/// range_min: 395.0
/// range_max: 430.0
/// min_samples: 6
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalibrationConfig {
    /// lower limit (nm) of the scanned wavelength range (inclusive)
    pub range_min: f64,
    /// upper limit (nm) of the scanned wavelength range (inclusive)
    pub range_max: f64,
    /// number of neighboring wavelength columns averaged around each scanned wavelength
    pub window: usize,
    /// minimum R² of the inlier fit of a qualifying wavelength
    pub min_r2: f64,
    /// mean inlier absorbance of a qualifying wavelength must be larger than this value
    pub abs_min: f64,
    /// mean inlier absorbance of a qualifying wavelength must be smaller than this value
    pub abs_max: f64,
    /// minimum number of inlier samples of a qualifying wavelength
    pub min_samples: usize,
}
impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            range_min: 400.0,
            range_max: 420.0,
            window: 5,
            min_r2: 0.9,
            abs_min: 0.0,
            abs_max: 2.0,
            min_samples: 5,
        }
    }
}
impl CalibrationConfig {
    /// Read a [`CalibrationConfig`] from a YAML file.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if
    ///   - the file cannot be read.
    ///   - the file cannot be parsed.
    ///   - the resulting configuration is invalid (see [`CalibrationConfig::validate`]).
    pub fn from_file(path: &Path) -> SpecResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SpecError::Config(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }
    /// Parse a [`CalibrationConfig`] from a YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if parsing or validation fails.
    pub fn from_yaml(yaml: &str) -> SpecResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| SpecError::Config(format!("parsing of configuration failed: {e}")))?;
        config.validate()?;
        Ok(config)
    }
    /// Check the consistency of this [`CalibrationConfig`].
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if
    ///   - the wavelength range is not finite or not in ascending order.
    ///   - the window is 0.
    ///   - `min_r2` is not within 0.0 ..= 1.0.
    ///   - `abs_min` is not smaller than `abs_max`.
    pub fn validate(&self) -> SpecResult<()> {
        if !self.range_min.is_finite() || !self.range_max.is_finite() {
            return Err(SpecError::Config("wavelength range must be finite".into()));
        }
        if self.range_min > self.range_max {
            return Err(SpecError::Config(
                "wavelength range must be in ascending order".into(),
            ));
        }
        if self.window == 0 {
            return Err(SpecError::Config("window must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.min_r2) {
            return Err(SpecError::Config("min_r2 must be within 0.0 - 1.0".into()));
        }
        if self.abs_min.is_nan() || self.abs_max.is_nan() || self.abs_min >= self.abs_max {
            return Err(SpecError::Config(
                "abs_min must be smaller than abs_max".into(),
            ));
        }
        Ok(())
    }
    /// Returns `true` if the given wavelength lies within the scan range (limits included).
    #[must_use]
    pub fn in_range(&self, wavelength: f64) -> bool {
        (self.range_min..=self.range_max).contains(&wavelength)
    }
    /// Half width of the averaging window (`floor(window / 2)`).
    #[must_use]
    pub const fn half_window(&self) -> usize {
        self.window / 2
    }
}
