//! Selection of the calibration wavelength.
//!
//! For every wavelength of the scan range a calibration line (concentration -> absorbance) is fitted. The
//! absorbance is smoothed by averaging over neighboring wavelength columns. After a first fit, samples with a
//! residual larger than two standard deviations are rejected and the line is fitted again. The wavelength
//! with the most remaining samples (ties broken by R²) among all wavelengths passing the configured
//! thresholds is selected.
use super::{config::CalibrationConfig, regression::std_dev, regression::LinearFit};
use crate::{
    batch::numeric_csv_files,
    error::{SpecError, SpecResult},
    spectrum::{write_two_columns, Spectrum},
    utils::kahan_mean,
};
use log::{debug, info};
use nalgebra::DMatrix;
use std::{cmp::Ordering, path::Path};

/// Column label of the concentration column in the calibration output.
pub const CONCENTRATION_LABEL: &str = "Concentration (µg/mL)";

/// The measured calibration samples of one run.
///
/// Row 0 of the absorbance matrix always belongs to the synthetic anchor sample (concentration 0.0,
/// absorbance 0.0 at all wavelengths).
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    concentrations: Vec<f64>,
    wavelengths: Vec<f64>,
    absorbance: DMatrix<f64>, // [sample, wavelength]
}
impl SampleSet {
    /// Create a [`SampleSet`] from (concentration, spectrum) pairs.
    ///
    /// The samples are sorted by ascending concentration and every spectrum is sorted by wavelength. The
    /// wavelength axis is taken from the (sorted) first sample. The anchor sample is prepended.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Calibration`] if
    ///   - no sample is given.
    ///   - the spectra differ in their number of rows.
    pub fn from_spectra(mut samples: Vec<(f64, Spectrum)>) -> SpecResult<Self> {
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        for sample in &mut samples {
            sample.1.sort_by_wavelength();
        }
        let Some(first) = samples.first() else {
            return Err(SpecError::Calibration("no calibration samples found".into()));
        };
        let wavelengths = first.1.lambda_vec();
        if let Some(wrong) = samples.iter().find(|s| s.1.len() != wavelengths.len()) {
            return Err(SpecError::Calibration(format!(
                "sample with concentration {} has {} rows instead of {}",
                wrong.0,
                wrong.1.len(),
                wavelengths.len()
            )));
        }
        let rows: Vec<Vec<f64>> = samples.iter().map(|s| s.1.data_vec()).collect();
        let absorbance = DMatrix::from_fn(samples.len() + 1, wavelengths.len(), |r, c| {
            if r == 0 {
                0.0
            } else {
                rows[r - 1][c]
            }
        });
        let mut concentrations = vec![0.0];
        concentrations.extend(samples.iter().map(|s| s.0));
        Ok(Self {
            concentrations,
            wavelengths,
            absorbance,
        })
    }
    /// Load all files named `<concentration>.csv` from the given folder.
    ///
    /// Files with a non-numeric name are ignored.
    ///
    /// # Errors
    ///
    /// This function will return an error if the folder or one of the sample files cannot be read or
    /// [`SampleSet::from_spectra`] fails.
    pub fn from_folder(dir: &Path) -> SpecResult<Self> {
        let files = numeric_csv_files(dir)?;
        if files.is_empty() {
            return Err(SpecError::Calibration(format!(
                "no numeric sample files (<concentration>.csv) found in {}",
                dir.display()
            )));
        }
        let mut samples = Vec::with_capacity(files.len());
        for (concentration, path) in files {
            samples.push((concentration, Spectrum::from_csv(&path)?));
        }
        info!("Loaded {} calibration samples", samples.len());
        Self::from_spectra(samples)
    }
    /// Returns the concentrations (including the anchor at index 0).
    #[must_use]
    pub fn concentrations(&self) -> &[f64] {
        &self.concentrations
    }
    /// Returns the wavelength axis.
    #[must_use]
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }
    /// Returns the absorbance matrix indexed `[sample, wavelength]`.
    #[must_use]
    pub const fn absorbance(&self) -> &DMatrix<f64> {
        &self.absorbance
    }
    /// Per-sample mean absorbance over the wavelength columns `index - half ..= index + half`, clipped to
    /// the matrix edges.
    #[must_use]
    pub fn window_mean(&self, index: usize, half: usize) -> Vec<f64> {
        let n = self.wavelengths.len();
        if index >= n {
            return Vec::new();
        }
        let i_min = index.saturating_sub(half);
        let i_max = n.min(index + half + 1);
        self.absorbance
            .columns(i_min, i_max - i_min)
            .row_iter()
            .map(|row| kahan_mean(&row.iter().copied().collect::<Vec<f64>>()).unwrap_or_default())
            .collect()
    }
}

/// Fit result of a single wavelength.
#[derive(Debug, Clone, PartialEq)]
pub struct WavelengthFit {
    /// index into the wavelength axis
    pub index: usize,
    /// wavelength in nm
    pub wavelength: f64,
    /// R² of the inlier fit
    pub r_squared: f64,
    /// mean absorbance of the inliers
    pub mean_absorbance: f64,
    /// concentrations of the inliers
    pub concentrations: Vec<f64>,
    /// (window averaged) absorbances of the inliers
    pub absorbances: Vec<f64>,
    /// fitted line, `None` for skipped or degenerate wavelengths
    pub model: Option<LinearFit>,
}
impl WavelengthFit {
    fn degenerate(index: usize, wavelength: f64) -> Self {
        Self {
            index,
            wavelength,
            r_squared: 0.0,
            mean_absorbance: 0.0,
            concentrations: Vec::new(),
            absorbances: Vec::new(),
            model: None,
        }
    }
    /// Calculate the fit for the wavelength column `index` of the given [`SampleSet`].
    ///
    /// The result is degenerate (R² = 0, no model) if fewer than two samples remain for either fit.
    #[must_use]
    pub fn calculate(samples: &SampleSet, index: usize, half_window: usize) -> Self {
        let wavelength = samples.wavelengths.get(index).copied().unwrap_or(f64::NAN);
        let x = samples.concentrations();
        let y = samples.window_mean(index, half_window);
        let Some(first_fit) = LinearFit::fit(x, &y) else {
            return Self::degenerate(index, wavelength);
        };
        let residuals = first_fit.residuals(x, &y);
        let limit = 2.0 * std_dev(&residuals);
        let (x_in, y_in): (Vec<f64>, Vec<f64>) = x
            .iter()
            .zip(&y)
            .zip(&residuals)
            .filter(|(_, r)| r.abs() <= limit)
            .map(|((xi, yi), _)| (*xi, *yi))
            .unzip();
        let Some(model) = LinearFit::fit(&x_in, &y_in) else {
            return Self::degenerate(index, wavelength);
        };
        Self {
            index,
            wavelength,
            r_squared: model.r_squared(&x_in, &y_in),
            mean_absorbance: kahan_mean(&y_in).unwrap_or_default(),
            concentrations: x_in,
            absorbances: y_in,
            model: Some(model),
        }
    }
    /// Returns `true` if no model could be fitted for this wavelength.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.model.is_none()
    }
    /// Number of inlier samples.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.concentrations.len()
    }
    /// Returns `true` if the anchor sample (0, 0) is among the inliers.
    #[must_use]
    pub fn contains_anchor(&self) -> bool {
        self.points().iter().any(|p| *p == (0.0, 0.0))
    }
    /// Inlier samples as (concentration, absorbance) pairs.
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.concentrations
            .iter()
            .copied()
            .zip(self.absorbances.iter().copied())
            .collect()
    }
    /// Returns `true` if this fit passes all thresholds of the given configuration.
    #[must_use]
    pub fn qualifies(&self, config: &CalibrationConfig) -> bool {
        !self.is_degenerate()
            && self.r_squared >= config.min_r2
            && self.mean_absorbance > config.abs_min
            && self.mean_absorbance < config.abs_max
            && self.sample_count() >= config.min_samples
    }
    /// Write the inlier samples as calibration table (concentration, absorbance) to a CSV file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be written.
    pub fn to_csv(&self, path: &Path) -> SpecResult<()> {
        let label = format!("Absorbance at {:.3} nm", self.wavelength);
        write_two_columns(path, (CONCENTRATION_LABEL, &label), &self.points())
    }
}

/// Result of inspecting a requested wavelength.
#[derive(Debug, Clone, PartialEq)]
pub enum Inspection<'a> {
    /// the nearest wavelength lies within the scan range
    InRange(&'a WavelengthFit),
    /// the nearest wavelength (in nm) lies outside the scan range
    OutOfRange(f64),
}

/// Fit results of all wavelengths of a [`SampleSet`].
#[derive(Debug, Clone)]
pub struct WavelengthScan {
    config: CalibrationConfig,
    fits: Vec<WavelengthFit>,
}
impl WavelengthScan {
    /// Fit all wavelengths of the scan range. Wavelengths outside the range get a degenerate record.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if the configuration is invalid.
    pub fn run(samples: &SampleSet, config: &CalibrationConfig) -> SpecResult<Self> {
        config.validate()?;
        let fits: Vec<WavelengthFit> = samples
            .wavelengths()
            .iter()
            .enumerate()
            .map(|(index, wavelength)| {
                if config.in_range(*wavelength) {
                    WavelengthFit::calculate(samples, index, config.half_window())
                } else {
                    WavelengthFit::degenerate(index, *wavelength)
                }
            })
            .collect();
        debug!(
            "{} of {} wavelengths within scan range",
            fits.iter().filter(|f| config.in_range(f.wavelength)).count(),
            fits.len()
        );
        Ok(Self {
            config: config.clone(),
            fits,
        })
    }
    #[cfg(test)]
    pub(crate) fn from_fits(fits: Vec<WavelengthFit>, config: CalibrationConfig) -> Self {
        Self { config, fits }
    }
    /// Returns the fit records of all wavelengths.
    #[must_use]
    pub fn fits(&self) -> &[WavelengthFit] {
        &self.fits
    }
    /// Returns the configuration used for this scan.
    #[must_use]
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }
    /// Returns the fit records of all wavelengths within the scan range.
    pub fn in_range(&self) -> impl Iterator<Item = &WavelengthFit> {
        self.fits
            .iter()
            .filter(|f| self.config.in_range(f.wavelength))
    }
    /// Returns all fits within the scan range which pass the configured thresholds.
    #[must_use]
    pub fn candidates(&self) -> Vec<&WavelengthFit> {
        self.in_range()
            .filter(|f| f.qualifies(&self.config))
            .collect()
    }
    /// Select the best wavelength.
    ///
    /// Among all candidates the one with the largest number of inlier samples is chosen. Equal sample counts
    /// are decided by the larger R², a complete tie by the lower wavelength index.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Calibration`] if no wavelength meets all conditions.
    pub fn select_best(&self) -> SpecResult<&WavelengthFit> {
        let mut best: Option<&WavelengthFit> = None;
        for candidate in self.candidates() {
            let better = best.map_or(true, |b| {
                candidate
                    .sample_count()
                    .cmp(&b.sample_count())
                    .then(candidate.r_squared.total_cmp(&b.r_squared))
                    == Ordering::Greater
            });
            if better {
                best = Some(candidate);
            }
        }
        best.ok_or_else(|| {
            SpecError::Calibration(
                "No wavelength meets all conditions in the specified range.".into(),
            )
        })
    }
    /// Find the fit record of the wavelength nearest to the requested one.
    ///
    /// Returns `None` if the scan is empty or the requested wavelength is not finite.
    #[must_use]
    pub fn inspect(&self, wavelength: f64) -> Option<Inspection<'_>> {
        if !wavelength.is_finite() {
            return None;
        }
        let nearest = self.fits.iter().reduce(|nearest, f| {
            if (f.wavelength - wavelength).abs() < (nearest.wavelength - wavelength).abs() {
                f
            } else {
                nearest
            }
        })?;
        if self.config.in_range(nearest.wavelength) {
            Some(Inspection::InRange(nearest))
        } else {
            Some(Inspection::OutOfRange(nearest.wavelength))
        }
    }
}
