//! Calibration curve wavelength selection.
//!
//! Given absorbance spectra of samples with known concentration, find the wavelength where absorbance is
//! best described by a straight line of the concentration.
pub mod config;
pub mod regression;
pub mod selector;

use crate::error::SpecResult;
use config::CalibrationConfig;
use log::info;
use selector::{SampleSet, WavelengthFit, WavelengthScan};
use std::{fmt::Write, path::Path};

/// Outcome of a complete calibration run.
#[derive(Debug, Clone)]
pub struct Calibration {
    scan: WavelengthScan,
    best: usize,
}
impl Calibration {
    /// Load the samples from `data_dir`, scan all wavelengths and select the best one. The inlier samples
    /// of the selected wavelength are written to `output`.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the samples cannot be loaded.
    ///   - the configuration is invalid.
    ///   - no wavelength meets all conditions.
    ///   - the output file cannot be written.
    pub fn run(data_dir: &Path, output: &Path, config: &CalibrationConfig) -> SpecResult<Self> {
        let samples = SampleSet::from_folder(data_dir)?;
        let scan = WavelengthScan::run(&samples, config)?;
        let best = scan.select_best()?;
        info!(
            "{} of {} wavelengths in range qualify",
            scan.candidates().len(),
            scan.in_range().count()
        );
        best.to_csv(output)?;
        let best = best.index;
        Ok(Self { scan, best })
    }
    /// Returns the fit records of all wavelengths.
    #[must_use]
    pub const fn scan(&self) -> &WavelengthScan {
        &self.scan
    }
    /// Returns the fit record of the selected wavelength.
    #[must_use]
    pub fn best(&self) -> &WavelengthFit {
        &self.scan.fits()[self.best]
    }
    /// Human readable summary of the selected wavelength.
    #[must_use]
    pub fn report(&self, output: &Path) -> String {
        let best = self.best();
        let mut report = String::new();
        let _ = writeln!(report, "Best wavelength: {:.3} nm", best.wavelength);
        let _ = writeln!(
            report,
            "R² = {:.4}, Avg absorbance = {:.4}",
            best.r_squared, best.mean_absorbance
        );
        let _ = writeln!(report, "Result saved: {}", output.display());
        let _ = write!(report, "Number of valid samples = {}", best.sample_count());
        report
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        error::SpecError, spectrum::Spectrum,
        utils::test_helper::test_helper::write_spectrum_csv,
    };
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const WAVELENGTHS: [f64; 5] = [400.0, 405.0, 410.0, 415.0, 420.0];
    const CONCENTRATIONS: [f64; 6] = [0.1, 0.5, 1.0, 2.0, 5.0, 10.0];

    fn write_samples(dir: &Path) {
        let header = ("Wavelength (nm)", "Absorbance");
        let noise = [0.003, -0.002, 0.001, -0.001, 0.002, -0.003];
        let inner = [0.9, -0.75, 1.05, -0.9, 0.6, -1.2];
        let outer = [-1.05, 0.9, -0.6, 1.2, -0.9, 0.75];
        for (i, c) in CONCENTRATIONS.iter().enumerate() {
            // linear at 410 nm, the flank deviations cancel only in the full window around it
            let base = 0.1f64.mul_add(*c, noise[i]);
            let values = [
                base + outer[i],
                base + inner[i],
                base,
                base - inner[i],
                base - outer[i],
            ];
            let rows: Vec<(f64, f64)> = WAVELENGTHS.iter().copied().zip(values).collect();
            write_spectrum_csv(dir, &format!("{c}.csv"), header, &rows);
        }
        write_spectrum_csv(dir, "notes.csv", header, &[(400.0, 1.0)]);
    }
    #[test]
    fn end_to_end() {
        let data = tempdir().unwrap();
        write_samples(data.path());
        let out = tempdir().unwrap();
        let output = out.path().join("best_wavelength.csv");
        let config = CalibrationConfig {
            range_min: 400.0,
            range_max: 420.0,
            window: 5,
            min_r2: 0.9,
            min_samples: 5,
            ..Default::default()
        };
        let calibration = Calibration::run(data.path(), &output, &config).unwrap();
        let best = calibration.best();
        assert_eq!(best.wavelength, 410.0);
        assert!(best.r_squared >= 0.9);
        assert!(best.contains_anchor());
        let written = Spectrum::from_csv(&output).unwrap();
        assert_eq!(written.header().0, "Concentration (µg/mL)");
        assert_eq!(
            written.header().1,
            format!("Absorbance at {:.3} nm", best.wavelength)
        );
        assert_eq!(written.len(), 7);
        assert_eq!(written.len(), best.sample_count());

        let report = calibration.report(&output);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            format!("Best wavelength: {:.3} nm", best.wavelength)
        );
        assert!(lines[1].starts_with("R² = "));
        assert_eq!(lines[2], format!("Result saved: {}", output.display()));
        assert_eq!(
            lines[3],
            format!("Number of valid samples = {}", best.sample_count())
        );
    }
    #[test]
    fn no_qualifying_wavelength() {
        let data = tempdir().unwrap();
        write_samples(data.path());
        let out = tempdir().unwrap();
        let output = out.path().join("best_wavelength.csv");
        let config = CalibrationConfig {
            min_samples: 20,
            ..Default::default()
        };
        assert_matches!(
            Calibration::run(data.path(), &output, &config),
            Err(SpecError::Calibration(_))
        );
        assert!(!output.exists());
    }
    #[test]
    fn row_count_mismatch() {
        let data = tempdir().unwrap();
        write_samples(data.path());
        write_spectrum_csv(
            data.path(),
            "20.csv",
            ("Wavelength (nm)", "Absorbance"),
            &[(400.0, 1.0)],
        );
        let output = data.path().join("out.csv");
        assert_matches!(
            Calibration::run(data.path(), &output, &CalibrationConfig::default()),
            Err(SpecError::Calibration(_))
        );
    }
    #[test]
    fn empty_folder() {
        let data = tempdir().unwrap();
        fs::write(data.path().join("readme.txt"), "nothing").unwrap();
        let output = data.path().join("out.csv");
        assert_matches!(
            Calibration::run(data.path(), &output, &CalibrationConfig::default()),
            Err(SpecError::Calibration(_))
        );
    }
}
