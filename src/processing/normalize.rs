//! Baseline normalization of spectra.
//!
//! A wavelength window without absorption (by default 570 - 740 nm) is used as baseline. Its mean value
//! is subtracted from the whole spectrum.
use crate::{
    batch::{ensure_dir, list_csv_files, list_subfolders, BatchSummary},
    error::{SpecError, SpecResult},
    spectrum::Spectrum,
};
use log::{info, warn};
use std::path::Path;

/// Wavelength window (in nm, inclusive) used for the baseline estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaselineWindow {
    /// lower wavelength limit
    pub min: f64,
    /// upper wavelength limit
    pub max: f64,
}
impl Default for BaselineWindow {
    fn default() -> Self {
        Self {
            min: 570.0,
            max: 740.0,
        }
    }
}
impl BaselineWindow {
    /// Creates a new [`BaselineWindow`].
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if the limits are not finite or not in
    /// ascending order.
    pub fn new(min: f64, max: f64) -> SpecResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(SpecError::Config(format!(
                "invalid baseline window {min} - {max}"
            )));
        }
        Ok(Self { min, max })
    }
}

/// Subtract the baseline mean from the given spectrum.
///
/// Returns the corrected spectrum (value column labeled `<label> (baseline corrected)`) together with the
/// baseline mean.
///
/// # Errors
///
/// This function will return an [`SpecError::Spectrum`] if no row lies within the baseline window.
pub fn baseline_correct(spectrum: &Spectrum, window: BaselineWindow) -> SpecResult<(Spectrum, f64)> {
    let baseline = spectrum.mean_in_range(window.min, window.max).ok_or_else(|| {
        SpecError::Spectrum(format!(
            "no data within baseline window {} - {} nm",
            window.min, window.max
        ))
    })?;
    let mut corrected = spectrum.clone();
    corrected.map_values(|_, value| value - baseline);
    let label = format!("{} (baseline corrected)", spectrum.header().1);
    corrected.set_value_label(&label);
    Ok((corrected, baseline))
}

/// Baseline-correct all spectra in the subfolders of `input_root`.
///
/// Results are written to the same relative paths below `output_root`.
///
/// # Errors
///
/// This function will return an error if the input root cannot be read or an output folder cannot be
/// created.
pub fn normalize_folders(
    input_root: &Path,
    output_root: &Path,
    window: BaselineWindow,
) -> SpecResult<Vec<BatchSummary>> {
    ensure_dir(output_root)?;
    let groups = list_subfolders(input_root)?;
    info!("Detected subfolders: {}", groups.join(", "));
    let mut summaries = Vec::new();
    for group in groups {
        let input_dir = input_root.join(&group);
        let files = list_csv_files(&input_dir)?;
        if files.is_empty() {
            warn!("No CSV files found in subfolder {group}, skipping.");
            continue;
        }
        let output_dir = output_root.join(&group);
        ensure_dir(&output_dir)?;
        info!("Processing subfolder: {group}");
        let mut summary = BatchSummary::new(&group);
        for file_name in files {
            let result = Spectrum::from_csv(&input_dir.join(&file_name))
                .and_then(|spectrum| baseline_correct(&spectrum, window))
                .and_then(|(corrected, baseline)| {
                    corrected.to_csv(&output_dir.join(&file_name))?;
                    Ok(baseline)
                });
            match result {
                Ok(baseline) => {
                    info!("Processed {file_name} | baseline mean = {baseline:.4}");
                    summary.record_processed();
                }
                Err(e) => summary.skip(&file_name, &e.to_string()),
            }
        }
        summaries.push(summary);
    }
    Ok(summaries)
}
