//! Background (dark signal) subtraction.
use crate::{
    batch::{ensure_dir, list_csv_files, list_subfolders, BatchSummary},
    error::{SpecError, SpecResult},
    spectrum::Spectrum,
};
use log::{info, warn};
use std::path::Path;

/// Subtract a background spectrum from a sample spectrum.
///
/// The wavelength column and the column labels are taken from the sample. Negative differences are
/// clamped to 0.0.
///
/// # Errors
///
/// This function will return an [`SpecError::Spectrum`] if both spectra differ in their number of rows.
pub fn subtract_background(sample: &Spectrum, background: &Spectrum) -> SpecResult<Spectrum> {
    if sample.len() != background.len() {
        return Err(SpecError::Spectrum(format!(
            "row count mismatch ({} vs {})",
            background.len(),
            sample.len()
        )));
    }
    let data = sample
        .iter()
        .zip(background.iter())
        .map(|(s, b)| (s.0, (s.1 - b.1).max(0.0)))
        .collect();
    Spectrum::new(sample.header(), data)
}

/// Subtract background spectra for all folder groups.
///
/// The subfolders of `sample_root` define the groups. For each group the equally named folder in
/// `background_root` must exist, otherwise the group is skipped. Every CSV file of the sample group is
/// paired with the equally named background file; the difference is written to the same file name in
/// `output_root/<group>`.
///
/// # Errors
///
/// This function will return an error if the sample root cannot be read or an output folder cannot be
/// created. Problems with single files only lead to skipped files.
pub fn subtract_folders(
    background_root: &Path,
    sample_root: &Path,
    output_root: &Path,
) -> SpecResult<Vec<BatchSummary>> {
    ensure_dir(output_root)?;
    let groups = list_subfolders(sample_root)?;
    info!("Found {} subfolder groups to process", groups.len());
    let mut summaries = Vec::new();
    for group in groups {
        let background_dir = background_root.join(&group);
        if !background_dir.is_dir() {
            warn!("Background folder '{group}' is missing. Skipping this group.");
            continue;
        }
        let sample_dir = sample_root.join(&group);
        let output_dir = output_root.join(&group);
        ensure_dir(&output_dir)?;
        info!("Processing folder group: {group}");
        let mut summary = BatchSummary::new(&group);
        for file_name in list_csv_files(&sample_dir)? {
            let background_path = background_dir.join(&file_name);
            if !background_path.is_file() {
                summary.skip(&file_name, "missing corresponding background file");
                continue;
            }
            let result = Spectrum::from_csv(&sample_dir.join(&file_name)).and_then(|sample| {
                let background = Spectrum::from_csv(&background_path)?;
                subtract_background(&sample, &background)
            });
            match result.and_then(|net| net.to_csv(&output_dir.join(&file_name))) {
                Ok(()) => summary.record_processed(),
                Err(e) => summary.skip(&file_name, &e.to_string()),
            }
        }
        info!("{summary}");
        summaries.push(summary);
    }
    Ok(summaries)
}
