//! Conversion of intensities into absorbances.
//!
//! The absorbance of a sample is calculated from its transmitted intensity `I` and the intensity `I0`
//! of a reference (blank) measurement as `A = log10(I0 / I)`.
use crate::{
    batch::{list_csv_files, list_subfolders, BatchSummary},
    error::{SpecError, SpecResult},
    spectrum::CsvTable,
};
use log::{info, warn};
use std::path::Path;

/// Default file name of the reference measurement within a group folder.
pub const DEFAULT_REFERENCE: &str = "0.csv";

/// Absorbance `log10(reference / sample)` of a single value pair.
///
/// The absorbance is undefined for a vanishing sample intensity or a non-positive ratio. In these cases
/// 0.0 is returned.
#[must_use]
pub fn log_ratio_value(reference: f64, sample: f64) -> f64 {
    if sample == 0.0 {
        return 0.0;
    }
    let ratio = reference / sample;
    if ratio > 0.0 {
        ratio.log10()
    } else {
        0.0
    }
}

/// Calculate the absorbance table of a sample relative to a reference table.
///
/// Only the value column is replaced. All other columns of the sample are kept.
///
/// # Errors
///
/// This function will return an error if
///   - the column labels of both tables do not match.
///   - both tables differ in their number of rows.
///   - a value of either table is not numeric.
pub fn log_ratio(reference: &CsvTable, sample: &CsvTable) -> SpecResult<CsvTable> {
    if reference.headers() != sample.headers() {
        return Err(SpecError::Spectrum("column names do not match".into()));
    }
    if reference.len() != sample.len() {
        return Err(SpecError::Spectrum(format!(
            "row count mismatch ({} vs {})",
            reference.len(),
            sample.len()
        )));
    }
    let absorbance: Vec<f64> = sample
        .values()?
        .into_iter()
        .zip(reference.values()?)
        .map(|(s, r)| log_ratio_value(r, s))
        .collect();
    sample.with_values(&absorbance)
}

/// Convert all sample files of every subfolder of `main_folder` into absorbances.
///
/// Each subfolder must contain a reference file named `reference_name`. All other CSV files are replaced
/// (overwritten in place) by their absorbance relative to the reference. Afterwards the values of the
/// reference file itself are set to 0.0. Columns other than the value column are written back unchanged.
///
/// # Errors
///
/// This function will return an error if the main folder or one of its subfolders cannot be read.
pub fn convert_folders(main_folder: &Path, reference_name: &str) -> SpecResult<Vec<BatchSummary>> {
    let mut summaries = Vec::new();
    for group in list_subfolders(main_folder)? {
        let group_dir = main_folder.join(&group);
        info!("Processing folder: {group}");
        let reference_path = group_dir.join(reference_name);
        if !reference_path.is_file() {
            warn!(
                "Reference file '{reference_name}' not found in folder '{group}'. Skipping this folder."
            );
            continue;
        }
        let reference = match CsvTable::from_csv(&reference_path)
            .and_then(|table| table.values().map(|_| table))
        {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Error while reading reference file {reference_name}: {e}. Skipping this folder.");
                continue;
            }
        };
        let mut summary = BatchSummary::new(&group);
        for file_name in list_csv_files(&group_dir)? {
            if file_name == reference_name {
                continue;
            }
            let path = group_dir.join(&file_name);
            let result = CsvTable::from_csv(&path)
                .and_then(|sample| log_ratio(&reference, &sample))
                .and_then(|absorbance| absorbance.to_csv(&path));
            match result {
                Ok(()) => {
                    info!("Processed and overwritten: {file_name}");
                    summary.record_processed();
                }
                Err(e) => summary.skip(&file_name, &e.to_string()),
            }
        }
        let zeroed = reference.with_values(&vec![0.0; reference.len()]);
        match zeroed.and_then(|table| table.to_csv(&reference_path)) {
            Ok(()) => info!("Set all values of '{reference_name}' to 0."),
            Err(e) => warn!("Unable to overwrite {reference_name}: {e}"),
        }
        if summary.processed() == 0 {
            info!("No additional files were processed in folder '{group}'.");
        }
        summaries.push(summary);
    }
    Ok(summaries)
}
