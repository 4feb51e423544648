//! Averaging of replicate measurement runs.
use crate::{
    batch::{ensure_dir, list_csv_files, list_subfolders, BatchSummary},
    error::{SpecError, SpecResult},
    spectrum::Spectrum,
    utils::kahan_mean,
};
use log::{info, warn};
use std::path::Path;

/// Column labels of an averaged spectrum.
pub const AVERAGE_HEADER: (&str, &str) = ("Wavelength (nm)", "Mean Intensity (a.u.)");

/// Calculate the row-wise mean of the given spectra.
///
/// The wavelength column is taken from the first spectrum.
///
/// # Errors
///
/// This function will return an [`SpecError::Spectrum`] if
///   - no spectrum is given.
///   - the spectra differ in their number of rows.
pub fn average_spectra(spectra: &[Spectrum]) -> SpecResult<Spectrum> {
    let Some(first) = spectra.first() else {
        return Err(SpecError::Spectrum("no spectra to average".into()));
    };
    if spectra.iter().any(|s| s.len() != first.len()) {
        return Err(SpecError::Spectrum(
            "spectra to average differ in row count".into(),
        ));
    }
    let columns: Vec<Vec<f64>> = spectra.iter().map(Spectrum::data_vec).collect();
    let data = first
        .iter()
        .enumerate()
        .map(|(row, d)| {
            let values: Vec<f64> = columns.iter().map(|c| c[row]).collect();
            (d.0, kahan_mean(&values).unwrap_or_default())
        })
        .collect();
    Spectrum::new(AVERAGE_HEADER, data)
}

/// Average equally named spectra over all run folders below `base_folder`.
///
/// The file names are taken from the first (sorted) subfolder. For every file name the files of all
/// subfolders are read; missing files are reported and left out. Files whose row count differs from the
/// first found file are also left out. The mean spectrum is written to `output_folder` using the same
/// file name.
///
/// # Errors
///
/// This function will return an error if
///   - the base folder cannot be read or contains no subfolders.
///   - the output folder cannot be created.
pub fn average_replicates(base_folder: &Path, output_folder: &Path) -> SpecResult<BatchSummary> {
    let runs = list_subfolders(base_folder)?;
    let Some(reference_run) = runs.first() else {
        return Err(SpecError::Batch(format!(
            "no run folders found in {}",
            base_folder.display()
        )));
    };
    ensure_dir(output_folder)?;
    let mut summary = BatchSummary::new(&base_folder.display().to_string());
    for file_name in list_csv_files(&base_folder.join(reference_run))? {
        let mut spectra: Vec<Spectrum> = Vec::new();
        for run in &runs {
            let path = base_folder.join(run).join(&file_name);
            if !path.is_file() {
                warn!("{file_name} not found in {run}");
                continue;
            }
            match Spectrum::from_csv(&path) {
                Ok(spectrum) => {
                    if let Some(first) = spectra.first() {
                        if first.len() != spectrum.len() {
                            warn!(
                                "{file_name} in {run} has {} rows instead of {}. Left out of the mean.",
                                spectrum.len(),
                                first.len()
                            );
                            continue;
                        }
                    }
                    spectra.push(spectrum);
                }
                Err(e) => warn!("{file_name} in {run} could not be read: {e}"),
            }
        }
        if spectra.is_empty() {
            summary.skip(&file_name, "not readable in any run folder");
            continue;
        }
        let save_path = output_folder.join(&file_name);
        match average_spectra(&spectra).and_then(|mean| mean.to_csv(&save_path)) {
            Ok(()) => {
                info!("Saved averaged file: {}", save_path.display());
                summary.record_processed();
            }
            Err(e) => summary.skip(&file_name, &e.to_string()),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::{check_warnings, write_spectrum_csv};
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::tempdir;
    #[test]
    fn average() {
        let s1 = Spectrum::new(("a", "b"), vec![(400.0, 1.0), (401.0, 2.0)]).unwrap();
        let s2 = Spectrum::new(("a", "b"), vec![(400.0, 3.0), (401.0, 6.0)]).unwrap();
        let s3 = Spectrum::new(("a", "b"), vec![(400.0, 2.0), (401.0, 1.0)]).unwrap();
        let mean = average_spectra(&[s1, s2, s3]).unwrap();
        assert_eq!(mean.header(), AVERAGE_HEADER);
        assert_eq!(mean.lambda_vec(), vec![400.0, 401.0]);
        assert_abs_diff_eq!(mean.data_vec()[0], 2.0);
        assert_abs_diff_eq!(mean.data_vec()[1], 3.0);
    }
    #[test]
    fn average_compensated() {
        let mut spectra = vec![Spectrum::new(("a", "b"), vec![(400.0, 1.0)]).unwrap()];
        spectra.extend((0..10).map(|_| Spectrum::new(("a", "b"), vec![(400.0, 1e-16)]).unwrap()));
        let mean = average_spectra(&spectra).unwrap();
        assert_abs_diff_eq!(mean.data_vec()[0], (1.0 + 1e-15) / 11.0, epsilon = 1e-18);
    }
    #[test]
    fn average_wrong_input() {
        assert!(average_spectra(&[]).is_err());
        let s1 = Spectrum::new(("a", "b"), vec![(400.0, 1.0), (401.0, 2.0)]).unwrap();
        let s2 = Spectrum::new(("a", "b"), vec![(400.0, 3.0)]).unwrap();
        assert!(average_spectra(&[s1, s2]).is_err());
    }
    #[test]
    fn replicates() {
        let root = tempdir().unwrap();
        let base = root.path().join("runs");
        let output = root.path().join("avg");
        for run in ["run1", "run2", "run3"] {
            fs::create_dir_all(base.join(run)).unwrap();
        }
        let header = ("Wavelength (nm)", "Intensity (a.u.)");
        write_spectrum_csv(&base.join("run1"), "1.csv", header, &[(400.0, 1.0), (401.0, 4.0)]);
        write_spectrum_csv(&base.join("run2"), "1.csv", header, &[(400.0, 3.0), (401.0, 8.0)]);
        write_spectrum_csv(&base.join("run3"), "1.csv", header, &[(400.0, 9.0)]);
        write_spectrum_csv(&base.join("run1"), "2.csv", header, &[(400.0, 1.0)]);

        testing_logger::setup();
        let summary = average_replicates(&base, &output).unwrap();
        assert_eq!(summary.processed(), 2);
        check_warnings(vec![
            "1.csv in run3 has 1 rows instead of 2. Left out of the mean.",
            "2.csv not found in run2",
            "2.csv not found in run3",
        ]);
        let mean = Spectrum::from_csv(&output.join("1.csv")).unwrap();
        assert_eq!(mean.data_vec(), vec![2.0, 6.0]);
        let single = Spectrum::from_csv(&output.join("2.csv")).unwrap();
        assert_eq!(single.data_vec(), vec![1.0]);
    }
    #[test]
    fn replicates_no_runs() {
        let root = tempdir().unwrap();
        assert!(average_replicates(root.path(), &root.path().join("out")).is_err());
    }
}
