//! Folder traversal shared by the batch processing steps.
//!
//! All processing steps work on a folder layout of the form `root/<group>/<sample>.csv`. This module
//! lists groups and files in a deterministic (sorted) order and collects per-group results in a
//! [`BatchSummary`].
use crate::error::{SpecError, SpecResult};
use log::warn;
use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

/// Result of processing one folder group.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchSummary {
    group: String,
    processed: usize,
    skipped: Vec<(String, String)>,
}
impl BatchSummary {
    /// Creates a new, empty [`BatchSummary`] for the given group name.
    #[must_use]
    pub fn new(group: &str) -> Self {
        Self {
            group: group.to_owned(),
            ..Default::default()
        }
    }
    /// Count one successfully processed file.
    pub fn record_processed(&mut self) {
        self.processed += 1;
    }
    /// Record a skipped file together with the reason. A warning is emitted.
    pub fn skip(&mut self, file: &str, reason: &str) {
        warn!("Skipping {file}: {reason}");
        self.skipped.push((file.to_owned(), reason.to_owned()));
    }
    /// Returns the group (subfolder) name of this [`BatchSummary`].
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }
    /// Returns the number of processed files.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.processed
    }
    /// Returns the skipped files with their reasons.
    #[must_use]
    pub fn skipped(&self) -> &[(String, String)] {
        &self.skipped
    }
}
impl Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Group '{}': {} file(s) processed, {} skipped",
            self.group,
            self.processed,
            self.skipped.len()
        )
    }
}

fn read_dir_sorted(dir: &Path) -> SpecResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| SpecError::Batch(format!("cannot read folder {}: {e}", dir.display())))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| SpecError::Batch(format!("cannot read folder {}: {e}", dir.display())))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(ToOwned::to_owned)
}

/// List the names of all (non-hidden) subfolders of `root` in sorted order.
///
/// # Errors
///
/// This function will return an [`SpecError::Batch`] if the folder cannot be read.
pub fn list_subfolders(root: &Path) -> SpecResult<Vec<String>> {
    Ok(read_dir_sorted(root)?
        .into_iter()
        .filter(|p| p.is_dir())
        .filter_map(|p| file_name_of(&p))
        .filter(|n| !n.starts_with('.'))
        .collect())
}

/// List the names of all `.csv` files in `dir` in sorted order.
///
/// # Errors
///
/// This function will return an [`SpecError::Batch`] if the folder cannot be read.
pub fn list_csv_files(dir: &Path) -> SpecResult<Vec<String>> {
    Ok(read_dir_sorted(dir)?
        .into_iter()
        .filter(|p| p.is_file())
        .filter_map(|p| file_name_of(&p))
        .filter(|n| n.ends_with(".csv"))
        .collect())
}

/// Interpret a file name of the form `<number>.csv` as a concentration.
///
/// Returns `None` if the extension is not `.csv` or the stem is not a finite number.
#[must_use]
pub fn parse_concentration(file_name: &str) -> Option<f64> {
    let stem = file_name.strip_suffix(".csv")?;
    stem.trim()
        .parse::<f64>()
        .ok()
        .filter(|c| c.is_finite())
}

/// Collect all files named `<number>.csv` in `dir`, sorted by ascending number.
///
/// # Errors
///
/// This function will return an [`SpecError::Batch`] if the folder cannot be read.
pub fn numeric_csv_files(dir: &Path) -> SpecResult<Vec<(f64, PathBuf)>> {
    let mut files: Vec<(f64, PathBuf)> = list_csv_files(dir)?
        .into_iter()
        .filter_map(|name| parse_concentration(&name).map(|c| (c, dir.join(name))))
        .collect();
    files.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(files)
}

/// Create the given folder (and all parents) if it does not exist yet.
///
/// # Errors
///
/// This function will return an [`SpecError::Batch`] if the folder cannot be created.
pub fn ensure_dir(dir: &Path) -> SpecResult<()> {
    fs::create_dir_all(dir)
        .map_err(|e| SpecError::Batch(format!("cannot create folder {}: {e}", dir.display())))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::check_warnings;
    use tempfile::tempdir;
    #[test]
    fn summary() {
        testing_logger::setup();
        let mut s = BatchSummary::new("group_a");
        s.record_processed();
        s.record_processed();
        s.skip("1.csv", "row count mismatch");
        assert_eq!(s.group(), "group_a");
        assert_eq!(s.processed(), 2);
        assert_eq!(
            s.skipped(),
            &[("1.csv".to_owned(), "row count mismatch".to_owned())]
        );
        assert_eq!(
            format!("{s}"),
            "Group 'group_a': 2 file(s) processed, 1 skipped"
        );
        check_warnings(vec!["Skipping 1.csv: row count mismatch"]);
    }
    #[test]
    fn parse_concentration_test() {
        assert_eq!(parse_concentration("0.1.csv"), Some(0.1));
        assert_eq!(parse_concentration("10.csv"), Some(10.0));
        assert_eq!(parse_concentration("1e-2.csv"), Some(0.01));
        assert_eq!(parse_concentration("blank.csv"), None);
        assert_eq!(parse_concentration("5.txt"), None);
        assert_eq!(parse_concentration("nan.csv"), None);
    }
    #[test]
    fn listing() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("10.csv"), "").unwrap();
        fs::write(dir.path().join("2.csv"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("reference.csv"), "").unwrap();
        assert_eq!(list_subfolders(dir.path()).unwrap(), vec!["a", "b"]);
        assert_eq!(
            list_csv_files(dir.path()).unwrap(),
            vec!["10.csv", "2.csv", "reference.csv"]
        );
        let numeric = numeric_csv_files(dir.path()).unwrap();
        assert_eq!(
            numeric.iter().map(|n| n.0).collect::<Vec<f64>>(),
            vec![2.0, 10.0]
        );
        assert_eq!(numeric[0].1, dir.path().join("2.csv"));
    }
    #[test]
    fn listing_missing_folder() {
        assert!(list_subfolders(Path::new("./this_dir_does_not_exist")).is_err());
        assert!(list_csv_files(Path::new("./this_dir_does_not_exist")).is_err());
    }
    #[test]
    fn ensure_dir_test() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("x").join("y");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
