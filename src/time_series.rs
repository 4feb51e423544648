//! Statistics of repeated concentration measurements over time.
//!
//! The input is a CSV table whose columns are time points (e.g. `30s`, `360s`, `900s`) and whose rows are
//! replicate measurements. Columns may have different lengths, empty cells are ignored.
use crate::{
    error::{SpecError, SpecResult},
    utils::{kahan_mean, kahan_sum, usize_to_f64},
};
use csv::{ReaderBuilder, Trim};
use log::warn;
use std::{fmt::Write, fs::File, io::Read, path::Path};

/// Factor of the standard error of the mean for a 95% confidence interval.
pub const CI95_FACTOR: f64 = 1.96;

/// Replicate measurements of one time point.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    label: String,
    values: Vec<f64>,
}
impl TimePoint {
    /// Creates a new [`TimePoint`].
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if no value is given.
    pub fn new(label: &str, values: Vec<f64>) -> SpecResult<Self> {
        if values.is_empty() {
            return Err(SpecError::Csv(format!("time point '{label}' has no values")));
        }
        Ok(Self {
            label: label.to_owned(),
            values,
        })
    }
    /// Returns the column label of this [`TimePoint`].
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
    /// Returns the measured values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
    /// Arithmetic mean of the values.
    #[must_use]
    pub fn mean(&self) -> f64 {
        kahan_mean(&self.values).unwrap_or_default()
    }
    /// Standard error of the mean (sample standard deviation with one degree of freedom, divided by
    /// `sqrt(n)`).
    ///
    /// Returns `None` for fewer than two values.
    #[must_use]
    pub fn sem(&self) -> Option<f64> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let mean = self.mean();
        let squares: Vec<f64> = self.values.iter().map(|v| (v - mean).powi(2)).collect();
        let variance = kahan_sum(&squares) / usize_to_f64(n - 1);
        Some((variance / usize_to_f64(n)).sqrt())
    }
    /// Half width of the 95% confidence interval of the mean. 0.0 for a single value.
    #[must_use]
    pub fn ci95(&self) -> f64 {
        self.sem().map_or(0.0, |sem| CI95_FACTOR * sem)
    }
}

/// Concentrations of all time points of a measurement series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}
impl TimeSeries {
    /// Read a [`TimeSeries`] from a CSV file.
    ///
    /// # Errors
    ///
    /// This function will return an error if the file cannot be read or [`TimeSeries::from_reader`] fails.
    pub fn from_csv(path: &Path) -> SpecResult<Self> {
        let file = File::open(path)
            .map_err(|e| SpecError::Csv(format!("cannot read file {}: {e}", path.display())))?;
        Self::from_reader(file).map_err(|e| SpecError::Csv(format!("{}: {e}", path.display())))
    }
    /// Read a [`TimeSeries`] from any reader delivering CSV data.
    ///
    /// Columns without any value are skipped with a warning.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if
    ///   - the data is not valid CSV.
    ///   - a non-empty cell cannot be parsed as number.
    ///   - no column contains a value.
    pub fn from_reader<R: Read>(reader: R) -> SpecResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| SpecError::Csv(e.to_string()))?
            .clone();
        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| SpecError::Csv(e.to_string()))?;
            for (column, field) in record.iter().enumerate().take(headers.len()) {
                if field.is_empty() {
                    continue;
                }
                let value = field.parse::<f64>().map_err(|e| {
                    SpecError::Csv(format!(
                        "row {}: cannot parse '{field}' in column {}: {e}",
                        row + 1,
                        column + 1
                    ))
                })?;
                if !value.is_nan() {
                    columns[column].push(value);
                }
            }
        }
        let mut points = Vec::new();
        for (label, values) in headers.iter().zip(columns) {
            if values.is_empty() {
                warn!("Time point '{label}' has no values. Skipping.");
                continue;
            }
            points.push(TimePoint::new(label, values)?);
        }
        if points.is_empty() {
            return Err(SpecError::Csv("no time point contains data".into()));
        }
        Ok(Self { points })
    }
    /// Returns the time points of this [`TimeSeries`].
    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }
    /// One summary line per time point: `<label>: Mean concentration = <mean> <unit>, 95% CI = ±<ci>`.
    #[must_use]
    pub fn report(&self, unit: &str) -> String {
        let mut report = String::new();
        for point in &self.points {
            let _ = writeln!(
                report,
                "{}: Mean concentration = {:.3} {unit}, 95% CI = ±{:.3}",
                point.label(),
                point.mean(),
                point.ci95()
            );
        }
        report
    }
}
