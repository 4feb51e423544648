#![warn(missing_docs)]
//! Module for handling spectrometer spectra stored as CSV tables.
use crate::error::{SpecError, SpecResult};
use crate::utils::kahan_mean;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use std::fmt::{Debug, Display};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Structure for handling spectral data.
///
/// A [`Spectrum`] is a table of (wavelength, value) pairs as exported by the spectrometer software. The
/// value may be a raw intensity, a background corrected intensity or an absorbance depending on the
/// processing step. The column headers of the file the spectrum was read from are kept so that processed
/// files can be written back with the same labels.
#[derive(Clone, PartialEq)]
pub struct Spectrum {
    header: (String, String),
    data: Vec<(f64, f64)>, // (wavelength in nm, value)
}
impl Spectrum {
    /// Create a new [`Spectrum`] from column labels and data pairs.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Spectrum`] if the data is empty.
    pub fn new(header: (&str, &str), data: Vec<(f64, f64)>) -> SpecResult<Self> {
        if data.is_empty() {
            return Err(SpecError::Spectrum("spectrum data must not be empty".into()));
        }
        Ok(Self {
            header: (header.0.to_owned(), header.1.to_owned()),
            data,
        })
    }
    /// Create a new [`Spectrum`] from a CSV (comma-separated values) file.
    ///
    /// The file must start with a header row followed by numeric rows. The first column is interpreted
    /// as wavelength, the second column as value. Further columns are ignored.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the file path is not found or could not be read.
    ///   - the file has fewer than two columns.
    ///   - a value could not be parsed.
    ///   - the file contains no data rows.
    pub fn from_csv(path: &Path) -> SpecResult<Self> {
        let file = File::open(path)
            .map_err(|e| SpecError::Csv(format!("cannot read file {}: {e}", path.display())))?;
        Self::from_reader(file)
            .map_err(|e| SpecError::Csv(format!("{}: {e}", path.display())))
    }
    /// Create a new [`Spectrum`] from any reader delivering CSV data.
    ///
    /// # Errors
    ///
    /// See [`Spectrum::from_csv`].
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
        if headers.len() < 2 {
            return Err(SpecError::Csv("file has fewer than 2 columns".into()));
        }
        let mut datas: Vec<(f64, f64)> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| SpecError::Csv(e.to_string()))?;
            let lambda = parse_field(record.get(0), row, 0)?;
            let value = parse_field(record.get(1), row, 1)?;
            datas.push((lambda, value));
        }
        if datas.is_empty() {
            return Err(SpecError::Csv("no csv data was found in file".into()));
        }
        Ok(Self {
            header: (headers[0].to_owned(), headers[1].to_owned()),
            data: datas,
        })
    }
    /// Write this [`Spectrum`] as a two-column CSV file including its header.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if the file cannot be created or written.
    pub fn to_csv(&self, path: &Path) -> SpecResult<()> {
        write_two_columns(path, (&self.header.0, &self.header.1), &self.data)
    }
    /// Returns the column labels (wavelength label, value label) of this [`Spectrum`].
    #[must_use]
    pub fn header(&self) -> (&str, &str) {
        (&self.header.0, &self.header.1)
    }
    /// Replace the label of the value column.
    pub fn set_value_label(&mut self, label: &str) {
        label.clone_into(&mut self.header.1);
    }
    /// Returns the number of rows of this [`Spectrum`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }
    /// Returns `true` if this [`Spectrum`] has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    /// Get a 1D vector of all wavelengths.
    #[must_use]
    pub fn lambda_vec(&self) -> Vec<f64> {
        self.data.iter().map(|data| data.0).collect()
    }
    /// Get a 1D vector of all y values.
    #[must_use]
    pub fn data_vec(&self) -> Vec<f64> {
        self.data.iter().map(|data| data.1).collect()
    }
    /// Returns the iterator of this [`Spectrum`].
    pub fn iter(&self) -> std::slice::Iter<'_, (f64, f64)> {
        self.data.iter()
    }
    /// Sort the rows by ascending wavelength.
    pub fn sort_by_wavelength(&mut self) {
        self.data.sort_by(|a, b| a.0.total_cmp(&b.0));
    }
    /// Replace each value by the result of the given closure `f(wavelength, value)`.
    pub fn map_values<F>(&mut self, mut f: F)
    where
        F: FnMut(f64, f64) -> f64,
    {
        for d in &mut self.data {
            d.1 = f(d.0, d.1);
        }
    }
    /// Mean value over all rows with `min <= wavelength <= max`.
    ///
    /// Returns `None` if no row lies within the given window.
    #[must_use]
    pub fn mean_in_range(&self, min: f64, max: f64) -> Option<f64> {
        let values: Vec<f64> = self
            .data
            .iter()
            .filter(|d| (min..=max).contains(&d.0))
            .map(|d| d.1)
            .collect();
        kahan_mean(&values)
    }
}

fn parse_field(field: Option<&str>, row: usize, column: usize) -> SpecResult<f64> {
    let field = field.ok_or_else(|| {
        SpecError::Csv(format!("row {}: column {} is missing", row + 1, column + 1))
    })?;
    field.parse::<f64>().map_err(|e| {
        SpecError::Csv(format!(
            "row {}: cannot parse '{field}' in column {}: {e}",
            row + 1,
            column + 1
        ))
    })
}

/// Write a two-column CSV file with the given header labels and rows.
///
/// # Errors
///
/// This function will return an [`SpecError::Csv`] if the file cannot be created or written.
pub fn write_two_columns(path: &Path, header: (&str, &str), rows: &[(f64, f64)]) -> SpecResult<()> {
    let map_err = |e: csv::Error| SpecError::Csv(format!("writing {} failed: {e}", path.display()));
    let mut writer = WriterBuilder::new().from_path(path).map_err(map_err)?;
    writer.write_record([header.0, header.1]).map_err(map_err)?;
    for (x, y) in rows {
        writer
            .write_record([x.to_string(), y.to_string()])
            .map_err(map_err)?;
    }
    writer
        .flush()
        .map_err(|e| SpecError::Csv(format!("writing {} failed: {e}", path.display())))
}

/// A CSV table whose second column holds numeric values.
///
/// In contrast to [`Spectrum`] all columns and fields are kept verbatim, so a file can be rewritten with
/// only its value column replaced.
#[derive(Debug, Clone)]
pub struct CsvTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
}
impl CsvTable {
    /// Read a [`CsvTable`] from a CSV file.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if
    ///   - the file cannot be read.
    ///   - the file has fewer than two columns.
    ///   - the file contains no data rows.
    pub fn from_csv(path: &Path) -> SpecResult<Self> {
        let file = File::open(path)
            .map_err(|e| SpecError::Csv(format!("cannot read file {}: {e}", path.display())))?;
        Self::from_reader(file).map_err(|e| SpecError::Csv(format!("{}: {e}", path.display())))
    }
    /// Read a [`CsvTable`] from any reader delivering CSV data.
    ///
    /// # Errors
    ///
    /// See [`CsvTable::from_csv`].
    pub fn from_reader<R: Read>(reader: R) -> SpecResult<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let headers = reader
            .headers()
            .map_err(|e| SpecError::Csv(e.to_string()))?
            .clone();
        if headers.len() < 2 {
            return Err(SpecError::Csv("file has fewer than 2 columns".into()));
        }
        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, csv::Error>>()
            .map_err(|e| SpecError::Csv(e.to_string()))?;
        if records.is_empty() {
            return Err(SpecError::Csv("no csv data was found in file".into()));
        }
        Ok(Self { headers, records })
    }
    /// Returns the column labels.
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.headers.iter().collect()
    }
    /// Returns the number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
    /// Returns `true` if the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    /// Parse the value column.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if a value is missing or not numeric.
    pub fn values(&self) -> SpecResult<Vec<f64>> {
        self.records
            .iter()
            .enumerate()
            .map(|(row, record)| parse_field(record.get(1).map(str::trim), row, 1))
            .collect()
    }
    /// Returns a copy of this table with the value column replaced by `values`.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Spectrum`] if the number of values differs from the
    /// number of rows.
    pub fn with_values(&self, values: &[f64]) -> SpecResult<Self> {
        if values.len() != self.records.len() {
            return Err(SpecError::Spectrum(format!(
                "row count mismatch ({} vs {})",
                self.records.len(),
                values.len()
            )));
        }
        let records = self
            .records
            .iter()
            .zip(values)
            .map(|(record, value)| {
                record
                    .iter()
                    .enumerate()
                    .map(|(i, field)| if i == 1 { value.to_string() } else { field.to_owned() })
                    .collect::<StringRecord>()
            })
            .collect();
        Ok(Self {
            headers: self.headers.clone(),
            records,
        })
    }
    /// Write this table as CSV file.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Csv`] if the file cannot be created or written.
    pub fn to_csv(&self, path: &Path) -> SpecResult<()> {
        let map_err = |e: csv::Error| SpecError::Csv(format!("writing {} failed: {e}", path.display()));
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(map_err)?;
        writer.write_record(&self.headers).map_err(map_err)?;
        for record in &self.records {
            writer.write_record(record).map_err(map_err)?;
        }
        writer
            .flush()
            .map_err(|e| SpecError::Csv(format!("writing {} failed: {e}", path.display())))
    }
}

impl Debug for Spectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Spectrum '{}' / '{}' with {} rows",
            self.header.0,
            self.header.1,
            self.data.len()
        )
    }
}
impl Display for Spectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}, {}", self.header.0, self.header.1)?;
        for value in &self.data {
            writeln!(f, "{:7.2} -> {}", value.0, value.1)?;
        }
        Ok(())
    }
}
