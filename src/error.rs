#![warn(missing_docs)]
//! Spectrolab specific error structures
use std::{error::Error, fmt::Display};

/// Spectrolab application specific Result type
pub type SpecResult<T> = std::result::Result<T, SpecError>;

/// Errors that can be returned by various spectrolab functions.
#[derive(Debug, PartialEq, Eq)]
pub enum SpecError {
    /// errors while handling a single spectrum table
    Spectrum(String),
    /// errors while reading or writing CSV files
    Csv(String),
    /// errors while traversing folders of a batch run
    Batch(String),
    /// errors of the calibration wavelength selection (e.g. no qualifying wavelength)
    Calibration(String),
    /// errors while rendering a plot
    Plot(String),
    /// errors console io
    Console(String),
    /// invalid or unreadable configuration
    Config(String),
    /// errors not falling in one of the categories above
    Other(String),
}

impl Display for SpecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spectrum(m) => {
                write!(f, "Spectrum:{m}")
            }
            Self::Csv(m) => {
                write!(f, "Csv:{m}")
            }
            Self::Batch(m) => {
                write!(f, "Batch:{m}")
            }
            Self::Calibration(m) => {
                write!(f, "Calibration:{m}")
            }
            Self::Plot(m) => {
                write!(f, "Plot:{m}")
            }
            Self::Console(m) => {
                write!(f, "Console:{m}")
            }
            Self::Config(m) => {
                write!(f, "Config:{m}")
            }
            Self::Other(m) => write!(f, "Spectrolab Error:Other:{m}"),
        }
    }
}
impl Error for SpecError {}

impl std::convert::From<String> for SpecError {
    fn from(msg: String) -> Self {
        Self::Other(msg)
    }
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn from() {
        let error = SpecError::from("test".to_string());
        assert_eq!(error, SpecError::Other("test".to_string()));
    }
    #[test]
    fn display() {
        assert_eq!(
            format!("{}", SpecError::Spectrum("test".to_string())),
            "Spectrum:test"
        );
        assert_eq!(format!("{}", SpecError::Csv("test".to_string())), "Csv:test");
        assert_eq!(
            format!("{}", SpecError::Batch("test".to_string())),
            "Batch:test"
        );
        assert_eq!(
            format!("{}", SpecError::Calibration("test".to_string())),
            "Calibration:test"
        );
        assert_eq!(
            format!("{}", SpecError::Plot("test".to_string())),
            "Plot:test"
        );
        assert_eq!(
            format!("{}", SpecError::Console("test".to_string())),
            "Console:test"
        );
        assert_eq!(
            format!("{}", SpecError::Config("test".to_string())),
            "Config:test"
        );
        assert_eq!(
            format!("{}", SpecError::Other("test".to_string())),
            "Spectrolab Error:Other:test"
        );
    }
    #[test]
    fn debug() {
        assert_eq!(
            format!("{:?}", SpecError::Calibration("test".to_string())),
            "Calibration(\"test\")"
        );
    }
}
