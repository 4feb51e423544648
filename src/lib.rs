//! This is the documentation for the **spectrolab** software package. **spectrolab** processes spectrometer
//! CSV exports of a chemistry laboratory workflow: background subtraction, averaging of replicate runs,
//! baseline normalization, absorbance calculation and the selection of a calibration wavelength.
//!
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod calibration;
pub mod console;
pub mod error;
pub mod plot;
pub mod processing;
pub mod spectrum;
pub mod time_series;
pub mod utils;

/// Return the version information of the currently built spectrolab executable.
#[must_use]
pub fn get_version() -> String {
    format!("{} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_NAME"))
}
#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn get_ver() {
        let version_string = get_version();
        assert!(version_string.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(version_string.ends_with("(spectrolab)"));
    }
}
