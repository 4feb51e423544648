//! Overlay plot of the spectra of a concentration series.
use super::{create_2d_plot_chart, draw_legend, plot_err, AxLims, Plottable};
use crate::{
    batch::numeric_csv_files,
    error::{SpecError, SpecResult},
    spectrum::Spectrum,
    utils::usize_to_f64,
};
use colorous::REDS;
use log::warn;
use plotters::{
    chart::SeriesLabelPosition,
    coord::Shift,
    element::PathElement,
    prelude::{DrawingArea, DrawingBackend},
    series::LineSeries,
    style::RGBColor,
};
use std::path::Path;

/// Position on the red color gradient of spectrum `index` out of `count`. The lightest 30% of the
/// gradient are not used.
#[must_use]
pub fn gradient_position(index: usize, count: usize) -> f64 {
    if count < 2 {
        return 1.0;
    }
    0.7f64.mul_add(usize_to_f64(index) / usize_to_f64(count - 1), 0.3)
}

/// All spectra of a folder, drawn in a common chart colored by concentration.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectraOverlay {
    spectra: Vec<(f64, Spectrum)>,
    x_lims: Option<AxLims>,
    y_lims: Option<AxLims>,
}
impl SpectraOverlay {
    /// Creates a new [`SpectraOverlay`] from (concentration, spectrum) pairs. The spectra are sorted by
    /// concentration.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Plot`] if no spectrum is given.
    pub fn new(mut spectra: Vec<(f64, Spectrum)>) -> SpecResult<Self> {
        if spectra.is_empty() {
            return Err(SpecError::Plot("no spectra to plot".into()));
        }
        spectra.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self {
            spectra,
            x_lims: None,
            y_lims: None,
        })
    }
    /// Load all files named `<concentration>.csv` of a folder. Unreadable files are skipped with a warning.
    ///
    /// # Errors
    ///
    /// This function will return an error if the folder cannot be read or contains no readable spectrum.
    pub fn from_folder(dir: &Path) -> SpecResult<Self> {
        let mut spectra = Vec::new();
        for (concentration, path) in numeric_csv_files(dir)? {
            match Spectrum::from_csv(&path) {
                Ok(spectrum) => spectra.push((concentration, spectrum)),
                Err(e) => warn!("Skipping {}: {e}", path.display()),
            }
        }
        Self::new(spectra)
    }
    /// Restrict the x axis (wavelength) to the given limits.
    pub fn set_x_lims(&mut self, lims: Option<AxLims>) {
        self.x_lims = lims;
    }
    /// Restrict the y axis to the given limits.
    pub fn set_y_lims(&mut self, lims: Option<AxLims>) {
        self.y_lims = lims;
    }
    /// Line color of each spectrum.
    #[must_use]
    pub fn colors(&self) -> Vec<RGBColor> {
        let n = self.spectra.len();
        (0..n)
            .map(|i| {
                let c = REDS.eval_continuous(gradient_position(i, n));
                RGBColor(c.r, c.g, c.b)
            })
            .collect()
    }
    /// Legend label of each spectrum.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.spectra.iter().map(|s| format!("{} µM", s.0)).collect()
    }
    fn lims(&self) -> Option<(AxLims, AxLims)> {
        let x = self.x_lims.or_else(|| {
            AxLims::from_values(self.spectra.iter().flat_map(|s| s.1.lambda_vec()))
        })?;
        let y = self.y_lims.or_else(|| {
            let mut y = AxLims::from_values(self.spectra.iter().flat_map(|s| s.1.data_vec()))?;
            y.expand_lim_range_by_factor(1.1);
            Some(y)
        })?;
        Some((x, y))
    }
}
impl Plottable for SpectraOverlay {
    fn plot_size(&self) -> (u32, u32) {
        (1600, 800)
    }
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> SpecResult<()> {
        let Some((x_lims, y_lims)) = self.lims() else {
            return Err(SpecError::Plot("invalid axis limits of spectra plot".into()));
        };
        let mut chart = create_2d_plot_chart(
            root,
            "Absorbance Plot for All Samples",
            x_lims,
            y_lims,
            ["Wavelength (nm)", "Absorbance"],
            None,
        )?;
        for ((_, spectrum), (color, label)) in self
            .spectra
            .iter()
            .zip(self.colors().into_iter().zip(self.labels()))
        {
            let visible = spectrum
                .iter()
                .copied()
                .filter(|p| p.0 >= x_lims.min && p.0 <= x_lims.max);
            chart
                .draw_series(LineSeries::new(visible, color))
                .map_err(plot_err)?
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::test_helper::test_helper::write_spectrum_csv;
    use approx::assert_abs_diff_eq;
    use std::fs;
    use tempfile::tempdir;
    #[test]
    fn gradient() {
        assert_abs_diff_eq!(gradient_position(0, 5), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(gradient_position(4, 5), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(gradient_position(2, 5), 0.65, epsilon = 1e-12);
        assert_eq!(gradient_position(0, 1), 1.0);
    }
    #[test]
    fn overlay() {
        let s = |v: f64| Spectrum::new(("wl", "abs"), vec![(400.0, v), (420.0, 2.0 * v)]).unwrap();
        let mut overlay = SpectraOverlay::new(vec![(10.0, s(1.0)), (0.5, s(0.1))]).unwrap();
        assert_eq!(overlay.labels(), vec!["0.5 µM", "10 µM"]);
        let colors = overlay.colors();
        assert_eq!(colors.len(), 2);
        // darker red for the higher concentration
        assert!(colors[1].1 < colors[0].1);
        let (x, y) = overlay.lims().unwrap();
        assert_eq!(x, AxLims { min: 400.0, max: 420.0 });
        assert!(y.min < 0.1 && y.max > 2.0);
        overlay.set_x_lims(AxLims::new(405.0, 415.0));
        overlay.set_y_lims(AxLims::new(0.0, 1.5));
        assert_eq!(
            overlay.lims(),
            Some((
                AxLims { min: 405.0, max: 415.0 },
                AxLims { min: 0.0, max: 1.5 }
            ))
        );
        assert!(SpectraOverlay::new(vec![]).is_err());
    }
    #[test]
    fn from_folder() {
        let dir = tempdir().unwrap();
        let header = ("Wavelength (nm)", "Absorbance");
        write_spectrum_csv(dir.path(), "2.csv", header, &[(400.0, 0.2)]);
        write_spectrum_csv(dir.path(), "1.csv", header, &[(400.0, 0.1)]);
        write_spectrum_csv(dir.path(), "reference.csv", header, &[(400.0, 0.0)]);
        fs::write(dir.path().join("3.csv"), "only_one_column\n1\n").unwrap();
        testing_logger::setup();
        let overlay = SpectraOverlay::from_folder(dir.path()).unwrap();
        assert_eq!(overlay.labels(), vec!["1 µM", "2 µM"]);
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert!(logs[0].body.starts_with("Skipping"));
        });
    }
}
