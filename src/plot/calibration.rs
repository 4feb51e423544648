//! Plots of the calibration wavelength selection.
use super::{create_2d_plot_chart, draw_legend, plot_err, AxLims, Plottable};
use crate::{
    calibration::{
        regression::LinearFit,
        selector::{WavelengthFit, WavelengthScan},
    },
    error::{SpecError, SpecResult},
};
use plotters::{
    chart::SeriesLabelPosition,
    coord::Shift,
    element::{Circle, PathElement, TriangleMarker},
    prelude::{DrawingArea, DrawingBackend},
    series::LineSeries,
    style::{Color, BLUE, RED},
};

/// R² of all scanned wavelengths with the selected wavelength marked.
#[derive(Debug, Clone, PartialEq)]
pub struct R2Scan {
    points: Vec<(f64, f64)>,
    selected: f64,
}
impl R2Scan {
    /// Collect (wavelength, R²) of all wavelengths within the scan range.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Plot`] if no wavelength lies within the scan range.
    pub fn new(scan: &WavelengthScan, selected: &WavelengthFit) -> SpecResult<Self> {
        let points: Vec<(f64, f64)> = scan
            .in_range()
            .map(|f| (f.wavelength, f.r_squared))
            .collect();
        if points.is_empty() {
            return Err(SpecError::Plot("no wavelength within scan range".into()));
        }
        Ok(Self {
            points,
            selected: selected.wavelength,
        })
    }
    /// Returns the (wavelength, R²) pairs.
    #[must_use]
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
    fn x_lims(&self) -> Option<AxLims> {
        AxLims::from_values(self.points.iter().map(|p| p.0))
    }
    fn y_lims(&self) -> Option<AxLims> {
        let min = self.points.iter().map(|p| p.1).fold(0.0, f64::min);
        AxLims::new(min, 1.05)
    }
}
impl Plottable for R2Scan {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> SpecResult<()> {
        let (Some(x_lims), Some(y_lims)) = (self.x_lims(), self.y_lims()) else {
            return Err(SpecError::Plot("invalid axis limits of R² scan".into()));
        };
        let mut chart = create_2d_plot_chart(
            root,
            "R² vs Wavelength",
            x_lims,
            y_lims,
            ["Wavelength (nm)", "R²"],
            None,
        )?;
        chart
            .draw_series(LineSeries::new(self.points.iter().copied(), BLUE.stroke_width(2)))
            .map_err(plot_err)?
            .label("R²")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));
        chart
            .draw_series(LineSeries::new(
                [(self.selected, y_lims.min), (self.selected, y_lims.max)],
                RED.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(format!("Best: {:.3} nm", self.selected))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        draw_legend(&mut chart, SeriesLabelPosition::LowerRight)
    }
}

/// Scatter plot of the inlier samples of one wavelength together with the fitted line.
#[derive(Debug, Clone, PartialEq)]
pub struct FitPlot {
    wavelength: f64,
    samples: Vec<(f64, f64)>,
    anchor: Option<(f64, f64)>,
    model: LinearFit,
    r_squared: f64,
}
impl FitPlot {
    /// Create a [`FitPlot`] of the given fit. The anchor sample is shown with a separate marker.
    ///
    /// Returns `None` for a degenerate fit.
    #[must_use]
    pub fn new(fit: &WavelengthFit) -> Option<Self> {
        let model = fit.model?;
        let (anchor, samples): (Vec<(f64, f64)>, Vec<(f64, f64)>) =
            fit.points().into_iter().partition(|p| *p == (0.0, 0.0));
        Some(Self {
            wavelength: fit.wavelength,
            samples,
            anchor: anchor.first().copied(),
            model,
            r_squared: fit.r_squared,
        })
    }
    /// Default file name of this plot, e.g. `fit_410.000nm.png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("fit_{:.3}nm.png", self.wavelength)
    }
    /// Legend label of the fitted line.
    #[must_use]
    pub fn fit_label(&self) -> String {
        format!("{}, R² = {:.4}", self.model, self.r_squared)
    }
    /// End points of the fitted line from concentration 0 to the largest concentration.
    #[must_use]
    pub fn line(&self) -> [(f64, f64); 2] {
        let x_max = self.samples.iter().map(|p| p.0).fold(0.0, f64::max);
        [
            (0.0, self.model.predict(0.0)),
            (x_max, self.model.predict(x_max)),
        ]
    }
    fn lims(&self) -> Option<(AxLims, AxLims)> {
        let line = self.line();
        let all = self.samples.iter().chain(self.anchor.iter()).chain(line.iter());
        let mut x = AxLims::from_values(all.clone().map(|p| p.0))?;
        let mut y = AxLims::from_values(all.map(|p| p.1))?;
        x.expand_lim_range_by_factor(1.1);
        y.expand_lim_range_by_factor(1.1);
        Some((x, y))
    }
}
impl Plottable for FitPlot {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> SpecResult<()> {
        let Some((x_lims, y_lims)) = self.lims() else {
            return Err(SpecError::Plot("invalid axis limits of fit plot".into()));
        };
        let mut chart = create_2d_plot_chart(
            root,
            &format!("Linear Fit at {:.3} nm", self.wavelength),
            x_lims,
            y_lims,
            ["Concentration (µg/mL)", "Absorbance"],
            None,
        )?;
        chart
            .draw_series(
                self.samples
                    .iter()
                    .map(|p| Circle::new(*p, 6, BLUE.filled())),
            )
            .map_err(plot_err)?
            .label("Samples")
            .legend(|(x, y)| Circle::new((x + 10, y), 6, BLUE.filled()));
        if let Some(anchor) = self.anchor {
            chart
                .draw_series(std::iter::once(TriangleMarker::new(
                    anchor,
                    9,
                    RED.filled(),
                )))
                .map_err(plot_err)?
                .label("Anchor (0, 0)")
                .legend(|(x, y)| TriangleMarker::new((x + 10, y), 9, RED.filled()));
        }
        chart
            .draw_series(LineSeries::new(self.line(), RED.stroke_width(2)))
            .map_err(plot_err)?
            .label(self.fit_label())
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        draw_legend(&mut chart, SeriesLabelPosition::UpperLeft)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calibration::config::CalibrationConfig;
    use approx::assert_abs_diff_eq;
    fn fit() -> WavelengthFit {
        WavelengthFit {
            index: 1,
            wavelength: 405.0,
            r_squared: 0.9987,
            mean_absorbance: 0.3,
            concentrations: vec![0.0, 1.0, 2.0, 4.0],
            absorbances: vec![0.0, 0.11, 0.2, 0.41],
            model: Some(LinearFit {
                slope: 0.1,
                intercept: 0.005,
            }),
        }
    }
    #[test]
    fn fit_plot() {
        let plot = FitPlot::new(&fit()).unwrap();
        assert_eq!(plot.anchor, Some((0.0, 0.0)));
        assert_eq!(plot.samples.len(), 3);
        assert_eq!(plot.file_name(), "fit_405.000nm.png");
        assert_eq!(plot.fit_label(), "y = 0.1000x + 0.0050, R² = 0.9987");
        let line = plot.line();
        assert_abs_diff_eq!(line[0].1, 0.005);
        assert_eq!(line[1].0, 4.0);
        assert_abs_diff_eq!(line[1].1, 0.405);
        let (x, y) = plot.lims().unwrap();
        assert!(x.min < 0.0 && x.max > 4.0);
        assert!(y.min < 0.0 && y.max > 0.41);
    }
    #[test]
    fn fit_plot_without_anchor() {
        let mut f = fit();
        f.concentrations.remove(0);
        f.absorbances.remove(0);
        let plot = FitPlot::new(&f).unwrap();
        assert_eq!(plot.anchor, None);
        assert_eq!(plot.samples.len(), 3);
    }
    #[test]
    fn fit_plot_degenerate() {
        let mut f = fit();
        f.model = None;
        assert_eq!(FitPlot::new(&f), None);
    }
    #[test]
    fn r2_scan() {
        use crate::{calibration::selector::SampleSet, spectrum::Spectrum};
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|c| {
                let s = Spectrum::new(
                    ("wl", "abs"),
                    vec![(390.0, 0.1 * c), (400.0, 0.1 * c), (410.0, 0.2 * c)],
                )
                .unwrap();
                (*c, s)
            })
            .collect();
        let set = SampleSet::from_spectra(samples).unwrap();
        let scan = WavelengthScan::run(&set, &CalibrationConfig::default()).unwrap();
        let best = scan.select_best().unwrap();
        let plot = R2Scan::new(&scan, best).unwrap();
        let wavelengths: Vec<f64> = plot.points().iter().map(|p| p.0).collect();
        assert_eq!(wavelengths, vec![400.0, 410.0]);
        assert_eq!(plot.y_lims(), Some(AxLims { min: 0.0, max: 1.05 }));
        assert_eq!(plot.x_lims(), Some(AxLims { min: 400.0, max: 410.0 }));
    }
}
