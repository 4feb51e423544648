//! Concentration over time with 95% confidence intervals.
use super::{create_2d_plot_chart, draw_legend, plot_err, AxLims, Plottable};
use crate::{
    error::{SpecError, SpecResult},
    time_series::TimeSeries,
    utils::usize_to_f64,
};
use plotters::{
    chart::SeriesLabelPosition,
    coord::Shift,
    element::{Circle, ErrorBar},
    prelude::{DrawingArea, DrawingBackend},
    style::{Color, BLACK, RED},
};

/// Default plot title of a concentration time series.
pub const DEFAULT_TITLE: &str = "Concentration vs Time";

/// Plot data of a [`TimeSeries`]. Time point `i` is drawn at x = `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPlot {
    title: String,
    unit: String,
    labels: Vec<String>,
    raw: Vec<(f64, f64)>,
    means: Vec<(f64, f64, f64)>, // (x, mean, 95% ci)
}
impl TimeSeriesPlot {
    /// Creates a new [`TimeSeriesPlot`].
    #[must_use]
    pub fn new(series: &TimeSeries, title: &str, unit: &str) -> Self {
        let mut raw = Vec::new();
        let mut means = Vec::new();
        let mut labels = Vec::new();
        for (i, point) in series.points().iter().enumerate() {
            let x = usize_to_f64(i);
            raw.extend(point.values().iter().map(|v| (x, *v)));
            means.push((x, point.mean(), point.ci95()));
            labels.push(point.label().to_owned());
        }
        Self {
            title: title.to_owned(),
            unit: unit.to_owned(),
            labels,
            raw,
            means,
        }
    }
    /// Tick label of the x coordinate. Empty for positions between time points.
    #[must_use]
    pub fn tick_label(&self, x: f64) -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = rounded as usize;
        self.labels.get(index).cloned().unwrap_or_default()
    }
    fn lims(&self) -> Option<(AxLims, AxLims)> {
        let x = AxLims::new(-0.5, usize_to_f64(self.labels.len()) - 0.5)?;
        let top = self
            .raw
            .iter()
            .map(|p| p.1)
            .chain(self.means.iter().map(|m| m.1 + m.2))
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max);
        let y = AxLims::create_useful_axlims(0.0, top * 1.1)?;
        Some((x, y))
    }
}
impl Plottable for TimeSeriesPlot {
    fn plot_size(&self) -> (u32, u32) {
        (1000, 750)
    }
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> SpecResult<()> {
        let Some((x_lims, y_lims)) = self.lims() else {
            return Err(SpecError::Plot("invalid axis limits of time series plot".into()));
        };
        let y_desc = format!("Concentration ({})", self.unit);
        let formatter = |x: &f64| self.tick_label(*x);
        let mut chart = create_2d_plot_chart(
            root,
            &self.title,
            x_lims,
            y_lims,
            ["Time point", &y_desc],
            Some((2 * self.labels.len() + 1, &formatter)),
        )?;
        chart
            .draw_series(
                self.raw
                    .iter()
                    .map(|p| Circle::new(*p, 5, BLACK.mix(0.7).filled())),
            )
            .map_err(plot_err)?;
        chart
            .draw_series(self.means.iter().map(|(x, mean, ci)| {
                ErrorBar::new_vertical(
                    *x,
                    mean - ci,
                    *mean,
                    mean + ci,
                    RED.filled().stroke_width(2),
                    12,
                )
            }))
            .map_err(plot_err)?
            .label("Mean ± 95% CI")
            .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));
        draw_legend(&mut chart, SeriesLabelPosition::UpperRight)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    fn series() -> TimeSeries {
        TimeSeries::from_reader("30s,360s,900s\n1.0,2.0,4.0\n3.0,2.0,\n".as_bytes()).unwrap()
    }
    #[test]
    fn data() {
        let plot = TimeSeriesPlot::new(&series(), DEFAULT_TITLE, "µM");
        assert_eq!(plot.labels, vec!["30s", "360s", "900s"]);
        assert_eq!(
            plot.raw,
            vec![(0.0, 1.0), (0.0, 3.0), (1.0, 2.0), (1.0, 2.0), (2.0, 4.0)]
        );
        assert_eq!(plot.means[0].1, 2.0);
        assert_eq!(plot.means[2], (2.0, 4.0, 0.0));
    }
    #[test]
    fn ticks() {
        let plot = TimeSeriesPlot::new(&series(), DEFAULT_TITLE, "µM");
        assert_eq!(plot.tick_label(0.0), "30s");
        assert_eq!(plot.tick_label(2.0), "900s");
        assert_eq!(plot.tick_label(0.5), "");
        assert_eq!(plot.tick_label(-0.5), "");
        assert_eq!(plot.tick_label(3.0), "");
    }
    #[test]
    fn lims() {
        let plot = TimeSeriesPlot::new(&series(), DEFAULT_TITLE, "µM");
        let (x, y) = plot.lims().unwrap();
        assert_eq!(x, AxLims { min: -0.5, max: 2.5 });
        assert_eq!(y.min, 0.0);
        assert!(y.max > 4.0);
    }
}
