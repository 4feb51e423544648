#![warn(missing_docs)]
//! Trait for adding the possibility to generate a (x/y) plot of an element.
//!
//! The output format is chosen from the file extension: `.svg` creates a vector graphic, `.png`, `.bmp`
//! and `.jpg` a bitmap.
pub mod ax_lims;
pub mod calibration;
pub mod spectra;
pub mod time_series;

pub use ax_lims::AxLims;

use crate::error::{SpecError, SpecResult};
use plotters::{
    chart::{ChartBuilder, ChartContext, SeriesLabelPosition},
    coord::{cartesian::Cartesian2d, types::RangedCoordf64, Shift},
    prelude::{BitMapBackend, DrawingArea, DrawingBackend, IntoDrawingArea, SVGBackend},
    style::{Color, IntoFont, BLACK, WHITE},
};
use std::{fmt::Display, path::Path};
use strum::{Display as StrumDisplay, EnumIter};

/// Default size of a plot in pixels (width, height)
pub const DEFAULT_PLOT_SIZE: (u32, u32) = (1200, 800);

/// Enum to define the plotters backend used for creating a plot file
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, StrumDisplay)]
pub enum PltBackEnd {
    /// `BitmapBackend`. Used to create .png, .bmp, .jpg
    Bitmap,
    /// `SVGBackend`. Used to create .svg
    SVG,
}
impl PltBackEnd {
    /// Determine the backend from the extension (case-insensitive) of the given path.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Plot`] if the extension is missing or not supported.
    pub fn from_path(path: &Path) -> SpecResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Self::SVG),
            "png" | "bmp" | "jpg" => Ok(Self::Bitmap),
            _ => Err(SpecError::Plot(format!(
                "unsupported plot file extension of {} (use svg, png, bmp or jpg)",
                path.display()
            ))),
        }
    }
}

/// Convert a plotters error into a [`SpecError::Plot`].
pub(crate) fn plot_err<E: Display>(e: E) -> SpecError {
    SpecError::Plot(e.to_string())
}

/// Trait for elements which can be rendered into a plot file.
pub trait Plottable {
    /// Size of the plot in pixels (width, height).
    fn plot_size(&self) -> (u32, u32) {
        DEFAULT_PLOT_SIZE
    }
    /// Draw the plot onto the given (already cleared) drawing area.
    ///
    /// # Errors
    ///
    /// This function will return an error if drawing fails.
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> SpecResult<()>;

    /// Render this element into the file `f_path`. The backend is chosen from the file extension.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the file extension is not supported.
    ///   - drawing fails.
    ///   - the file cannot be written.
    fn to_plot(&self, f_path: &Path) -> SpecResult<()> {
        match PltBackEnd::from_path(f_path)? {
            PltBackEnd::Bitmap => {
                let root = BitMapBackend::new(f_path, self.plot_size()).into_drawing_area();
                root.fill(&WHITE).map_err(plot_err)?;
                self.draw(&root)?;
                root.present().map_err(plot_err)
            }
            PltBackEnd::SVG => {
                let root = SVGBackend::new(f_path, self.plot_size()).into_drawing_area();
                root.fill(&WHITE).map_err(plot_err)?;
                self.draw(&root)?;
                root.present().map_err(plot_err)
            }
        }
    }
}

/// Custom ticks of the x axis: number of ticks and label formatter.
pub(crate) type XTicks<'f> = (usize, &'f dyn Fn(&f64) -> String);

/// Build a cartesian 2D chart with caption, mesh and axis descriptions.
pub(crate) fn create_2d_plot_chart<'a, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
    caption: &str,
    x_bounds: AxLims,
    y_bounds: AxLims,
    label_desc: [&str; 2],
    x_ticks: Option<XTicks<'_>>,
) -> SpecResult<ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>> {
    let mut chart = ChartBuilder::on(root)
        .caption(caption, ("sans-serif", 32).into_font())
        .margin(30)
        .x_label_area_size(65)
        .y_label_area_size(90)
        .build_cartesian_2d(x_bounds.min..x_bounds.max, y_bounds.min..y_bounds.max)
        .map_err(plot_err)?;
    let mut mesh = chart.configure_mesh();
    mesh.x_desc(label_desc[0])
        .y_desc(label_desc[1])
        .label_style(("sans-serif", 22).into_font());
    if let Some((count, formatter)) = x_ticks {
        mesh.x_labels(count).x_label_formatter(formatter);
    }
    mesh.draw().map_err(plot_err)?;
    Ok(chart)
}

/// Draw the legend of all labeled series of the chart.
pub(crate) fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    position: SeriesLabelPosition,
) -> SpecResult<()> {
    chart
        .configure_series_labels()
        .position(position)
        .label_font(("sans-serif", 20).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)
}
