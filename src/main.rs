use clap::Parser;
use env_logger::Env;
use log::info;
use spectrolab::{
    batch::{ensure_dir, BatchSummary},
    calibration::{selector::WavelengthFit, Calibration},
    console::{data_folder, inspect_wavelengths, show_intro, CalibrateArgs, Cli, Command},
    error::SpecResult,
    plot::{
        calibration::{FitPlot, R2Scan},
        spectra::SpectraOverlay,
        time_series::TimeSeriesPlot,
        AxLims, Plottable,
    },
    processing::{
        absorbance::convert_folders, average::average_replicates,
        normalize::{normalize_folders, BaselineWindow},
        subtract::subtract_folders,
    },
    time_series::TimeSeries,
};
use std::{
    io::{stdin, stdout, BufReader},
    path::Path,
};

fn print_summaries(summaries: &[BatchSummary]) {
    for summary in summaries {
        println!("{summary}");
    }
}

fn fit_plot(fit: &WavelengthFit, plot_dir: &Path) -> SpecResult<()> {
    if let Some(plot) = FitPlot::new(fit) {
        let path = plot_dir.join(plot.file_name());
        plot.to_plot(&path)?;
        println!("{}", plot.fit_label());
        println!("Plot saved: {}", path.display());
    }
    Ok(())
}

fn calibrate(args: &CalibrateArgs) -> SpecResult<()> {
    show_intro();
    let mut reader = BufReader::new(stdin().lock());
    let mut writer = stdout();
    let data = data_folder(args.data.as_deref(), &mut reader, &mut writer)?;
    let config = args.calibration_config()?;
    info!("Scanning {} - {} nm in {}", config.range_min, config.range_max, data.display());
    let calibration = Calibration::run(&data, &args.output, &config)?;
    println!("{}", calibration.report(&args.output));
    if !args.no_plot {
        ensure_dir(&args.plot_dir)?;
        let r2_path = args.plot_dir.join("r2_scan.png");
        R2Scan::new(calibration.scan(), calibration.best())?.to_plot(&r2_path)?;
        println!("Plot saved: {}", r2_path.display());
        fit_plot(calibration.best(), &args.plot_dir)?;
    }
    if !args.no_interactive {
        inspect_wavelengths(calibration.scan(), &mut reader, &mut writer, |fit| {
            if args.no_plot {
                if let Some(plot) = FitPlot::new(fit) {
                    println!("{}", plot.fit_label());
                }
                Ok(())
            } else {
                fit_plot(fit, &args.plot_dir)
            }
        })?;
    }
    Ok(())
}

fn main() -> SpecResult<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    match Cli::parse().command {
        Command::Subtract {
            background,
            samples,
            output,
        } => print_summaries(&subtract_folders(&background, &samples, &output)?),
        Command::Average { input, output } => {
            println!("{}", average_replicates(&input, &output)?);
        }
        Command::Normalize {
            input,
            output,
            baseline_min,
            baseline_max,
        } => {
            let window = BaselineWindow::new(baseline_min, baseline_max)?;
            print_summaries(&normalize_folders(&input, &output, window)?);
        }
        Command::Absorbance { folder, reference } => {
            print_summaries(&convert_folders(&folder, &reference)?);
        }
        Command::Calibrate(args) => calibrate(&args)?,
        Command::PlotSpectra {
            folder,
            output,
            x_min,
            x_max,
            y_min,
            y_max,
        } => {
            let mut overlay = SpectraOverlay::from_folder(&folder)?;
            overlay.set_x_lims(x_min.zip(x_max).and_then(|(min, max)| AxLims::new(min, max)));
            overlay.set_y_lims(y_min.zip(y_max).and_then(|(min, max)| AxLims::new(min, max)));
            overlay.to_plot(&output)?;
            println!("Plot saved: {}", output.display());
        }
        Command::PlotTime {
            input,
            output,
            unit,
            title,
        } => {
            let series = TimeSeries::from_csv(&input)?;
            print!("{}", series.report(&unit));
            TimeSeriesPlot::new(&series, &title, &unit).to_plot(&output)?;
            println!("Plot saved: {}", output.display());
        }
    }
    Ok(())
}
