//! Handling the spectrolab CLI
//!
//! This module handles the command line parsing, the interactive prompts as well as basic information (e.g.
//! help dialog, version information, etc.).
use crate::{
    calibration::{
        config::CalibrationConfig,
        selector::{Inspection, WavelengthFit, WavelengthScan},
    },
    error::{SpecError, SpecResult},
    get_version,
    processing::absorbance::DEFAULT_REFERENCE,
};
use clap::{builder::Str, Parser, Subcommand};
use log::warn;
use rprompt::prompt_reply_from_bufread;
use std::{
    io::{BufRead, ErrorKind, Write},
    path::{Path, PathBuf},
};

/// Command line arguments of the spectrolab application.
#[derive(Parser, Debug)]
#[command(author, version = Str::from(&get_version()), about, long_about = None)]
pub struct Cli {
    /// processing step to run
    #[command(subcommand)]
    pub command: Command,
}

/// Processing steps of the spectrolab application.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// subtract background spectra from sample spectra (negative results are clamped to 0)
    Subtract {
        /// root folder of the background spectra (one subfolder per group)
        #[arg(short, long)]
        background: PathBuf,
        /// root folder of the sample spectra (one subfolder per group)
        #[arg(short, long)]
        samples: PathBuf,
        /// root folder of the results
        #[arg(short, long)]
        output: PathBuf,
    },
    /// average equally named spectra across replicate run folders
    Average {
        /// folder containing one subfolder per run
        #[arg(short, long)]
        input: PathBuf,
        /// folder of the averaged spectra
        #[arg(short, long)]
        output: PathBuf,
    },
    /// subtract the mean of a baseline wavelength window from every spectrum
    Normalize {
        /// root folder of the spectra (one subfolder per group)
        #[arg(short, long)]
        input: PathBuf,
        /// root folder of the normalized spectra
        #[arg(short, long)]
        output: PathBuf,
        /// lower limit of the baseline window (nm)
        #[arg(long, default_value_t = 570.0)]
        baseline_min: f64,
        /// upper limit of the baseline window (nm)
        #[arg(long, default_value_t = 740.0)]
        baseline_max: f64,
    },
    /// convert intensities into absorbances log10(reference / sample), overwriting the files in place
    Absorbance {
        /// folder containing one subfolder per group
        #[arg(short, long)]
        folder: PathBuf,
        /// file name of the reference spectrum within each group
        #[arg(short, long, default_value = DEFAULT_REFERENCE)]
        reference: String,
    },
    /// select the best calibration wavelength of a concentration series
    Calibrate(CalibrateArgs),
    /// plot all spectra named <concentration>.csv of a folder
    PlotSpectra {
        /// folder of the spectra
        #[arg(short, long)]
        folder: PathBuf,
        /// plot file (.png, .bmp, .jpg or .svg)
        #[arg(short, long, default_value = "spectra.png")]
        output: PathBuf,
        /// lower wavelength limit
        #[arg(long)]
        x_min: Option<f64>,
        /// upper wavelength limit
        #[arg(long)]
        x_max: Option<f64>,
        /// lower absorbance limit
        #[arg(long)]
        y_min: Option<f64>,
        /// upper absorbance limit
        #[arg(long)]
        y_max: Option<f64>,
    },
    /// statistics and plot of concentrations measured at several time points
    PlotTime {
        /// CSV file with one column per time point
        #[arg(short, long)]
        input: PathBuf,
        /// plot file (.png, .bmp, .jpg or .svg)
        #[arg(short, long, default_value = "concentration_vs_time.png")]
        output: PathBuf,
        /// concentration unit
        #[arg(short, long, default_value = "µM")]
        unit: String,
        /// plot title
        #[arg(short, long, default_value = crate::plot::time_series::DEFAULT_TITLE)]
        title: String,
    },
}

/// Arguments of the `calibrate` subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct CalibrateArgs {
    /// folder containing the sample files named <concentration>.csv. Prompted for if missing.
    #[arg(short, long)]
    pub data: Option<String>,
    /// CSV file of the calibration samples at the selected wavelength
    #[arg(short, long, default_value = "best_wavelength.csv")]
    pub output: PathBuf,
    /// YAML file with calibration settings. Command line values take precedence.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// lower limit of the scanned wavelength range (nm)
    #[arg(long)]
    pub range_min: Option<f64>,
    /// upper limit of the scanned wavelength range (nm)
    #[arg(long)]
    pub range_max: Option<f64>,
    /// number of wavelength columns averaged around each wavelength
    #[arg(short, long)]
    pub window: Option<usize>,
    /// minimum R² of a qualifying wavelength
    #[arg(long)]
    pub min_r2: Option<f64>,
    /// mean absorbance of a qualifying wavelength must exceed this value
    #[arg(long)]
    pub abs_min: Option<f64>,
    /// mean absorbance of a qualifying wavelength must stay below this value
    #[arg(long)]
    pub abs_max: Option<f64>,
    /// minimum number of samples of a qualifying wavelength
    #[arg(long)]
    pub min_samples: Option<usize>,
    /// folder of the plot files
    #[arg(short, long, default_value = ".")]
    pub plot_dir: PathBuf,
    /// do not create plot files
    #[arg(long)]
    pub no_plot: bool,
    /// do not ask for further wavelengths to inspect
    #[arg(long)]
    pub no_interactive: bool,
}
impl CalibrateArgs {
    /// Assemble the [`CalibrationConfig`]: defaults, overridden by the config file (if given), overridden
    /// by command line values.
    ///
    /// # Errors
    ///
    /// This function will return an [`SpecError::Config`] if the config file cannot be read or the
    /// resulting configuration is invalid.
    pub fn calibration_config(&self) -> SpecResult<CalibrationConfig> {
        let mut config = match &self.config {
            Some(path) => CalibrationConfig::from_file(path)?,
            None => CalibrationConfig::default(),
        };
        if let Some(v) = self.range_min {
            config.range_min = v;
        }
        if let Some(v) = self.range_max {
            config.range_max = v;
        }
        if let Some(v) = self.window {
            config.window = v;
        }
        if let Some(v) = self.min_r2 {
            config.min_r2 = v;
        }
        if let Some(v) = self.abs_min {
            config.abs_min = v;
        }
        if let Some(v) = self.abs_max {
            config.abs_max = v;
        }
        if let Some(v) = self.min_samples {
            config.min_samples = v;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Prompt shown when the data folder is missing or invalid.
pub const DATA_PROMPT: &str = "Please insert path to the folder of calibration samples:\n";
const INSPECT_PROMPT: &str = "Enter a wavelength (nm) to inspect, or press Enter to exit: ";

/// Evaluates if the passed string is an existing directory.
fn eval_data_dir_input(path: &str) -> Option<PathBuf> {
    let path = Path::new(path.trim());
    if path.is_dir() {
        Some(path.to_path_buf())
    } else {
        None
    }
}

/// Returns the value of an argument, prompting for it until it is valid.
///
/// # Attributes
/// * `func`:   Function to evaluate the input string of the given argument.
/// * `input`:  String-Option of the argument
/// * `prompt`: Prompt shown when the input is missing or invalid
/// * `reader`: Type that implements the `BufRead` trait to read from. May be stdin().lock() for user input
///   or a byte slice for tests
/// * `writer`: Type that implements the Write trait to write into.
///
/// # Errors
///
/// Returns an [`SpecError::Console`] if reading from `reader` fails (e.g. at end of input).
pub fn get_args<T>(
    func: fn(&str) -> Option<T>,
    input: Option<&str>,
    prompt: &str,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> SpecResult<T> {
    let mut prompt_str = prompt.to_owned();
    let mut input = input.map(ToOwned::to_owned);
    loop {
        if let Some(arg) = input.as_deref().and_then(func) {
            return Ok(arg);
        }
        if input.is_some() {
            prompt_str = format!("Invalid input!\n{prompt}");
        }
        let reply = prompt_reply_from_bufread(reader, writer, &prompt_str)
            .map_err(|e| SpecError::Console(format!("could not read input: {e}")))?;
        input = Some(reply);
    }
}

/// Returns the folder of calibration samples, prompting for it if `input` is missing or not an existing
/// directory.
///
/// # Errors
///
/// Returns an [`SpecError::Console`] if reading from `reader` fails (e.g. at end of input).
pub fn data_folder(
    input: Option<&str>,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> SpecResult<PathBuf> {
    get_args(eval_data_dir_input, input, DATA_PROMPT, reader, writer)
}

/// Interactive inspection of arbitrary wavelengths of a finished scan.
///
/// For every number entered, the nearest scanned wavelength is looked up. If it lies within the scan range
/// and its fit is not degenerate, `on_select` is called with its fit record. An empty line or the end of
/// input terminates the loop.
///
/// # Errors
///
/// This function will return an [`SpecError::Console`] if reading or writing the console fails.
pub fn inspect_wavelengths<F>(
    scan: &WavelengthScan,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    mut on_select: F,
) -> SpecResult<()>
where
    F: FnMut(&WavelengthFit) -> SpecResult<()>,
{
    let console_err = |e: std::io::Error| SpecError::Console(format!("console io failed: {e}"));
    loop {
        let reply = match prompt_reply_from_bufread(reader, writer, INSPECT_PROMPT) {
            Ok(reply) => reply,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => String::new(),
            Err(e) => return Err(console_err(e)),
        };
        let reply = reply.trim();
        if reply.is_empty() {
            writeln!(writer, "Exit.").map_err(console_err)?;
            return Ok(());
        }
        let inspection = reply.parse::<f64>().ok().and_then(|wl| scan.inspect(wl));
        match inspection {
            None => writeln!(writer, "Invalid input. Try again.").map_err(console_err)?,
            Some(Inspection::OutOfRange(wavelength)) => writeln!(
                writer,
                "Wavelength {wavelength:.3} nm is outside the specified range."
            )
            .map_err(console_err)?,
            Some(Inspection::InRange(fit)) => {
                writeln!(writer, "Closest wavelength: {:.3} nm", fit.wavelength)
                    .map_err(console_err)?;
                if fit.is_degenerate() {
                    writeln!(writer, "No valid data for this wavelength.").map_err(console_err)?;
                } else if let Err(e) = on_select(fit) {
                    warn!("Inspection of {:.3} nm failed: {e}", fit.wavelength);
                }
            }
        }
    }
}

/// Creates the intro banner.
#[must_use]
fn create_intro() -> String {
    let title = format!(
        "{: ^79}\n",
        "spectrolab - spectrometer data processing and calibration"
    );
    let line = format!("{}\n", "=".repeat(79));
    format!("{line}{title}{line}")
}

/// Show the intro banner and the version information.
pub fn show_intro() {
    let intro = create_intro();
    let version_str = format!("{: ^79}\n", "version ".to_owned() + &get_version());
    println!("{intro}{version_str}");
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{calibration::selector::SampleSet, spectrum::Spectrum};
    use assert_matches::assert_matches;
    use std::io::BufReader;
    use tempfile::{tempdir, NamedTempFile};

    fn scan() -> WavelengthScan {
        let samples = [1.0, 2.0, 3.0, 4.0, 5.0]
            .iter()
            .map(|c| {
                let s = Spectrum::new(
                    ("wl", "abs"),
                    vec![(395.0, 0.1 * c), (405.0, 0.1 * c), (410.0, 0.2 * c)],
                )
                .unwrap();
                (*c, s)
            })
            .collect();
        let set = SampleSet::from_spectra(samples).unwrap();
        let config = CalibrationConfig {
            window: 1,
            ..Default::default()
        };
        WavelengthScan::run(&set, &config).unwrap()
    }
    fn run_inspection(input: &[u8]) -> (String, Vec<f64>) {
        let scan = scan();
        let mut reader = BufReader::new(input);
        let mut writer: Vec<u8> = Vec::new();
        let mut selected = Vec::new();
        inspect_wavelengths(&scan, &mut reader, &mut writer, |fit| {
            selected.push(fit.wavelength);
            Ok(())
        })
        .unwrap();
        (String::from_utf8(writer).unwrap(), selected)
    }
    #[test]
    fn inspect_exit() {
        let (output, selected) = run_inspection(b"\r\n");
        assert!(output.ends_with("Exit.\n"));
        assert!(selected.is_empty());
    }
    #[test]
    fn inspect_end_of_input() {
        let (output, selected) = run_inspection(b"");
        assert!(output.ends_with("Exit.\n"));
        assert!(selected.is_empty());
    }
    #[test]
    fn inspect_sequence() {
        let (output, selected) = run_inspection(b"abc\n406\n300\n410.2\n\n");
        assert!(output.contains("Invalid input. Try again.\n"));
        assert!(output.contains("Closest wavelength: 405.000 nm\n"));
        assert!(output.contains("Wavelength 395.000 nm is outside the specified range.\n"));
        assert!(output.contains("Closest wavelength: 410.000 nm\n"));
        assert!(output.ends_with("Exit.\n"));
        assert_eq!(selected, vec![405.0, 410.0]);
    }
    #[test]
    fn inspect_nan() {
        let (output, selected) = run_inspection(b"nan\n\n");
        assert!(output.contains("Invalid input. Try again.\n"));
        assert!(selected.is_empty());
    }
    #[test]
    fn inspect_callback_error() {
        let scan = scan();
        let mut reader = BufReader::new(&b"405\n\n"[..]);
        let mut writer: Vec<u8> = Vec::new();
        testing_logger::setup();
        let result = inspect_wavelengths(&scan, &mut reader, &mut writer, |_| {
            Err(SpecError::Plot("no font".into()))
        });
        assert!(result.is_ok());
        testing_logger::validate(|logs| {
            assert_eq!(logs.len(), 1);
            assert_eq!(logs[0].body, "Inspection of 405.000 nm failed: Plot:no font");
        });
    }
    #[test]
    fn inspect_degenerate() {
        let degenerate = WavelengthFit {
            index: 0,
            wavelength: 400.0,
            r_squared: 0.0,
            mean_absorbance: 0.0,
            concentrations: vec![],
            absorbances: vec![],
            model: None,
        };
        let scan = WavelengthScan::from_fits(vec![degenerate], CalibrationConfig::default());
        let mut reader = BufReader::new(&b"401\n\n"[..]);
        let mut writer: Vec<u8> = Vec::new();
        let mut called = false;
        inspect_wavelengths(&scan, &mut reader, &mut writer, |_| {
            called = true;
            Ok(())
        })
        .unwrap();
        let output = String::from_utf8(writer).unwrap();
        assert!(output.contains("Closest wavelength: 400.000 nm\nNo valid data for this wavelength.\n"));
        assert!(!called);
    }
    #[test]
    fn data_dir_input() {
        let dir = tempdir().unwrap();
        let file = NamedTempFile::new().unwrap();
        assert_eq!(
            eval_data_dir_input(dir.path().to_str().unwrap()),
            Some(dir.path().to_path_buf())
        );
        assert_eq!(eval_data_dir_input(file.path().to_str().unwrap()), None);
        assert_eq!(eval_data_dir_input("./not/existing/folder"), None);
    }
    #[test]
    fn get_args_valid_input() {
        let dir = tempdir().unwrap();
        let mut reader = BufReader::new(&b""[..]);
        let mut writer: Vec<u8> = Vec::new();
        let path = get_args(
            eval_data_dir_input,
            dir.path().to_str(),
            DATA_PROMPT,
            &mut reader,
            &mut writer,
        )
        .unwrap();
        assert_eq!(path, dir.path());
        assert!(writer.is_empty());
    }
    #[test]
    fn get_args_prompt() {
        let dir = tempdir().unwrap();
        let input = format!("./not/existing\n{}\n", dir.path().display());
        let mut reader = BufReader::new(input.as_bytes());
        let mut writer: Vec<u8> = Vec::new();
        let path = data_folder(None, &mut reader, &mut writer).unwrap();
        assert_eq!(path, dir.path());
        let output = String::from_utf8(writer).unwrap();
        assert!(output.starts_with(DATA_PROMPT));
        assert!(output.contains("Invalid input!\n"));
    }
    #[test]
    fn get_args_end_of_input() {
        let mut reader = BufReader::new(&b""[..]);
        let mut writer: Vec<u8> = Vec::new();
        assert_matches!(
            get_args(
                eval_data_dir_input,
                Some("./not/existing"),
                DATA_PROMPT,
                &mut reader,
                &mut writer
            ),
            Err(SpecError::Console(_))
        );
    }
    fn calibrate_args(extra: &[&str]) -> CalibrateArgs {
        let mut args = vec!["spectrolab", "calibrate"];
        args.extend_from_slice(extra);
        match Cli::try_parse_from(args).unwrap().command {
            Command::Calibrate(args) => args,
            _ => panic!("wrong subcommand"),
        }
    }
    #[test]
    fn parse_calibrate() {
        let args = calibrate_args(&["--data", "samples", "--window", "3", "--no-plot"]);
        assert_eq!(args.data.as_deref(), Some("samples"));
        assert_eq!(args.output, PathBuf::from("best_wavelength.csv"));
        assert!(args.no_plot);
        assert!(!args.no_interactive);
        let config = args.calibration_config().unwrap();
        assert_eq!(config.window, 3);
        assert_eq!(config.range_min, 400.0);
    }
    #[test]
    fn calibrate_config_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "range_min: 390.0\nmin_samples: 4\n").unwrap();
        let path = file.path().to_str().unwrap();
        let config = calibrate_args(&["--config", path, "--min-samples", "6"])
            .calibration_config()
            .unwrap();
        assert_eq!(config.range_min, 390.0);
        assert_eq!(config.min_samples, 6);
        assert_matches!(
            calibrate_args(&["--range-min", "500"]).calibration_config(),
            Err(SpecError::Config(_))
        );
    }
    #[test]
    fn parse_processing_steps() {
        let cli = Cli::try_parse_from(["spectrolab", "absorbance", "--folder", "data"]).unwrap();
        assert_matches!(cli.command, Command::Absorbance { reference, .. } if reference == "0.csv");
        let cli = Cli::try_parse_from(["spectrolab", "normalize", "-i", "in", "-o", "out"]).unwrap();
        assert_matches!(
            cli.command,
            Command::Normalize { baseline_min, baseline_max, .. } if baseline_min == 570.0 && baseline_max == 740.0
        );
        assert!(Cli::try_parse_from(["spectrolab", "subtract", "--samples", "s"]).is_err());
        assert!(Cli::try_parse_from(["spectrolab"]).is_err());
    }
    #[test]
    fn intro() {
        let intro = create_intro();
        assert_eq!(intro.lines().count(), 3);
        assert!(intro.contains("spectrolab"));
    }
}
