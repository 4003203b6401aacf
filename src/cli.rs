//! Command-line interface.
//!
//! Long options may be written with a single dash (`-angle 90`, `-nudex 24 53`).
//! Bad option values are reported and replaced by their defaults.

use clap::Parser;
use clap::error::{ContextKind, ContextValue, ErrorKind};
use std::path::PathBuf;

use crate::io::events::EventFileFormat;
use crate::sim::cascade::Nuclide;
use crate::sim::config::{SimulationConfig, WorkerCount};
use crate::sim::detector::DEFAULT_ANGLE_DEG;
use crate::sim::generator::SourceMode;

/// Dual HPGe detector gamma cascade simulation
#[derive(Parser, Debug)]
#[command(name = "dualhpge")]
#[command(about = "Simulate gamma cascades seen by two HPGe detectors")]
#[command(args_override_self = true)]
pub struct Args {
    /// Angle of the second detector (degrees)
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "",
        allow_negative_numbers = true,
        value_name = "DEGREES"
    )]
    pub angle: Option<String>,

    /// Co-60 coincidences (2 gammas per event)
    #[arg(long)]
    pub coin: bool,

    /// Single gammas (1 gamma per event)
    #[arg(long)]
    pub single: bool,

    /// Thermal capture cascades for nuclide Z A or ZA=1000*Z+A (default: 17 35)
    #[arg(long, num_args = 0..=2, value_name = "Z A|ZA")]
    pub nudex: Option<Vec<String>>,

    /// Cascade library directory
    #[arg(
        long = "nudex-libdir",
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "PATH"
    )]
    pub nudex_libdir: Option<String>,

    /// Number of worker threads, `auto` or 0 for all cores
    #[arg(
        long,
        num_args = 0..=1,
        default_missing_value = "",
        allow_negative_numbers = true,
        value_name = "N"
    )]
    pub threads: Option<String>,

    /// Suppress all non-essential output
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Events to run when no script is given
    #[arg(long, default_value_t = 10_000)]
    pub events: u64,

    /// Random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for output files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Event file format (ascii or binary)
    #[arg(long, default_value = "ascii")]
    pub format: String,

    /// Batch script (.mac)
    pub inputs: Vec<String>,
}

/// Turns single-dash long options (`-angle`) into `--angle`.
///
/// Short flags (`-q`) and negative numbers are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            let is_long = i > 0
                && arg.len() > 2
                && arg.starts_with('-')
                && !arg.starts_with("--")
                && arg[1..].starts_with(|c: char| c.is_ascii_alphabetic());
            if is_long { format!("-{arg}") } else { arg }
        })
        .collect()
}

/// True if `argv` asks for quiet mode (`-q`, `-quiet` or `--quiet`).
pub fn quiet_requested<T: AsRef<str>>(argv: &[T]) -> bool {
    argv.iter()
        .skip(1)
        .any(|a| matches!(a.as_ref(), "-q" | "-quiet" | "--quiet"))
}

/// Parsed command line.
#[derive(Debug)]
pub struct Cli {
    pub args: Args,
    /// Source mode picked by the last of `--coin`, `--single`, `--nudex`.
    pub mode: Option<SourceMode>,
}

impl Cli {
    /// Parses `argv` (including the program name).
    ///
    /// Only help and version requests are returned as errors. An option
    /// clap rejects is logged and dropped, the remaining options are kept.
    pub fn parse_lenient<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut argv = normalize_args(argv);
        let quiet = quiet_requested(&argv);

        // Each retry removes at least one token
        for _ in 0..argv.len() {
            let e = match Self::try_parse(&argv) {
                Ok(cli) => return Ok(cli),
                Err(e) => e,
            };
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                return Err(e);
            }
            let removed = drop_rejected(&mut argv, &e);
            if removed.is_empty() {
                break;
            }
            if !quiet {
                log::warn!("Ignoring invalid argument: {}", removed.join(" "));
            }
        }

        if !quiet {
            log::warn!("Invalid command line, using defaults");
        }
        let mut args = Args::parse_from(["dualhpge"]);
        args.quiet = quiet;
        Ok(Self { args, mode: None })
    }

    fn try_parse(argv: &[String]) -> Result<Self, clap::Error> {
        let args = Args::try_parse_from(argv)?;
        Ok(Self {
            args,
            mode: last_mode(argv),
        })
    }

    /// Converts the options into a configuration and an optional script path.
    pub fn into_config(self) -> (SimulationConfig, Option<PathBuf>) {
        let args = self.args;
        let quiet = args.quiet;
        let warn = |msg: String| {
            if !quiet {
                log::warn!("{msg}");
            }
        };

        let mut config = SimulationConfig::new();
        config.quiet = quiet;
        config.events_per_run = args.events;
        config.output_dir = args.output_dir;
        if let Some(seed) = args.seed {
            config.seed = seed;
        }
        if let Some(mode) = self.mode {
            config.source_mode = mode;
        }

        if let Some(angle) = args.angle {
            match angle.trim().parse::<f64>() {
                Ok(a) if a.is_finite() => config.detector_angle_deg = a,
                _ => {
                    warn(format!("Invalid angle value '{angle}'"));
                    config.detector_angle_deg = DEFAULT_ANGLE_DEG;
                }
            }
        }

        let mut candidates = Vec::new();
        if let Some(values) = args.nudex {
            let (nuclide, rest) = parse_nuclide(&values);
            if let Some(nuclide) = nuclide {
                config.nuclide = nuclide;
            }
            candidates.extend(rest);
        }

        match args.nudex_libdir.as_deref() {
            Some("") => warn("--nudex-libdir requires a path argument".to_string()),
            Some(dir) => config.library_dir = PathBuf::from(dir),
            None => {}
        }

        if let Some(threads) = args.threads {
            match threads.parse::<WorkerCount>() {
                Ok(w) => config.workers = w,
                Err(_) => {
                    warn(format!("Invalid threads value '{threads}'"));
                    config.workers = WorkerCount::Fixed(1);
                }
            }
        }

        match args.format.parse::<EventFileFormat>() {
            Ok(format) => config.event_format = format,
            Err(e) => warn(format!("{e}, writing ascii")),
        }

        let mut script: Option<String> = None;
        for arg in candidates.into_iter().chain(args.inputs) {
            if arg.contains(".mac") || script.is_none() {
                script = Some(arg);
            } else {
                warn(format!("Ignoring unrecognized argument: {arg}"));
            }
        }

        (config, script.map(PathBuf::from))
    }
}

/// Removes the tokens behind a clap error from `argv` and returns them.
///
/// Unknown options are removed alone. An option with a value that failed
/// to parse is removed together with that value.
fn drop_rejected(argv: &mut Vec<String>, e: &clap::Error) -> Vec<String> {
    let Some(ContextValue::String(arg)) = e.get(ContextKind::InvalidArg) else {
        return Vec::new();
    };
    // Value errors name the option as `--events <EVENTS>`
    let Some(name) = arg.split_whitespace().next() else {
        return Vec::new();
    };
    let inline = format!("{name}=");
    let Some(i) = argv
        .iter()
        .skip(1)
        .position(|a| a == name || a.starts_with(&inline))
        .map(|i| i + 1)
    else {
        return Vec::new();
    };

    let value = match e.get(ContextKind::InvalidValue) {
        Some(ContextValue::String(v)) => Some(v.as_str()),
        _ => None,
    };
    let end = match value {
        Some(v) if argv[i] == name && argv.get(i + 1).map(String::as_str) == Some(v) => i + 2,
        _ => i + 1,
    };
    argv.drain(i..end).collect()
}

/// Source mode of the last mode flag in normalized `argv`.
fn last_mode(argv: &[String]) -> Option<SourceMode> {
    argv.iter().rev().find_map(|arg| match arg.as_str() {
        "--coin" => Some(SourceMode::FixedCascade),
        "--single" => Some(SourceMode::SingleGamma),
        "--nudex" => Some(SourceMode::StatisticalCapture),
        _ => None,
    })
}

/// Reads `Z A` or `ZA` from the values following `--nudex`.
///
/// Values that are not part of the nuclide are returned for use as
/// positional arguments.
fn parse_nuclide(values: &[String]) -> (Option<Nuclide>, Vec<String>) {
    let ints: Vec<Option<i32>> = values.iter().map(|v| v.parse().ok()).collect();
    match ints.as_slice() {
        [Some(z), Some(a), ..] if *z > 0 && *a > 0 => (Some(Nuclide::new(*z, *a)), Vec::new()),
        [Some(za), ..] if *za > 0 => (Some(Nuclide::from_za(*za)), values[1..].to_vec()),
        _ => (None, values.to_vec()),
    }
}
