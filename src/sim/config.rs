use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::io::events::EventFileFormat;

use super::cascade::{DEFAULT_LIBRARY_DIR, Nuclide};
use super::deposit::MINIMUM_DEPOSIT_MEV;
use super::detector::DEFAULT_ANGLE_DEG;
use super::generator::SourceMode;

/// Requested number of worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCount {
    Fixed(usize),
    /// One worker per hardware thread.
    Auto,
}

impl WorkerCount {
    /// Number of workers before the source-mode restriction.
    pub fn resolve(&self) -> usize {
        match self {
            Self::Fixed(n) => (*n).max(1),
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl FromStr for WorkerCount {
    type Err = anyhow::Error;

    /// Accepts a positive count, `auto`, or `0` (same as `auto`).
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        let n: i64 = s
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid thread count '{s}'"))?;
        match n {
            0 => Ok(Self::Auto),
            n if n > 0 => Ok(Self::Fixed(n as usize)),
            _ => anyhow::bail!("Thread count must not be negative: {n}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    // Setup
    /// Angle between the two detector axes (degrees).
    pub detector_angle_deg: f64,

    // Source
    pub source_mode: SourceMode,
    pub nuclide: Nuclide,
    pub library_dir: PathBuf,

    // Run control
    pub workers: WorkerCount,
    pub events_per_run: u64,
    pub seed: u64,
    /// Per-event hit threshold (MeV).
    pub threshold: f64,
    pub quiet: bool,

    // Output
    pub output_dir: PathBuf,
    pub event_file: String,
    pub event_format: EventFileFormat,
    pub write_spectra: bool,
    pub write_summary: bool,
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self {
            detector_angle_deg: DEFAULT_ANGLE_DEG,
            source_mode: SourceMode::FixedCascade,
            nuclide: Nuclide::default(),
            library_dir: PathBuf::from(DEFAULT_LIBRARY_DIR),
            workers: WorkerCount::default(),
            events_per_run: 10_000,
            seed: 12345,
            threshold: MINIMUM_DEPOSIT_MEV,
            quiet: false,
            output_dir: PathBuf::from("."),
            event_file: "output.evt".to_string(),
            event_format: EventFileFormat::Ascii,
            write_spectra: true,
            write_summary: true,
        }
    }

    /// Worker count actually used for `mode`.
    ///
    /// The statistical capture source always runs on a single worker.
    pub fn effective_workers(&self, mode: SourceMode) -> usize {
        match mode {
            SourceMode::StatisticalCapture => 1,
            _ => self.workers.resolve(),
        }
    }

    pub fn event_file_path(&self) -> PathBuf {
        self.output_dir.join(&self.event_file)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detector angle: {} deg", self.detector_angle_deg)?;
        writeln!(f, "Source mode: {}", self.source_mode)?;
        if self.source_mode == SourceMode::StatisticalCapture {
            writeln!(f, "Nuclide: {} (ZA={})", self.nuclide, self.nuclide.za())?;
            writeln!(f, "Cascade library: {}", self.library_dir.display())?;
        }
        write!(f, "Threads: {}", self.workers)
    }
}
