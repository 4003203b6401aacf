use serde::{Deserialize, Serialize};
use std::fmt;

use super::deposit::Detector;
use super::generator::SourceMode;
use super::histogram::PEAK_COUNT_THRESHOLD;
use super::reducer::{DetectorStatistics, RunTotals};
use super::run::Run;

/// Outcome of one `beam_on` call.
pub struct SimulationResult {
    /// Worker runs merged into one.
    pub run: Run,
    /// Reduced per-detector totals.
    pub totals: RunTotals,
    /// Event rows (keV) for events with at least one hit.
    pub rows: Vec<[f64; 2]>,
    pub source_mode: SourceMode,
    pub detector_angle_deg: f64,
    pub workers: usize,
    /// Scoring-volume masses (kg) of detectors 1 and 2.
    pub masses_kg: [f64; 2],
}

impl SimulationResult {
    pub fn num_events(&self) -> u64 {
        self.run.num_events()
    }

    pub fn statistics(&self, detector: Detector) -> DetectorStatistics {
        DetectorStatistics::from_tally(
            self.totals.tally(detector),
            self.masses_kg[detector.index()],
        )
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            num_events: self.num_events(),
            detector_angle_deg: self.detector_angle_deg,
            source_mode: self.source_mode,
            workers: self.workers,
            detectors: Detector::ALL
                .iter()
                .map(|&det| {
                    let histogram = self.run.histogram(det);
                    DetectorSummary {
                        id: det.id(),
                        statistics: self.statistics(det),
                        histogram_entries: histogram.total_counts(),
                        histogram_energy: self.run.tally(det).sum,
                        peaks: histogram
                            .significant_bins(PEAK_COUNT_THRESHOLD)
                            .into_iter()
                            .map(|(bin, count)| Peak {
                                bin_kev: bin,
                                counts: count,
                            })
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peak {
    pub bin_kev: usize,
    pub counts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorSummary {
    pub id: i32,
    pub statistics: DetectorStatistics,
    /// Entries in the histogram (in-range hits).
    pub histogram_entries: u64,
    /// Energy (MeV) of the histogrammed hits.
    pub histogram_energy: f64,
    pub peaks: Vec<Peak>,
}

/// End-of-run summary, printable and serializable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub num_events: u64,
    pub detector_angle_deg: f64,
    pub source_mode: SourceMode,
    pub workers: usize,
    pub detectors: Vec<DetectorSummary>,
}

/// Formats an energy given in MeV with a fitting unit.
pub fn format_energy(mev: f64) -> String {
    let abs = mev.abs();
    if abs == 0.0 {
        "0 eV".to_string()
    } else if abs >= 1e3 {
        format!("{:.4} GeV", mev / 1e3)
    } else if abs >= 1.0 {
        format!("{:.4} MeV", mev)
    } else if abs >= 1e-3 {
        format!("{:.4} keV", mev * 1e3)
    } else {
        format!("{:.4} eV", mev * 1e6)
    }
}

/// Formats a dose given in Gy with a fitting unit.
pub fn format_dose(gy: f64) -> String {
    let abs = gy.abs();
    if abs == 0.0 {
        "0 Gy".to_string()
    } else if abs >= 1.0 {
        format!("{:.4} Gy", gy)
    } else if abs >= 1e-3 {
        format!("{:.4} milliGy", gy * 1e3)
    } else if abs >= 1e-6 {
        format!("{:.4} microGy", gy * 1e6)
    } else if abs >= 1e-9 {
        format!("{:.4} nanoGy", gy * 1e9)
    } else {
        format!("{:.4} picoGy", gy * 1e12)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "-------- End of Global Run (Dual Detector) --------")?;
        writeln!(f, " The run consists of {} events", self.num_events)?;
        writeln!(f, " Source: {}", self.source_mode)?;
        writeln!(f, " Detector angle: {} degrees", self.detector_angle_deg)?;
        writeln!(f, " Worker threads: {}", self.workers)?;
        for det in &self.detectors {
            let s = &det.statistics;
            writeln!(f)?;
            writeln!(f, "=== DETECTOR {} RESULTS ===", det.id)?;
            writeln!(f, " Events with energy deposit: {}", s.hits)?;
            writeln!(
                f,
                " Cumulative energy deposit: {} rms = {}",
                format_energy(s.energy),
                format_energy(s.energy_rms)
            )?;
            writeln!(f, " Mean energy per hit: {}", format_energy(s.mean_energy))?;
            writeln!(
                f,
                " Dose in scoring volume : {} rms = {}",
                format_dose(s.dose),
                format_dose(s.dose_rms)
            )?;
        }
        writeln!(f, "------------------------------------")?;
        writeln!(f)?;
        writeln!(
            f,
            "=== SIGNIFICANT PEAKS (>{} counts) ===",
            PEAK_COUNT_THRESHOLD
        )?;
        for det in &self.detectors {
            writeln!(f, "Detector {}:", det.id)?;
            for peak in &det.peaks {
                writeln!(f, "  {} keV: {} counts", peak.bin_kev, peak.counts)?;
            }
        }
        write!(f, "==========================================================")
    }
}
