use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::deposit::Detector;

/// Joules per MeV.
pub const MEV_TO_JOULE: f64 = 1.602_176_634e-13;

/// Running energy totals of one detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectorTally {
    /// Sum of per-event energies (MeV).
    pub sum: f64,
    /// Sum of squared per-event energies (MeV^2).
    pub sum_sq: f64,
    /// Number of events with a hit.
    pub count: u64,
}

impl DetectorTally {
    pub fn record(&mut self, energy: f64) {
        self.sum += energy;
        self.sum_sq += energy * energy;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.count += other.count;
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// `sqrt(max(0, sum_sq - sum^2 / count))`, 0 without hits.
    pub fn rms(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let variance = self.sum_sq - self.sum * self.sum / self.count as f64;
        variance.max(0.0).sqrt()
    }

    /// Absorbed dose (Gy) for a scoring volume of `mass_kg`.
    pub fn dose(&self, mass_kg: f64) -> f64 {
        if self.count == 0 || mass_kg <= 0.0 {
            return 0.0;
        }
        self.sum * MEV_TO_JOULE / mass_kg
    }

    pub fn dose_rms(&self, mass_kg: f64) -> f64 {
        if self.count == 0 || mass_kg <= 0.0 {
            return 0.0;
        }
        self.rms() * MEV_TO_JOULE / mass_kg
    }
}

/// Per-detector tallies, accumulated by one worker or reduced over all.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunTotals {
    pub tallies: [DetectorTally; 2],
}

impl RunTotals {
    pub fn record(&mut self, detector: Detector, energy: f64) {
        self.tallies[detector.index()].record(energy);
    }

    pub fn tally(&self, detector: Detector) -> &DetectorTally {
        &self.tallies[detector.index()]
    }

    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.tallies.iter_mut().zip(other.tallies.iter()) {
            a.merge(b);
        }
    }
}

/// Derived end-of-run figures of one detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorStatistics {
    pub hits: u64,
    /// Cumulative energy (MeV).
    pub energy: f64,
    pub energy_rms: f64,
    pub mean_energy: f64,
    /// Dose (Gy).
    pub dose: f64,
    pub dose_rms: f64,
}

impl DetectorStatistics {
    pub fn from_tally(tally: &DetectorTally, mass_kg: f64) -> Self {
        Self {
            hits: tally.count,
            energy: tally.sum,
            energy_rms: tally.rms(),
            mean_energy: tally.mean(),
            dose: tally.dose(mass_kg),
            dose_rms: tally.dose_rms(mass_kg),
        }
    }
}

/// Cross-worker reduction point for run totals.
///
/// Workers accumulate into a private [`RunTotals`] and hand it over once at
/// the end-of-run barrier.
#[derive(Debug, Default)]
pub struct RunReducer {
    totals: Mutex<RunTotals>,
}

impl RunReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&self, local: &RunTotals) {
        let mut totals = self.totals.lock().unwrap_or_else(|e| e.into_inner());
        totals.merge(local);
    }

    pub fn snapshot(&self) -> RunTotals {
        *self.totals.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn reset(&self) {
        *self.totals.lock().unwrap_or_else(|e| e.into_inner()) = RunTotals::default();
    }

    pub fn statistics(&self, detector: Detector, mass_kg: f64) -> DetectorStatistics {
        DetectorStatistics::from_tally(self.snapshot().tally(detector), mass_kg)
    }
}
