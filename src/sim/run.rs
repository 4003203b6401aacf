use super::deposit::Detector;
use super::histogram::EnergyHistogram;
use super::reducer::{DetectorTally, RunTotals};

/// Spectra and running totals of one run on one worker, or merged over all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    histograms: [EnergyHistogram; 2],
    totals: RunTotals,
    num_events: u64,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a hit in `detector` with the event's total `energy` (MeV).
    ///
    /// Samples outside the histogram range are dropped entirely.
    pub fn record_hit(&mut self, energy: f64, detector: Detector) {
        if self.histograms[detector.index()].record(energy) {
            self.totals.record(detector, energy);
        }
    }

    pub fn count_event(&mut self) {
        self.num_events += 1;
    }

    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    pub fn histogram(&self, detector: Detector) -> &EnergyHistogram {
        &self.histograms[detector.index()]
    }

    pub fn tally(&self, detector: Detector) -> &DetectorTally {
        self.totals.tally(detector)
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Adds another run into this one.
    pub fn merge(&mut self, other: &Run) {
        for (a, b) in self.histograms.iter_mut().zip(other.histograms.iter()) {
            a.merge(b);
        }
        self.totals.merge(&other.totals);
        self.num_events += other.num_events;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
