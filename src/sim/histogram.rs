/// Number of 1 keV bins, covering [0, 10000) keV.
pub const NUM_BINS: usize = 10_000;

pub const KEV_PER_MEV: f64 = 1000.0;

/// Counts above this are reported as significant peaks.
pub const PEAK_COUNT_THRESHOLD: u64 = 10;

/// Energy spectrum of one detector with 1 keV bins.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyHistogram {
    counts: Vec<u64>,
}

impl EnergyHistogram {
    pub fn new() -> Self {
        Self {
            counts: vec![0; NUM_BINS],
        }
    }

    /// Bin for an energy in MeV, `floor(E_keV)`.
    ///
    /// Energies outside [0, 10000) keV have no bin. The upper edge is exclusive.
    pub fn bin_index(energy: f64) -> Option<usize> {
        let kev = (energy * KEV_PER_MEV).floor();
        if kev.is_nan() || kev < 0.0 || kev >= NUM_BINS as f64 {
            return None;
        }
        Some(kev as usize)
    }

    /// Records one count at `energy` (MeV). Returns false if the sample was dropped.
    pub fn record(&mut self, energy: f64) -> bool {
        match Self::bin_index(energy) {
            Some(bin) => {
                self.counts[bin] += 1;
                true
            }
            None => false,
        }
    }

    pub fn count(&self, bin: usize) -> u64 {
        self.counts.get(bin).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total_counts(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Nonzero bins as `(bin_keV, count)` in ascending order.
    pub fn nonzero_bins(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(bin, &c)| (bin, c))
    }

    /// Bins with more than `min_count` entries.
    pub fn significant_bins(&self, min_count: u64) -> Vec<(usize, u64)> {
        self.nonzero_bins().filter(|&(_, c)| c > min_count).collect()
    }

    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
    }

    pub fn set_count(&mut self, bin: usize, count: u64) {
        if let Some(c) = self.counts.get_mut(bin) {
            *c = count;
        }
    }

    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }
}

impl Default for EnergyHistogram {
    fn default() -> Self {
        Self::new()
    }
}
