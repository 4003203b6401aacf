use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum per-event energy (MeV) for a detector to count as hit (10 keV).
pub const MINIMUM_DEPOSIT_MEV: f64 = 0.010;

/// The two scoring volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Detector {
    One,
    Two,
}

impl Detector {
    pub const ALL: [Detector; 2] = [Detector::One, Detector::Two];

    /// Maps a transport volume id (1 or 2) to a detector.
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl fmt::Display for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Detector {}", self.id())
    }
}

/// Outcome of one event: per-detector totals (MeV) and hit flags.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventDeposits {
    pub totals: [f64; 2],
    pub hits: [bool; 2],
}

impl EventDeposits {
    pub fn total(&self, detector: Detector) -> f64 {
        self.totals[detector.index()]
    }

    pub fn is_hit(&self, detector: Detector) -> bool {
        self.hits[detector.index()]
    }

    pub fn any_hit(&self) -> bool {
        self.hits.iter().any(|&h| h)
    }

    /// Totals in keV as written to the event file.
    pub fn row_kev(&self) -> [f64; 2] {
        [self.totals[0] * 1000., self.totals[1] * 1000.]
    }
}

/// Sums energy deposits per detector within one event.
#[derive(Debug, Clone)]
pub struct DepositAccumulator {
    totals: [f64; 2],
    threshold: f64,
}

impl DepositAccumulator {
    pub fn new() -> Self {
        Self::with_threshold(MINIMUM_DEPOSIT_MEV)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            totals: [0.0; 2],
            threshold,
        }
    }

    pub fn reset(&mut self) {
        self.totals = [0.0; 2];
    }

    /// Adds a deposit to the given volume. Unknown volumes and
    /// non-positive amounts are ignored.
    pub fn add_deposit(&mut self, amount: f64, detector_id: i32) {
        if amount.is_nan() || amount <= 0.0 {
            return;
        }
        if let Some(det) = Detector::from_id(detector_id) {
            self.totals[det.index()] += amount;
        }
    }

    pub fn current(&self, detector: Detector) -> f64 {
        self.totals[detector.index()]
    }

    /// Closes the event and reports totals with hit flags.
    pub fn finalize_event(&self) -> EventDeposits {
        EventDeposits {
            totals: self.totals,
            hits: self.totals.map(|t| t >= self.threshold),
        }
    }
}

impl Default for DepositAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_ignored() {
        let mut acc = DepositAccumulator::new();
        acc.add_deposit(0.5, 3);
        acc.add_deposit(0.5, 0);
        acc.add_deposit(0.5, -1);
        let out = acc.finalize_event();
        assert_eq!(out.totals, [0.0, 0.0]);
        assert!(!out.any_hit());
    }

    #[test]
    fn test_repeated_deposits_sum() {
        let mut acc = DepositAccumulator::new();
        acc.add_deposit(0.25, 1);
        acc.add_deposit(0.5, 1);
        acc.add_deposit(1.0, 2);
        let out = acc.finalize_event();
        assert!((out.total(Detector::One) - 0.75).abs() < 1e-12);
        assert!((out.total(Detector::Two) - 1.0).abs() < 1e-12);
        assert!(out.is_hit(Detector::One) && out.is_hit(Detector::Two));
    }

    #[test]
    fn test_threshold() {
        let mut acc = DepositAccumulator::new();
        acc.add_deposit(0.009, 1);
        acc.add_deposit(0.010, 2);
        let out = acc.finalize_event();
        // Sub-threshold totals are still reported
        assert_eq!(out.total(Detector::One), 0.009);
        assert!(!out.is_hit(Detector::One));
        assert!(out.is_hit(Detector::Two));
    }

    #[test]
    fn test_reset() {
        let mut acc = DepositAccumulator::new();
        acc.add_deposit(1.0, 1);
        acc.reset();
        assert_eq!(acc.current(Detector::One), 0.0);
    }

    #[test]
    fn test_non_positive_ignored() {
        let mut acc = DepositAccumulator::new();
        acc.add_deposit(-1.0, 1);
        acc.add_deposit(0.0, 1);
        acc.add_deposit(f64::NAN, 1);
        assert_eq!(acc.current(Detector::One), 0.0);
    }

    #[test]
    fn test_row_kev() {
        let out = EventDeposits {
            totals: [1.173, 0.0],
            hits: [true, false],
        };
        let row = out.row_kev();
        assert!((row[0] - 1173.).abs() < 1e-9);
        assert_eq!(row[1], 0.0);
    }

    #[test]
    fn test_detector_ids() {
        for det in Detector::ALL {
            assert_eq!(Detector::from_id(det.id()), Some(det));
        }
        assert_eq!(Detector::from_id(7), None);
    }
}
