//! Fixed two-detector HPGe arrangement.
//!
//! Detector 1 looks at the source along +Z. Detector 2 is the same detector
//! rotated around the Y axis by the configured angle. Lengths are in mm.

use crate::{Point, Vector};

use super::deposit::Detector;

/// Source to housing front face.
pub const SOURCE_TO_HOUSING: f64 = 50.0;
pub const HOUSING_LENGTH: f64 = 76.0;

/// Entrance window layers (Al window, Mylar, Al foil, Al cup).
pub const WINDOW_LAYERS: [f64; 4] = [1.27, 0.025, 0.025, 0.5];
/// Vacuum gap between window stack and crystal.
pub const WINDOW_GAP: f64 = 3.0;

pub const CRYSTAL_DIAMETER: f64 = 57.6;
pub const CRYSTAL_LENGTH: f64 = 66.8;
pub const BORE_DIAMETER: f64 = 10.5;
pub const BORE_DEPTH: f64 = 53.5;

/// Germanium density (g/cm3).
pub const GE_DENSITY: f64 = 5.323;

pub const DEFAULT_ANGLE_DEG: f64 = 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSetup {
    angle_deg: f64,
}

impl DetectorSetup {
    pub fn new(angle_deg: f64) -> Self {
        Self { angle_deg }
    }

    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    /// Unit vector from the source towards the detector.
    pub fn axis(&self, detector: Detector) -> Vector {
        let z = Vector::new(0., 0., 1.);
        match detector {
            Detector::One => z,
            Detector::Two => z.rotate_y(self.angle_deg.to_radians()),
        }
    }

    /// Position of the housing front face center.
    pub fn housing_position(&self, detector: Detector) -> Point {
        Point::origin() + self.axis(detector) * SOURCE_TO_HOUSING
    }

    /// Distance from the source to the crystal front face.
    pub fn crystal_front_distance(&self) -> f64 {
        SOURCE_TO_HOUSING + WINDOW_LAYERS.iter().sum::<f64>() + WINDOW_GAP
    }

    pub fn crystal_radius(&self) -> f64 {
        CRYSTAL_DIAMETER / 2.
    }

    pub fn crystal_length(&self) -> f64 {
        CRYSTAL_LENGTH
    }

    /// Crystal volume minus the bore hole (cm3).
    pub fn crystal_volume_cm3(&self) -> f64 {
        let cylinder = |d_mm: f64, l_mm: f64| {
            let r = d_mm / 20.;
            std::f64::consts::PI * r * r * (l_mm / 10.)
        };
        cylinder(CRYSTAL_DIAMETER, CRYSTAL_LENGTH) - cylinder(BORE_DIAMETER, BORE_DEPTH)
    }

    /// Scoring-volume mass (kg) by volume id. Unknown ids have no mass.
    pub fn scoring_mass_kg(&self, detector_id: i32) -> Option<f64> {
        Detector::from_id(detector_id).map(|_| self.crystal_volume_cm3() * GE_DENSITY / 1000.)
    }
}

impl Default for DetectorSetup {
    fn default() -> Self {
        Self::new(DEFAULT_ANGLE_DEG)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crystal_front_distance() {
        let setup = DetectorSetup::default();
        assert!((setup.crystal_front_distance() - 54.82).abs() < 1e-9);
    }

    #[test]
    fn test_mass() {
        let setup = DetectorSetup::default();
        let m = setup.scoring_mass_kg(1).unwrap();
        assert!((m - 0.9019).abs() < 1e-3, "mass = {m}");
        assert_eq!(setup.scoring_mass_kg(2), Some(m));
        assert_eq!(setup.scoring_mass_kg(3), None);
    }

    #[test]
    fn test_axes() {
        let setup = DetectorSetup::new(180.);
        let a2 = setup.axis(Detector::Two);
        assert!((a2.dz + 1.).abs() < 1e-12);

        let setup = DetectorSetup::new(90.);
        let p2 = setup.housing_position(Detector::Two);
        assert!(p2.is_close(&Point::new(50., 0., 50. * 90_f64.to_radians().cos())));
        assert!((p2.x - 50.).abs() < 1e-12);
    }
}
