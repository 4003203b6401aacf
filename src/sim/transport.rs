//! Particle transport interface and a simple acceptance-based stand-in.

use rand::{Rng, RngCore};

use super::deposit::Detector;
use super::detector::{DetectorSetup, GE_DENSITY};
use super::primary::{ParticleKind, PrimaryVertex};

/// Electron rest energy (MeV).
pub const ELECTRON_MASS: f64 = 0.510_998_95;

/// Tracks one primary through the setup and reports energy deposits.
pub trait Transport: Send + Sync {
    /// Calls `deposit(energy_MeV, volume_id)` for every deposit caused by `vertex`.
    fn transport(
        &self,
        vertex: &PrimaryVertex,
        rng: &mut dyn RngCore,
        deposit: &mut dyn FnMut(f64, i32),
    );
}

/// Single-interaction model of the two bare crystals.
///
/// A gamma aimed at a crystal interacts with probability `1 - exp(-mu * L)`
/// and then deposits either its full energy or the energy of one Compton
/// electron. Electrons are stopped in the housing.
#[derive(Debug, Clone)]
pub struct AcceptanceTransport {
    setup: DetectorSetup,
}

impl AcceptanceTransport {
    pub fn new(setup: DetectorSetup) -> Self {
        Self { setup }
    }

    pub fn setup(&self) -> &DetectorSetup {
        &self.setup
    }

    /// Linear attenuation coefficient in germanium (1/cm).
    pub fn attenuation(energy: f64) -> f64 {
        0.0575 * energy.max(1e-3).powf(-0.5) * GE_DENSITY
    }

    /// Probability that an interaction ends in full absorption.
    pub fn photopeak_fraction(energy: f64) -> f64 {
        (0.35 * energy.max(1e-3).powf(-0.6)).clamp(0.0, 1.0)
    }

    /// Energy transferred to the electron when scattering by `cos_theta`.
    pub fn compton_electron_energy(energy: f64, cos_theta: f64) -> f64 {
        let scattered = energy / (1. + energy / ELECTRON_MASS * (1. - cos_theta));
        energy - scattered
    }

    /// Path length (cm) through the crystal for a ray leaving the source at
    /// `cos_theta` relative to the crystal axis. None if the crystal is missed.
    pub fn path_length(&self, cos_theta: f64) -> Option<f64> {
        if cos_theta <= 0.0 {
            return None;
        }
        let d = self.setup.crystal_front_distance();
        let r = self.setup.crystal_radius();
        let sin_theta = (1. - cos_theta * cos_theta).max(0.).sqrt();

        let t_front = d / cos_theta;
        if t_front * sin_theta > r {
            return None;
        }
        let t_back = (d + self.setup.crystal_length()) / cos_theta;
        let t_exit = if sin_theta > 0.0 {
            t_back.min(r / sin_theta)
        } else {
            t_back
        };
        Some((t_exit - t_front) / 10.)
    }
}

impl Default for AcceptanceTransport {
    fn default() -> Self {
        Self::new(DetectorSetup::default())
    }
}

impl Transport for AcceptanceTransport {
    fn transport(
        &self,
        vertex: &PrimaryVertex,
        rng: &mut dyn RngCore,
        deposit: &mut dyn FnMut(f64, i32),
    ) {
        if vertex.kind != ParticleKind::Gamma || vertex.energy <= 0.0 {
            return;
        }

        for det in Detector::ALL {
            let cos_theta = vertex.direction.dot(self.setup.axis(det));
            let Some(path) = self.path_length(cos_theta) else {
                continue;
            };

            let p_interact = 1. - (-Self::attenuation(vertex.energy) * path).exp();
            let u: f64 = rng.gen_range(0.0..1.0);
            if u >= p_interact {
                continue;
            }

            let u: f64 = rng.gen_range(0.0..1.0);
            let energy = if u < Self::photopeak_fraction(vertex.energy) {
                vertex.energy
            } else {
                let c: f64 = rng.gen_range(-1.0..1.0);
                Self::compton_electron_energy(vertex.energy, c)
            };
            deposit(energy, det.id());
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Point, Vector};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_compton_edge() {
        // Backscatter gives the Compton edge
        let e = AcceptanceTransport::compton_electron_energy(1.332, -1.);
        assert!((e - 1.1176).abs() < 1e-3, "edge = {e}");
        assert_eq!(AcceptanceTransport::compton_electron_energy(1.0, 1.), 0.0);
    }

    #[test]
    fn test_path_length() {
        let t = AcceptanceTransport::default();
        let on_axis = t.path_length(1.).unwrap();
        assert!((on_axis - 6.68).abs() < 1e-9);
        assert!(t.path_length(0.5).is_none());
        assert!(t.path_length(-1.).is_none());
    }

    #[test]
    fn test_deposits_only_in_known_volumes() {
        let t = AcceptanceTransport::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut deposits = Vec::new();
        for dz in [1., -1.] {
            let v = PrimaryVertex::gamma(1.332, Point::origin(), Vector::new(0., 0., dz));
            for _ in 0..1000 {
                t.transport(&v, &mut rng, &mut |e: f64, id: i32| deposits.push((e, id)));
            }
        }
        assert!(!deposits.is_empty());
        assert!(deposits.iter().any(|&(_, id)| id == 1));
        assert!(deposits.iter().any(|&(_, id)| id == 2));
        for (e, _) in deposits {
            assert!(e >= 0.0 && e <= 1.332);
        }
    }

    #[test]
    fn test_gamma_passing_first_crystal_reaches_second() {
        // Both crystals on the same axis
        let t = AcceptanceTransport::new(DetectorSetup::new(0.));
        let mut rng = StdRng::seed_from_u64(5);
        let v = PrimaryVertex::gamma(1.332, Point::origin(), Vector::new(0., 0., 1.));
        let mut per_detector = [0usize; 2];
        for _ in 0..10_000 {
            let mut calls = 0;
            t.transport(&v, &mut rng, &mut |_: f64, id: i32| {
                calls += 1;
                per_detector[(id - 1) as usize] += 1;
            });
            assert!(calls <= 1);
        }
        assert!(per_detector[0] > 0);
        assert!(per_detector[1] > 0);
        assert!(per_detector[0] > per_detector[1]);
    }

    #[test]
    fn test_missing_gamma_deposits_nothing() {
        let t = AcceptanceTransport::default();
        let mut rng = StdRng::seed_from_u64(1);
        let v = PrimaryVertex::gamma(1.0, Point::origin(), Vector::new(1., 0., 0.));
        let mut count = 0;
        for _ in 0..100 {
            t.transport(&v, &mut rng, &mut |_: f64, _: i32| count += 1);
        }
        assert_eq!(count, 0);
    }

    #[test]
    fn test_electrons_deposit_nothing() {
        let t = AcceptanceTransport::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut v = PrimaryVertex::gamma(1.0, Point::origin(), Vector::new(0., 0., 1.));
        v.kind = ParticleKind::Electron;
        let mut count = 0;
        t.transport(&v, &mut rng, &mut |_: f64, _: i32| count += 1);
        assert_eq!(count, 0);
    }
}
