//! Primary-particle sampling models.
//!
//! All functions are pure apart from consuming random-generator state.

use rand::Rng;

use crate::{Point, Vector};

/// Lower Co-60 gamma line (MeV).
pub const CO60_LINE_LOW: f64 = 1.173;
/// Upper Co-60 gamma line (MeV).
pub const CO60_LINE_HIGH: f64 = 1.332;

/// Picks one of the two Co-60 lines with equal probability.
pub fn sample_fixed_line<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u: f64 = rng.gen_range(0.0..1.0);
    if u < 0.5 { CO60_LINE_LOW } else { CO60_LINE_HIGH }
}

/// Generate a random unit vector uniformly distributed on the sphere.
///
/// cos(theta) is drawn uniformly in [-1, 1] and phi uniformly in [0, 2*pi).
/// Drawing theta itself uniformly would over-populate the poles.
pub fn sample_isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    let u: f64 = rng.gen_range(0.0..1.0);
    let v: f64 = rng.gen_range(0.0..1.0);
    let cos_theta = 2. * u - 1.;
    let phi = std::f64::consts::TAU * v;
    Vector::from_spherical(cos_theta, phi)
}

/// Point source at the origin.
pub fn sample_source_position<R: Rng + ?Sized>(_rng: &mut R) -> Point {
    Point::origin()
}
