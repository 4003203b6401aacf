use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// Direction in the lab frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Vector {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Builds a unit vector from the polar cosine and the azimuth `phi` (radians).
    pub fn from_spherical(cos_theta: f64, phi: f64) -> Self {
        let sin_theta = (1. - cos_theta * cos_theta).max(0.).sqrt();
        Self {
            dx: sin_theta * phi.cos(),
            dy: sin_theta * phi.sin(),
            dz: cos_theta,
        }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.dx * other.dx + self.dy * other.dy + self.dz * other.dz
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Rotates the vector around the Y axis by `angle` (radians).
    ///
    /// A positive angle turns +Z towards +X.
    pub fn rotate_y(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            dx: c * self.dx + s * self.dz,
            dy: self.dy,
            dz: -s * self.dx + c * self.dz,
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, scale: f64) -> Self {
        Self {
            dx: self.dx * scale,
            dy: self.dy * scale,
            dz: self.dz * scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_spherical_poles() {
        let up = Vector::from_spherical(1., 0.3);
        assert!(up.dx.abs() < 1e-12 && up.dy.abs() < 1e-12);
        assert!((up.dz - 1.).abs() < 1e-12);
        let down = Vector::from_spherical(-1., 2.0);
        assert!((down.dz + 1.).abs() < 1e-12);
        assert!(down.dx.abs() < 1e-12 && down.dy.abs() < 1e-12);
    }

    #[test]
    fn test_from_spherical_is_unit() {
        for (c, phi) in [(0.3, 1.1), (-0.8, 4.0), (0., 0.)] {
            assert!((Vector::from_spherical(c, phi).length() - 1.).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotate_y() {
        let z = Vector::new(0., 0., 1.);
        let rotated = z.rotate_y(std::f64::consts::FRAC_PI_2);
        assert!((rotated.dx - 1.).abs() < 1e-12);
        assert!(rotated.dz.abs() < 1e-12);
        let back = z.rotate_y(std::f64::consts::PI);
        assert!((back.dz + 1.).abs() < 1e-12);
    }

    #[test]
    fn test_scale() {
        let v = Vector::new(0., 1., -2.) * 3.;
        assert_eq!(v, Vector::new(0., 3., -6.));
        assert_eq!(v.dot(Vector::new(1., 1., 1.)), -3.);
    }
}
