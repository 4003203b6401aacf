use crate::Vector;
use crate::geom::EPS;
use serde::{Deserialize, Serialize};
use std::ops::Add;

/// Position in the lab frame (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(0., 0., 0.)
    }

    /// Returns true if both points are very close to each other.
    pub fn is_close(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPS
            && (self.y - other.y).abs() < EPS
            && (self.z - other.z).abs() < EPS
    }
}

impl Add<Vector> for Point {
    type Output = Point;
    fn add(self, offset: Vector) -> Self {
        Self {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
            z: self.z + offset.dz,
        }
    }
}
