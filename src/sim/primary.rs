use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Point, Vector};

/// Particle species a primary vertex can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    Gamma,
    Electron,
}

impl ParticleKind {
    /// Maps a single-character cascade code (`g`, `e`) to a particle kind.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'g' => Some(Self::Gamma),
            'e' => Some(Self::Electron),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Gamma => "gamma",
            Self::Electron => "e-",
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single emitted particle handed to the transport engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryVertex {
    pub kind: ParticleKind,
    /// Kinetic energy (MeV).
    pub energy: f64,
    pub position: Point,
    /// Unit momentum direction.
    pub direction: Vector,
    /// Emission time (s).
    pub time: f64,
}

impl PrimaryVertex {
    pub fn gamma(energy: f64, position: Point, direction: Vector) -> Self {
        Self {
            kind: ParticleKind::Gamma,
            energy,
            position,
            direction,
            time: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(ParticleKind::from_code('g'), Some(ParticleKind::Gamma));
        assert_eq!(ParticleKind::from_code('e'), Some(ParticleKind::Electron));
        assert_eq!(ParticleKind::from_code('n'), None);
        assert_eq!(ParticleKind::from_code('G'), None);
    }

    #[test]
    fn test_gamma_vertex_starts_at_zero_time() {
        let v = PrimaryVertex::gamma(1.0, Point::origin(), Vector::new(0., 0., 1.));
        assert_eq!(v.kind, ParticleKind::Gamma);
        assert_eq!(v.time, 0.0);
        assert_eq!(v.kind.to_string(), "gamma");
    }
}
