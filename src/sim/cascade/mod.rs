//! Statistical de-excitation cascades after thermal neutron capture.
//!
//! The cascade library itself is an external collaborator behind the
//! [`CascadeGenerator`] trait. [`CascadeSource`] owns one generator instance,
//! builds it lazily on the first event, resolves the data-library directory
//! and converts the raw emission records into typed particles.

mod tabulated;

pub use tabulated::{CASCADE_SUBDIR, TabulatedCascadeFactory, TabulatedCascadeGenerator};

use anyhow::Result;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::primary::ParticleKind;

/// File that must exist in a valid cascade library directory.
pub const LIBRARY_MARKER: &str = "GeneralStatNuclParameters.dat";

/// Default library location, relative to the working directory.
pub const DEFAULT_LIBRARY_DIR: &str = "../NuDEX/NuDEXlib/";

/// Library locations probed after the user-supplied one.
pub const FALLBACK_LIBRARY_DIRS: [&str; 3] =
    ["NuDEX/NuDEXlib/", "./NuDEX/NuDEXlib/", "../NuDEX/NuDEXlib/"];

/// Start the cascade from the capture state.
pub const CAPTURE_LEVEL: i32 = -1;

/// Incident neutron energy (MeV). The negative sign selects thermal capture.
pub const THERMAL_INCIDENT_ENERGY: f64 = -1e-6;

/// Nuclide identifier (proton number Z, mass number A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Nuclide {
    pub z: i32,
    pub a: i32,
}

impl Nuclide {
    pub fn new(z: i32, a: i32) -> Self {
        Self { z, a }
    }

    /// Decodes `ZA = 1000 * Z + A`.
    pub fn from_za(za: i32) -> Self {
        Self {
            z: za / 1000,
            a: za % 1000,
        }
    }

    pub fn za(&self) -> i32 {
        self.z * 1000 + self.a
    }

    pub fn is_valid(&self) -> bool {
        self.z > 0 && self.a > 0
    }

    /// Cl-35
    pub fn chlorine35() -> Self {
        Self::new(17, 35)
    }
}

impl Default for Nuclide {
    fn default() -> Self {
        Self::chlorine35()
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z={}, A={}", self.z, self.a)
    }
}

/// Raw emission record as returned by a cascade library.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmittedParticle {
    /// Library type code (`g` gamma, `e` conversion electron, anything else unsupported).
    pub code: char,
    /// Energy (MeV).
    pub energy: f64,
    /// Emission time (s).
    pub time: f64,
}

/// Emission record after type validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParticle {
    pub kind: ParticleKind,
    pub energy: f64,
    pub time: f64,
}

/// Black-box statistical cascade generator for one nuclide.
pub trait CascadeGenerator: Send {
    /// Loads nuclear data from `library_dir`.
    fn init(&mut self, library_dir: &Path) -> Result<()>;

    /// Samples one cascade. An empty list means no cascade for this event.
    fn generate_cascade(
        &mut self,
        start_level: i32,
        incident_energy: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<EmittedParticle>;
}

/// Builds uninitialized generators, one per worker.
pub trait CascadeFactory: Send + Sync {
    fn create(&self, nuclide: Nuclide) -> Box<dyn CascadeGenerator>;
}

impl<F> CascadeFactory for F
where
    F: Fn(Nuclide) -> Box<dyn CascadeGenerator> + Send + Sync,
{
    fn create(&self, nuclide: Nuclide) -> Box<dyn CascadeGenerator> {
        self(nuclide)
    }
}

/// Returns the first directory (requested, then fallbacks) containing
/// [`LIBRARY_MARKER`]. Falls back to `requested` unchanged so that a bad
/// path is reported by the library itself.
pub fn resolve_library_dir(requested: &Path) -> PathBuf {
    std::iter::once(requested.to_path_buf())
        .chain(FALLBACK_LIBRARY_DIRS.iter().map(PathBuf::from))
        .find(|dir| dir.join(LIBRARY_MARKER).is_file())
        .unwrap_or_else(|| requested.to_path_buf())
}

enum GeneratorState {
    Uninitialized,
    Ready(Box<dyn CascadeGenerator>),
    Failed,
}

/// Per-worker owner of a cascade generator.
pub struct CascadeSource {
    nuclide: Nuclide,
    library_dir: PathBuf,
    factory: Arc<dyn CascadeFactory>,
    state: GeneratorState,
    quiet: bool,
}

impl CascadeSource {
    pub fn new(
        nuclide: Nuclide,
        library_dir: impl Into<PathBuf>,
        factory: Arc<dyn CascadeFactory>,
        quiet: bool,
    ) -> Self {
        Self {
            nuclide,
            library_dir: library_dir.into(),
            factory,
            state: GeneratorState::Uninitialized,
            quiet,
        }
    }

    pub fn nuclide(&self) -> Nuclide {
        self.nuclide
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GeneratorState::Ready(_))
    }

    pub fn has_failed(&self) -> bool {
        matches!(self.state, GeneratorState::Failed)
    }

    /// Allows one new initialization attempt after a failed run.
    pub fn begin_run(&mut self) {
        if self.has_failed() {
            self.state = GeneratorState::Uninitialized;
        }
    }

    fn initialize(&self) -> Option<Box<dyn CascadeGenerator>> {
        if !self.nuclide.is_valid() || self.library_dir.as_os_str().is_empty() {
            log::error!(
                "Cascade source configuration missing (ZA={}, libdir='{}')",
                self.nuclide.za(),
                self.library_dir.display()
            );
            return None;
        }

        let resolved = resolve_library_dir(&self.library_dir);
        let mut generator = self.factory.create(self.nuclide);
        match generator.init(&resolved) {
            Ok(()) => {
                if !self.quiet {
                    log::info!(
                        "Cascade generator initialized: ZA={}, libdir='{}'",
                        self.nuclide.za(),
                        resolved.display()
                    );
                }
                Some(generator)
            }
            Err(e) => {
                log::error!(
                    "Cascade generator initialization failed for ZA={} using libdir='{}': {e:#}",
                    self.nuclide.za(),
                    resolved.display()
                );
                None
            }
        }
    }

    /// Samples one cascade, initializing the generator on first use.
    ///
    /// Returns an empty list when the generator is unavailable or produced
    /// nothing. Particles with unsupported type codes are dropped one by one.
    pub fn generate_cascade(
        &mut self,
        start_level: i32,
        incident_energy: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<CascadeParticle> {
        if let GeneratorState::Uninitialized = self.state {
            self.state = match self.initialize() {
                Some(generator) => GeneratorState::Ready(generator),
                None => GeneratorState::Failed,
            };
        }

        let GeneratorState::Ready(generator) = &mut self.state else {
            return Vec::new();
        };

        generator
            .generate_cascade(start_level, incident_energy, rng)
            .into_iter()
            .filter_map(|p| {
                ParticleKind::from_code(p.code).map(|kind| CascadeParticle {
                    kind,
                    energy: p.energy,
                    time: p.time,
                })
            })
            .collect()
    }
}
