use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::cascade::{CAPTURE_LEVEL, CascadeSource, THERMAL_INCIDENT_ENERGY};
use super::primary::PrimaryVertex;
use super::sampling::{
    CO60_LINE_HIGH, CO60_LINE_LOW, sample_fixed_line, sample_isotropic_direction,
    sample_source_position,
};

/// How primaries are produced for each event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SourceMode {
    /// Both Co-60 lines per event.
    #[default]
    FixedCascade,
    /// One Co-60 line per event.
    SingleGamma,
    /// Cascade sampled from the statistical capture library.
    StatisticalCapture,
}

impl SourceMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::FixedCascade => "Co-60 coincidence (1173+1332 keV)",
            Self::SingleGamma => "single gamma (1173 or 1332 keV)",
            Self::StatisticalCapture => "statistical capture cascade",
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::FixedCascade => "coin",
            Self::SingleGamma => "single",
            Self::StatisticalCapture => "nudex",
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SourceMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coin" | "fixed" | "cascade" => Ok(Self::FixedCascade),
            "single" => Ok(Self::SingleGamma),
            "nudex" | "capture" => Ok(Self::StatisticalCapture),
            other => anyhow::bail!("Unknown source mode '{other}'"),
        }
    }
}

/// Per-worker primary generator.
pub struct EventGenerator {
    mode: SourceMode,
    cascade: CascadeSource,
    quiet: bool,
}

impl EventGenerator {
    pub fn new(mode: SourceMode, cascade: CascadeSource, quiet: bool) -> Self {
        Self {
            mode,
            cascade,
            quiet,
        }
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn cascade(&self) -> &CascadeSource {
        &self.cascade
    }

    /// Switches the source mode for subsequent events.
    pub fn set_source_mode(&mut self, mode: SourceMode) {
        if mode == self.mode {
            return;
        }
        if !self.quiet {
            log::info!("Source mode switched to {}", mode);
        }
        self.mode = mode;
    }

    pub fn begin_run(&mut self) {
        self.cascade.begin_run();
    }

    /// Produces the primary vertices of one event.
    pub fn generate_event<R: Rng>(&mut self, rng: &mut R) -> Vec<PrimaryVertex> {
        match self.mode {
            SourceMode::FixedCascade => {
                let position = sample_source_position(rng);
                [CO60_LINE_LOW, CO60_LINE_HIGH]
                    .into_iter()
                    .map(|energy| {
                        PrimaryVertex::gamma(energy, position, sample_isotropic_direction(rng))
                    })
                    .collect()
            }
            SourceMode::SingleGamma => {
                let energy = sample_fixed_line(rng);
                let position = sample_source_position(rng);
                vec![PrimaryVertex::gamma(
                    energy,
                    position,
                    sample_isotropic_direction(rng),
                )]
            }
            SourceMode::StatisticalCapture => {
                let particles =
                    self.cascade
                        .generate_cascade(CAPTURE_LEVEL, THERMAL_INCIDENT_ENERGY, rng);
                if particles.is_empty() {
                    return Vec::new();
                }
                let position = sample_source_position(rng);
                particles
                    .into_iter()
                    .map(|p| PrimaryVertex {
                        kind: p.kind,
                        energy: p.energy,
                        position,
                        direction: sample_isotropic_direction(rng),
                        time: p.time,
                    })
                    .collect()
            }
        }
    }
}

impl fmt::Debug for EventGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventGenerator")
            .field("mode", &self.mode)
            .field("nuclide", &self.cascade.nuclide())
            .field("cascade_ready", &self.cascade.is_ready())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::cascade::{
        CascadeFactory, CascadeGenerator, EmittedParticle, Nuclide, TabulatedCascadeFactory,
    };
    use crate::sim::primary::ParticleKind;
    use rand::RngCore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::Path;
    use std::sync::Arc;

    struct FixedList(Vec<EmittedParticle>);

    impl CascadeGenerator for FixedList {
        fn init(&mut self, _library_dir: &Path) -> anyhow::Result<()> {
            Ok(())
        }

        fn generate_cascade(
            &mut self,
            _start_level: i32,
            _incident_energy: f64,
            _rng: &mut dyn RngCore,
        ) -> Vec<EmittedParticle> {
            self.0.clone()
        }
    }

    fn generator_with(mode: SourceMode, particles: Vec<EmittedParticle>) -> EventGenerator {
        let factory: Arc<dyn CascadeFactory> =
            Arc::new(move |_n: Nuclide| -> Box<dyn CascadeGenerator> {
                Box::new(FixedList(particles.clone()))
            });
        let cascade = CascadeSource::new(Nuclide::default(), "lib", factory, true);
        EventGenerator::new(mode, cascade, true)
    }

    #[test]
    fn test_fixed_cascade_two_vertices() {
        let mut generator = generator_with(SourceMode::FixedCascade, vec![]);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let vertices = generator.generate_event(&mut rng);
            assert_eq!(vertices.len(), 2);
            assert_eq!(vertices[0].energy, CO60_LINE_LOW);
            assert_eq!(vertices[1].energy, CO60_LINE_HIGH);
            assert_eq!(vertices[0].position, vertices[1].position);
            for v in &vertices {
                assert_eq!(v.kind, ParticleKind::Gamma);
                assert_eq!(v.time, 0.0);
                assert!((v.direction.length() - 1.).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_fixed_cascade_directions_are_independent() {
        let mut generator = generator_with(SourceMode::FixedCascade, vec![]);
        let mut rng = StdRng::seed_from_u64(2);
        let n = 50_000;
        // Mean of the dot product between independent isotropic directions is 0
        let mut sum_dot = 0.0;
        for _ in 0..n {
            let v = generator.generate_event(&mut rng);
            sum_dot += v[0].direction.dot(v[1].direction);
        }
        let mean = sum_dot / n as f64;
        // Var(dot) = 1/3
        let sigma = (1. / 3. / n as f64).sqrt();
        assert!(mean.abs() < 5. * sigma, "mean dot = {mean}");
    }

    #[test]
    fn test_single_gamma_balance() {
        let mut generator = generator_with(SourceMode::SingleGamma, vec![]);
        let mut rng = StdRng::seed_from_u64(3);
        let n = 100_000;
        let mut low = 0;
        for _ in 0..n {
            let v = generator.generate_event(&mut rng);
            assert_eq!(v.len(), 1);
            if v[0].energy == CO60_LINE_LOW {
                low += 1;
            } else {
                assert_eq!(v[0].energy, CO60_LINE_HIGH);
            }
        }
        let frac = low as f64 / n as f64;
        assert!((frac - 0.5).abs() < 5. * (0.25 / n as f64).sqrt());
    }

    #[test]
    fn test_capture_uses_cascade_particles() {
        let particles = vec![
            EmittedParticle {
                code: 'g',
                energy: 6.1,
                time: 0.0,
            },
            EmittedParticle {
                code: 'x',
                energy: 1.0,
                time: 0.0,
            },
            EmittedParticle {
                code: 'e',
                energy: 0.3,
                time: 2e-12,
            },
        ];
        let mut generator = generator_with(SourceMode::StatisticalCapture, particles);
        let mut rng = StdRng::seed_from_u64(4);
        let v = generator.generate_event(&mut rng);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].kind, ParticleKind::Gamma);
        assert_eq!(v[0].energy, 6.1);
        assert_eq!(v[1].kind, ParticleKind::Electron);
        assert_eq!(v[1].time, 2e-12);
        assert_eq!(v[0].position, v[1].position);
    }

    #[test]
    fn test_capture_without_library_yields_nothing() {
        let factory: Arc<dyn CascadeFactory> = Arc::new(TabulatedCascadeFactory);
        let cascade = CascadeSource::new(
            Nuclide::default(),
            "/nonexistent/cascade/library/",
            factory,
            true,
        );
        let mut generator = EventGenerator::new(SourceMode::StatisticalCapture, cascade, true);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(generator.generate_event(&mut rng).is_empty());
        }
        assert!(generator.cascade().has_failed());
    }

    #[test]
    fn test_set_source_mode() {
        let mut generator = generator_with(SourceMode::FixedCascade, vec![]);
        generator.set_source_mode(SourceMode::FixedCascade);
        assert_eq!(generator.mode(), SourceMode::FixedCascade);
        generator.set_source_mode(SourceMode::SingleGamma);
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(generator.generate_event(&mut rng).len(), 1);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("coin".parse::<SourceMode>().unwrap(), SourceMode::FixedCascade);
        assert_eq!("SINGLE".parse::<SourceMode>().unwrap(), SourceMode::SingleGamma);
        assert_eq!(
            "nudex".parse::<SourceMode>().unwrap(),
            SourceMode::StatisticalCapture
        );
        assert!("laser".parse::<SourceMode>().is_err());
    }
}
