use anyhow::{Context, Result, bail, ensure};
use rand::{Rng, RngCore};
use std::fs;
use std::path::Path;

use super::{CascadeGenerator, EmittedParticle, LIBRARY_MARKER, Nuclide};

/// Subdirectory of the library holding per-nuclide cascade tables.
pub const CASCADE_SUBDIR: &str = "cascades";

#[derive(Debug, Clone)]
struct WeightedCascade {
    cumulative: f64,
    particles: Vec<EmittedParticle>,
}

/// Cascade generator backed by a table of pre-computed cascades.
///
/// Each non-empty line of `cascades/ZA<za>.dat` is one cascade:
///
/// ```text
/// # weight  code:energy_MeV[:time_s] ...
/// 0.6  g:6.1109  g:2.4677
/// 0.4  g:7.7904  e:0.7863:1.2e-12
/// ```
pub struct TabulatedCascadeGenerator {
    nuclide: Nuclide,
    cascades: Vec<WeightedCascade>,
}

impl TabulatedCascadeGenerator {
    pub fn new(nuclide: Nuclide) -> Self {
        Self {
            nuclide,
            cascades: Vec::new(),
        }
    }

    pub fn table_path(library_dir: &Path, nuclide: Nuclide) -> std::path::PathBuf {
        library_dir
            .join(CASCADE_SUBDIR)
            .join(format!("ZA{}.dat", nuclide.za()))
    }

    pub fn num_cascades(&self) -> usize {
        self.cascades.len()
    }

    fn parse_particle(token: &str) -> Result<EmittedParticle> {
        let mut fields = token.split(':');
        let code = match fields.next().map(|s| s.trim()) {
            Some(s) if s.chars().count() == 1 => s.chars().next().unwrap_or('?'),
            _ => bail!("Invalid particle code in '{token}'"),
        };
        let energy: f64 = fields
            .next()
            .context("Missing particle energy")?
            .parse()
            .with_context(|| format!("Invalid particle energy in '{token}'"))?;
        let time: f64 = match fields.next() {
            Some(t) => t
                .parse()
                .with_context(|| format!("Invalid emission time in '{token}'"))?,
            None => 0.0,
        };
        ensure!(fields.next().is_none(), "Too many fields in '{token}'");
        Ok(EmittedParticle { code, energy, time })
    }

    fn parse_table(text: &str) -> Result<Vec<WeightedCascade>> {
        let mut cascades = Vec::new();
        let mut cumulative = 0.0;

        for (line_no, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let weight: f64 = tokens
                .next()
                .unwrap_or_default()
                .parse()
                .with_context(|| format!("Line {}: invalid weight", line_no + 1))?;
            ensure!(
                weight.is_finite() && weight > 0.0,
                "Line {}: weight must be positive",
                line_no + 1
            );
            let particles = tokens
                .map(Self::parse_particle)
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Line {}", line_no + 1))?;

            cumulative += weight;
            cascades.push(WeightedCascade {
                cumulative,
                particles,
            });
        }

        ensure!(!cascades.is_empty(), "Cascade table has no entries");
        Ok(cascades)
    }
}

impl CascadeGenerator for TabulatedCascadeGenerator {
    fn init(&mut self, library_dir: &Path) -> Result<()> {
        let marker = library_dir.join(LIBRARY_MARKER);
        ensure!(
            marker.is_file(),
            "Missing library marker file {}",
            marker.display()
        );

        let path = Self::table_path(library_dir, self.nuclide);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cascade table {}", path.display()))?;
        self.cascades = Self::parse_table(&text)
            .with_context(|| format!("Failed to parse cascade table {}", path.display()))?;
        Ok(())
    }

    fn generate_cascade(
        &mut self,
        _start_level: i32,
        _incident_energy: f64,
        rng: &mut dyn RngCore,
    ) -> Vec<EmittedParticle> {
        let Some(total) = self.cascades.last().map(|c| c.cumulative) else {
            return Vec::new();
        };
        let u: f64 = rng.gen_range(0.0..total);
        let idx = self
            .cascades
            .partition_point(|c| c.cumulative <= u)
            .min(self.cascades.len() - 1);
        self.cascades[idx].particles.clone()
    }
}

/// Factory producing [`TabulatedCascadeGenerator`] instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct TabulatedCascadeFactory;

impl super::CascadeFactory for TabulatedCascadeFactory {
    fn create(&self, nuclide: Nuclide) -> Box<dyn CascadeGenerator> {
        Box::new(TabulatedCascadeGenerator::new(nuclide))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn write_library(dir: &Path, za: i32, table: &str) {
        fs::write(dir.join(LIBRARY_MARKER), "").unwrap();
        fs::create_dir_all(dir.join(CASCADE_SUBDIR)).unwrap();
        fs::write(dir.join(CASCADE_SUBDIR).join(format!("ZA{za}.dat")), table).unwrap();
    }

    #[test]
    fn test_parse_particle() {
        let p = TabulatedCascadeGenerator::parse_particle("e:0.5:1e-9").unwrap();
        assert_eq!(p.code, 'e');
        assert_eq!(p.energy, 0.5);
        assert_eq!(p.time, 1e-9);

        let p = TabulatedCascadeGenerator::parse_particle("g:6.1").unwrap();
        assert_eq!(p.time, 0.0);

        assert!(TabulatedCascadeGenerator::parse_particle("gg:1.0").is_err());
        assert!(TabulatedCascadeGenerator::parse_particle("g").is_err());
        assert!(TabulatedCascadeGenerator::parse_particle("g:x").is_err());
    }

    #[test]
    fn test_init_requires_marker() {
        let dir = tempfile::tempdir().unwrap();
        let mut generator = TabulatedCascadeGenerator::new(Nuclide::default());
        assert!(generator.init(dir.path()).is_err());
    }

    #[test]
    fn test_init_requires_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(LIBRARY_MARKER), "").unwrap();
        let mut generator = TabulatedCascadeGenerator::new(Nuclide::default());
        assert!(generator.init(dir.path()).is_err());
    }

    #[test]
    fn test_rejects_bad_weight() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path(), 17035, "-1 g:1.0\n");
        let mut generator = TabulatedCascadeGenerator::new(Nuclide::default());
        assert!(generator.init(dir.path()).is_err());
    }

    #[test]
    fn test_weighted_sampling() {
        let dir = tempfile::tempdir().unwrap();
        write_library(
            dir.path(),
            17035,
            "# comment\n3 g:6.0 g:2.0\n\n1 g:8.0 # trailing\n",
        );
        let mut generator = TabulatedCascadeGenerator::new(Nuclide::default());
        generator.init(dir.path()).unwrap();
        assert_eq!(generator.num_cascades(), 2);

        let mut rng = StdRng::seed_from_u64(42);
        let n = 40_000;
        let mut two_gamma = 0;
        for _ in 0..n {
            let cascade = generator.generate_cascade(-1, -1e-6, &mut rng);
            match cascade.len() {
                2 => two_gamma += 1,
                1 => assert_eq!(cascade[0].energy, 8.0),
                other => panic!("unexpected cascade length {other}"),
            }
        }
        let frac = two_gamma as f64 / n as f64;
        assert!((frac - 0.75).abs() < 0.02, "fraction = {frac}");
    }

    #[test]
    fn test_uninitialized_generates_nothing() {
        let mut generator = TabulatedCascadeGenerator::new(Nuclide::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(generator.generate_cascade(-1, -1e-6, &mut rng).is_empty());
    }
}
