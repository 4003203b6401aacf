//! Plain-text gamma spectra, one `bin_keV count` line per nonzero bin.

use anyhow::{Context, Result, ensure};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::sim::deposit::Detector;
use crate::sim::histogram::{EnergyHistogram, NUM_BINS};

/// Spectrum file name of a detector inside `dir`.
pub fn spectrum_path(dir: &Path, detector: Detector) -> PathBuf {
    dir.join(format!("gamma_spectrum_det{}.dat", detector.id()))
}

pub fn write_spectrum(path: &Path, histogram: &EnergyHistogram) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# Energy_keV Counts")?;
    for (bin, count) in histogram.nonzero_bins() {
        writeln!(writer, "{} {}", bin, count)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

pub fn read_spectrum(path: &Path) -> Result<EnergyHistogram> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut histogram = EnergyHistogram::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(bin), Some(count)) = (parts.next(), parts.next()) else {
            anyhow::bail!("Line {}: expected 'bin count'", line_no + 1);
        };
        let bin: usize = bin
            .parse()
            .with_context(|| format!("Line {}: invalid bin", line_no + 1))?;
        let count: u64 = count
            .parse()
            .with_context(|| format!("Line {}: invalid count", line_no + 1))?;
        ensure!(bin < NUM_BINS, "Line {}: bin {} out of range", line_no + 1, bin);
        histogram.set_count(bin, count);
    }
    Ok(histogram)
}

/// Writes both detector spectra into `dir`.
pub fn write_spectra(dir: &Path, histograms: [&EnergyHistogram; 2]) -> Result<()> {
    for (det, histogram) in Detector::ALL.into_iter().zip(histograms) {
        write_spectrum(&spectrum_path(dir, det), histogram)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut h = EnergyHistogram::new();
        for _ in 0..3 {
            h.record(1.332);
        }
        h.record(0.0105);

        let path = spectrum_path(dir.path(), Detector::Two);
        assert!(path.ends_with("gamma_spectrum_det2.dat"));
        write_spectrum(&path, &h).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n10 1\n"));
        assert!(text.contains("\n1332 3\n"));
        assert_eq!(read_spectrum(&path).unwrap(), h);
    }

    #[test]
    fn test_rejects_out_of_range_bin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.dat");
        std::fs::write(&path, "10000 1\n").unwrap();
        assert!(read_spectrum(&path).is_err());
    }

    #[test]
    fn test_write_spectra() {
        let dir = tempfile::tempdir().unwrap();
        let h1 = EnergyHistogram::new();
        let h2 = EnergyHistogram::new();
        write_spectra(dir.path(), [&h1, &h2]).unwrap();
        assert!(dir.path().join("gamma_spectrum_det1.dat").is_file());
        assert!(dir.path().join("gamma_spectrum_det2.dat").is_file());
    }
}
