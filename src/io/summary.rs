//! JSON run summary.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::sim::result::RunSummary;

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, summary)
        .with_context(|| format!("Failed to serialize run summary to: {}", path.display()))?;

    Ok(())
}

pub fn read_summary(path: &Path) -> Result<RunSummary> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let summary: RunSummary = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse run summary from: {}", path.display()))?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::generator::SourceMode;

    #[test]
    fn test_write_read_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary {
            num_events: 42,
            detector_angle_deg: 90.,
            source_mode: SourceMode::SingleGamma,
            workers: 2,
            detectors: Vec::new(),
        };
        write_summary(&path, &summary).unwrap();
        let back = read_summary(&path).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_read_missing() {
        assert!(read_summary(Path::new("/nonexistent/summary.json")).is_err());
    }
}
