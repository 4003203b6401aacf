//! Per-event energy file.
//!
//! One row per event with at least one hit: the detector 1 and detector 2
//! energies in keV. Sub-threshold energies of the other detector are kept.

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Magic bytes at the start of a binary event file.
pub const BINARY_MAGIC: &[u8; 8] = b"DHPGEEVT";

/// Column header of the ASCII event file.
pub const ASCII_HEADER: &str = "# e1_keV e2_keV";

/// Event file format variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventFileFormat {
    /// Whitespace-separated text, one event per line
    #[default]
    Ascii,
    /// Magic, u64 row count, then little-endian f64 pairs
    Binary,
}

impl FromStr for EventFileFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" | "text" | "txt" => Ok(Self::Ascii),
            "binary" | "bin" => Ok(Self::Binary),
            other => bail!("Unknown event file format '{other}'"),
        }
    }
}

/// Writes event rows to `path`, replacing any existing file.
pub fn write_events(path: &Path, rows: &[[f64; 2]], format: EventFileFormat) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    match format {
        EventFileFormat::Ascii => {
            writeln!(writer, "{}", ASCII_HEADER)?;
            for [e1, e2] in rows {
                writeln!(writer, "{} {}", e1, e2)?;
            }
        }
        EventFileFormat::Binary => {
            writer.write_all(BINARY_MAGIC)?;
            writer.write_all(&(rows.len() as u64).to_le_bytes())?;
            for [e1, e2] in rows {
                writer.write_all(&e1.to_le_bytes())?;
                writer.write_all(&e2.to_le_bytes())?;
            }
        }
    }

    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    Ok(())
}

/// Reads event rows, detecting the format from the magic bytes.
pub fn read_events(path: &Path) -> Result<Vec<[f64; 2]>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let is_binary = reader.fill_buf()?.starts_with(BINARY_MAGIC);
    if is_binary {
        read_events_binary(&mut reader)
            .with_context(|| format!("Invalid binary event file: {}", path.display()))
    } else {
        read_events_ascii(reader)
            .with_context(|| format!("Invalid event file: {}", path.display()))
    }
}

fn read_events_ascii<R: BufRead>(reader: R) -> Result<Vec<[f64; 2]>> {
    let mut rows = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        ensure!(parts.len() == 2, "Line {}: expected 2 columns", line_no + 1);
        let e1: f64 = parts[0]
            .parse()
            .with_context(|| format!("Line {}: invalid e1", line_no + 1))?;
        let e2: f64 = parts[1]
            .parse()
            .with_context(|| format!("Line {}: invalid e2", line_no + 1))?;
        rows.push([e1, e2]);
    }
    Ok(rows)
}

fn read_events_binary<R: Read>(reader: &mut R) -> Result<Vec<[f64; 2]>> {
    let mut magic = [0u8; 8];
    reader.read_exact(&mut magic)?;

    let mut count_bytes = [0u8; 8];
    reader.read_exact(&mut count_bytes)?;
    let count = u64::from_le_bytes(count_bytes);

    let mut rows = Vec::new();
    let mut buf = [0u8; 8];
    for i in 0..count {
        let mut row = [0.0; 2];
        for value in row.iter_mut() {
            reader
                .read_exact(&mut buf)
                .with_context(|| format!("Truncated at row {i}"))?;
            *value = f64::from_le_bytes(buf);
        }
        rows.push(row);
    }
    Ok(rows)
}
