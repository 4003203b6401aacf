//! Batch script: one command per line, `#` starts a comment.
//!
//! ```text
//! /random/setSeed 42
//! /source/mode single
//! /run/beamOn 100000
//! ```

use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;

use crate::sim::generator::SourceMode;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    /// Run the given number of events.
    BeamOn(u64),
    SetSourceMode(SourceMode),
    SetSeed(u64),
    Echo(String),
    /// Accepted for compatibility, no effect (verbosity, initialization).
    NoOp(String),
}

/// Commands accepted without effect.
const NO_OP_PREFIXES: [&str; 4] = ["/run/initialize", "/run/printProgress", "/control/verbose", "/tracking/"];

fn is_no_op(name: &str) -> bool {
    name.ends_with("/verbose") || NO_OP_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Parses one line. Blank and comment lines give `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (name, args) = match line.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (line, ""),
    };

    let command = match name {
        "/run/beamOn" => {
            let n: u64 = args
                .parse()
                .map_err(|_| anyhow!("Invalid event count '{args}'"))?;
            ScriptCommand::BeamOn(n)
        }
        "/source/mode" => ScriptCommand::SetSourceMode(args.parse()?),
        "/random/setSeed" | "/random/setSeeds" => {
            let first = args.split_whitespace().next().unwrap_or("");
            let seed: u64 = first
                .parse()
                .map_err(|_| anyhow!("Invalid seed '{first}'"))?;
            ScriptCommand::SetSeed(seed)
        }
        "/control/echo" => ScriptCommand::Echo(args.to_string()),
        _ if is_no_op(name) => ScriptCommand::NoOp(name.to_string()),
        _ => bail!("Unknown command '{name}'"),
    };
    Ok(Some(command))
}

/// Parses a whole script. Invalid lines are skipped and, unless `quiet`,
/// logged.
pub fn parse_script(text: &str, quiet: bool) -> Vec<ScriptCommand> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| match parse_line(line) {
            Ok(command) => command,
            Err(e) => {
                if !quiet {
                    log::warn!("Script line {}: {e}, skipped", i + 1);
                }
                None
            }
        })
        .collect()
}

pub fn read_script(path: &Path, quiet: bool) -> Result<Vec<ScriptCommand>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script: {}", path.display()))?;
    Ok(parse_script(&text, quiet))
}
