use anyhow::{Context, Result};
use env_logger::Env;
use std::path::Path;

use dualhpge::cli::{self, Cli};
use dualhpge::io::{self, ScriptCommand};
use dualhpge::sim::deposit::Detector;
use dualhpge::sim::detector::DetectorSetup;
use dualhpge::{Simulation, SimulationConfig, SimulationResult, SourceMode};

fn print_banner(config: &SimulationConfig, script: Option<&Path>) {
    println!("\n========================================");
    println!("  Dual HPGe Detector Simulation");
    println!("========================================\n");
    println!("Configuration:");
    println!("  Detector 2 angle: {} degrees", config.detector_angle_deg);
    let setup = DetectorSetup::new(config.detector_angle_deg);
    for det in Detector::ALL {
        let p = setup.housing_position(det);
        println!(
            "  Detector {} housing at ({:.1}, {:.1}, {:.1}) mm",
            det.id(),
            p.x,
            p.y,
            p.z
        );
    }
    if config.source_mode == SourceMode::StatisticalCapture {
        println!("  Cascade library: {}", config.library_dir.display());
        println!(
            "  Generation mode: {} ({})",
            config.source_mode, config.nuclide
        );
    } else {
        println!("  Generation mode: {}", config.source_mode);
    }
    if let Some(script) = script {
        println!("  Script: {}", script.display());
    }
    println!("  Threads: {}", config.workers);
    println!();
}

fn write_outputs(config: &SimulationConfig, result: &SimulationResult) -> Result<()> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    io::write_events(&config.event_file_path(), &result.rows, config.event_format)?;
    if config.write_spectra {
        io::write_spectra(
            dir,
            [
                result.run.histogram(Detector::One),
                result.run.histogram(Detector::Two),
            ],
        )?;
    }
    if config.write_summary {
        io::write_summary(&dir.join("summary.json"), &result.summary())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().collect();
    let quiet = cli::quiet_requested(&argv);
    env_logger::Builder::from_env(Env::default().default_filter_or(if quiet {
        "warn"
    } else {
        "info"
    }))
    .init();

    let cli = match Cli::parse_lenient(argv) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };
    let (config, script) = cli.into_config();

    if !config.quiet {
        print_banner(&config, script.as_deref());
    }

    let commands = match &script {
        Some(path) => match io::read_script(path, config.quiet) {
            Ok(commands) => commands,
            Err(e) => {
                log::error!("{e:#}, running {} events instead", config.events_per_run);
                vec![ScriptCommand::BeamOn(config.events_per_run)]
            }
        },
        None => vec![ScriptCommand::BeamOn(config.events_per_run)],
    };

    let mut sim = Simulation::new(config.clone())?;
    if !config.quiet {
        if sim.num_workers() > 1 {
            println!("Multi-threading enabled with {} threads", sim.num_workers());
        } else {
            println!("Single-threaded mode");
        }
    }

    for command in commands {
        match command {
            ScriptCommand::BeamOn(num_events) => {
                let result = sim.beam_on(num_events)?;
                if result.num_events() == 0 {
                    continue;
                }
                println!("{}", result.summary());
                write_outputs(&config, &result)?;
            }
            ScriptCommand::SetSourceMode(mode) => sim.set_source_mode(mode),
            ScriptCommand::SetSeed(seed) => sim.set_seed(seed),
            ScriptCommand::Echo(text) => println!("{text}"),
            ScriptCommand::NoOp(name) => log::debug!("Ignoring {name}"),
        }
    }

    Ok(())
}
