use anyhow::{Context, Result};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::Arc;

use super::cascade::{CascadeFactory, CascadeSource, TabulatedCascadeFactory};
use super::config::SimulationConfig;
use super::deposit::Detector;
use super::detector::DetectorSetup;
use super::generator::{EventGenerator, SourceMode};
use super::reducer::RunReducer;
use super::result::SimulationResult;
use super::run::Run;
use super::transport::{AcceptanceTransport, Transport};
use super::worker::Worker;

/// Splits `num_events` into `num_workers` contiguous, disjoint ranges.
pub fn split_events(num_events: u64, num_workers: usize) -> Vec<Range<u64>> {
    let k = num_workers.max(1) as u64;
    let base = num_events / k;
    let extra = num_events % k;
    let mut start = 0;
    (0..k)
        .map(|i| {
            let len = base + u64::from(i < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

pub struct Simulation {
    config: SimulationConfig,
    setup: DetectorSetup,
    transport: Arc<dyn Transport>,
    pool: rayon::ThreadPool,
    workers: Vec<Worker>,
    reducer: RunReducer,
    mode: SourceMode,
}

impl Simulation {
    /// Simulation with the built-in transport and tabulated cascade library.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let setup = DetectorSetup::new(config.detector_angle_deg);
        Self::with_collaborators(
            config,
            Arc::new(AcceptanceTransport::new(setup)),
            Arc::new(TabulatedCascadeFactory),
        )
    }

    pub fn with_collaborators(
        config: SimulationConfig,
        transport: Arc<dyn Transport>,
        factory: Arc<dyn CascadeFactory>,
    ) -> Result<Self> {
        let mode = config.source_mode;
        let requested = config.workers.resolve();
        let num_workers = config.effective_workers(mode);
        if num_workers < requested && !config.quiet {
            log::warn!(
                "Statistical capture source is not thread-safe, forcing single-thread mode ({} requested)",
                requested
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .build()
            .context("Failed to build worker thread pool")?;

        let workers = (0..num_workers)
            .map(|index| {
                let cascade = CascadeSource::new(
                    config.nuclide,
                    config.library_dir.clone(),
                    factory.clone(),
                    config.quiet,
                );
                let generator = EventGenerator::new(mode, cascade, config.quiet);
                Worker::new(index, generator, config.threshold, config.seed)
            })
            .collect();

        Ok(Self {
            setup: DetectorSetup::new(config.detector_angle_deg),
            config,
            transport,
            pool,
            workers,
            reducer: RunReducer::new(),
            mode,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn source_mode(&self) -> SourceMode {
        self.mode
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Workers taking part in the next run.
    pub fn effective_workers(&self) -> usize {
        match self.mode {
            SourceMode::StatisticalCapture => 1,
            _ => self.workers.len(),
        }
    }

    /// Changes the source mode for subsequent runs.
    pub fn set_source_mode(&mut self, mode: SourceMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        for worker in &mut self.workers {
            worker.set_source_mode(mode);
        }
        if mode == SourceMode::StatisticalCapture && self.workers.len() > 1 && !self.config.quiet
        {
            log::warn!("Statistical capture source runs on worker 0 only");
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
        for worker in &mut self.workers {
            worker.reseed(seed);
        }
    }

    /// Runs `num_events` events and merges the worker results.
    pub fn beam_on(&mut self, num_events: u64) -> Result<SimulationResult> {
        let active = self.effective_workers();
        let ranges = split_events(num_events, active);
        if !self.config.quiet {
            log::info!(
                "Starting run of {} events on {} worker(s), source: {}",
                num_events,
                active,
                self.mode
            );
        }

        self.reducer.reset();
        let workers = &mut self.workers;
        let transport: &dyn Transport = &*self.transport;
        self.pool.install(|| {
            workers[..active]
                .par_iter_mut()
                .zip(ranges.into_par_iter())
                .for_each(|(worker, events)| worker.run_events(transport, events));
        });

        // End-of-run barrier passed: merge every worker exactly once
        let mut master = Run::new();
        let mut rows = Vec::new();
        for worker in &self.workers[..active] {
            let actions = worker.actions();
            self.reducer.reduce(actions.totals());
            master.merge(actions.run());
            rows.extend_from_slice(actions.rows());
        }

        let mass = |det: Detector| self.setup.scoring_mass_kg(det.id()).unwrap_or(0.0);
        Ok(SimulationResult {
            run: master,
            totals: self.reducer.snapshot(),
            rows,
            source_mode: self.mode,
            detector_angle_deg: self.setup.angle_deg(),
            workers: active,
            masses_kg: [mass(Detector::One), mass(Detector::Two)],
        })
    }
}
