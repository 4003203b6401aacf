use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::Range;

use super::deposit::{DepositAccumulator, Detector};
use super::generator::{EventGenerator, SourceMode};
use super::lifecycle::{RunHooks, process_events};
use super::primary::PrimaryVertex;
use super::reducer::RunTotals;
use super::run::Run;
use super::transport::Transport;

/// Events whose energies are logged at debug level.
const NUM_LOGGED_EVENTS: u64 = 10;

/// Mixed into the transport seed so it differs from the generator seed.
const TRANSPORT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Per-worker event actions: primary generation and deposit bookkeeping.
pub struct WorkerActions {
    generator: EventGenerator,
    accumulator: DepositAccumulator,
    run: Run,
    totals: RunTotals,
    rows: Vec<[f64; 2]>,
    rng: StdRng,
}

impl WorkerActions {
    pub fn new(generator: EventGenerator, accumulator: DepositAccumulator, rng: StdRng) -> Self {
        Self {
            generator,
            accumulator,
            run: Run::new(),
            totals: RunTotals::default(),
            rows: Vec::new(),
            rng,
        }
    }

    pub fn generator(&self) -> &EventGenerator {
        &self.generator
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    pub fn totals(&self) -> &RunTotals {
        &self.totals
    }

    /// Event rows (keV) of events with at least one hit.
    pub fn rows(&self) -> &[[f64; 2]] {
        &self.rows
    }
}

impl RunHooks for WorkerActions {
    fn begin_of_run(&mut self) {
        self.run.reset();
        self.totals = RunTotals::default();
        self.rows.clear();
        self.generator.begin_run();
    }

    fn begin_of_event(&mut self, _event_id: u64) {
        self.accumulator.reset();
    }

    fn generate_primaries(&mut self, _event_id: u64) -> Vec<PrimaryVertex> {
        self.generator.generate_event(&mut self.rng)
    }

    fn on_deposit(&mut self, energy: f64, volume_id: i32) {
        self.accumulator.add_deposit(energy, volume_id);
    }

    fn end_of_event(&mut self, event_id: u64) {
        let deposits = self.accumulator.finalize_event();
        self.run.count_event();

        if event_id < NUM_LOGGED_EVENTS {
            log::debug!(
                "Event {event_id}: E1 = {:.3} keV, E2 = {:.3} keV",
                deposits.total(Detector::One) * 1000.,
                deposits.total(Detector::Two) * 1000.
            );
        }

        for det in Detector::ALL {
            if deposits.is_hit(det) {
                let energy = deposits.total(det);
                self.run.record_hit(energy, det);
                self.totals.record(det, energy);
            }
        }
        if deposits.any_hit() {
            self.rows.push(deposits.row_kev());
        }
    }
}

/// One worker: its actions plus the random stream used by transport.
pub struct Worker {
    index: usize,
    actions: WorkerActions,
    transport_rng: StdRng,
}

impl Worker {
    pub fn new(index: usize, generator: EventGenerator, threshold: f64, seed: u64) -> Self {
        let (rng, transport_rng) = Self::rngs(index, seed);
        Self {
            index,
            actions: WorkerActions::new(
                generator,
                DepositAccumulator::with_threshold(threshold),
                rng,
            ),
            transport_rng,
        }
    }

    fn rngs(index: usize, seed: u64) -> (StdRng, StdRng) {
        let s = seed.wrapping_add(index as u64);
        (
            StdRng::seed_from_u64(s),
            StdRng::seed_from_u64(s ^ TRANSPORT_SEED_SALT),
        )
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reseed(&mut self, seed: u64) {
        let (rng, transport_rng) = Self::rngs(self.index, seed);
        self.actions.rng = rng;
        self.transport_rng = transport_rng;
    }

    pub fn set_source_mode(&mut self, mode: SourceMode) {
        self.actions.generator.set_source_mode(mode);
    }

    pub fn actions(&self) -> &WorkerActions {
        &self.actions
    }

    /// Processes `events` as one run of this worker.
    pub fn run_events(&mut self, transport: &dyn Transport, events: Range<u64>) {
        log::debug!("Worker {} processing events {:?}", self.index, events);
        process_events(
            &mut self.actions,
            transport,
            &mut self.transport_rng,
            events,
        );
    }
}
