use rand::RngCore;
use std::ops::Range;

use super::primary::PrimaryVertex;
use super::transport::Transport;

/// Callbacks invoked by the event loop around transport.
pub trait RunHooks {
    fn begin_of_run(&mut self) {}

    fn begin_of_event(&mut self, _event_id: u64) {}

    /// Primaries of the event about to be transported.
    fn generate_primaries(&mut self, event_id: u64) -> Vec<PrimaryVertex>;

    /// Energy (MeV) deposited in the volume `volume_id`.
    fn on_deposit(&mut self, _energy: f64, _volume_id: i32) {}

    fn end_of_event(&mut self, _event_id: u64) {}

    fn end_of_run(&mut self) {}
}

/// Runs the events in `events` through `transport`, one after another.
pub fn process_events<H: RunHooks + ?Sized>(
    hooks: &mut H,
    transport: &dyn Transport,
    rng: &mut dyn RngCore,
    events: Range<u64>,
) {
    hooks.begin_of_run();
    for event_id in events {
        hooks.begin_of_event(event_id);
        let primaries = hooks.generate_primaries(event_id);
        for vertex in &primaries {
            transport.transport(vertex, rng, &mut |energy: f64, volume_id: i32| {
                hooks.on_deposit(energy, volume_id)
            });
        }
        hooks.end_of_event(event_id);
    }
    hooks.end_of_run();
}
