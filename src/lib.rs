pub mod cli;
pub mod geom;
pub mod io;
pub mod sim;

// Prelude
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use sim::cascade::Nuclide;
pub use sim::config::{SimulationConfig, WorkerCount};
pub use sim::deposit::Detector;
pub use sim::generator::SourceMode;
pub use sim::result::{RunSummary, SimulationResult};
pub use sim::simulation::Simulation;
