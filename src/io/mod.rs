//! File I/O for simulation inputs and outputs.
//!
//! Event rows, per-detector spectra, the JSON run summary and batch scripts.

pub mod events;
pub mod script;
pub mod spectrum;
pub mod summary;

pub use events::{EventFileFormat, read_events, write_events};
pub use script::{ScriptCommand, parse_script, read_script};
pub use spectrum::{read_spectrum, spectrum_path, write_spectra, write_spectrum};
pub use summary::{read_summary, write_summary};
