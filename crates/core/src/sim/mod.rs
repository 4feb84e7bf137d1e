//! Simulation: the top-level `Simulator` and the assembled-program format.

/// Assembled-program file format and loader.
pub mod loader;
/// Top-level simulator: owns the pipeline and drives it to termination.
pub mod simulator;

pub use loader::{LoadError, Program};
pub use simulator::Simulator;
