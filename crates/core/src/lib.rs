//! Cycle-accurate MIPS-I system simulator library.
//!
//! This crate models a subset of the MIPS-I integer ISA on an out-of-order,
//! N-way superscalar processor. It provides:
//! 1. **Core:** fetch/decode/execute/writeback pipeline controller, register
//!    file with renaming, reservation station, re-order buffer, and
//!    parallel execution units (ALU, LSU, BEU).
//! 2. **Prediction:** a two-bit saturating branch predictor with a return
//!    address stack and speculative-flush recovery.
//! 3. **ISA:** decoding for the 28 supported MIPS-I integer operations.
//! 4. **Simulation:** `Simulator` (owns the pipeline), the assembled-program
//!    loader, configuration, and statistics.

/// Common types and constants (word layout, register indices, errors).
pub mod common;
/// Simulator configuration (pipeline width, reservation station capacity).
pub mod config;
/// Processor core: memory image, register file, pipeline, execution units.
pub mod core;
/// Instruction set: opcode table, field decoding, register ABI names.
pub mod isa;
/// Simulation: `Simulator`, assembled-program format, and loader.
pub mod sim;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Assembled program image: sparse byte memory plus an entry point.
pub use crate::sim::loader::Program;
/// Top-level simulator; owns the pipeline and drives it to termination.
pub use crate::sim::simulator::Simulator;
