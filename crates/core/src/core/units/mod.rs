//! Execution units.
//!
//! Two execution units run side by side: the master (ALU + LSU + BEU) and
//! the slave (ALU only). Each subunit accepts one instruction per cycle.
//! The branch prediction unit lives here too, but is owned by the pipeline
//! controller and passed into execution by mutable handle.

/// Arithmetic/logic operations (including mult/div and the HI/LO moves).
pub mod alu;
/// Branch execution: condition resolution and true next-PC computation.
pub mod beu;
/// Branch prediction unit: two-bit counter and return address stack.
pub mod bru;
/// Execution unit composition and master/slave dispatch.
pub mod eu;
/// Load/store execution.
pub mod lsu;

pub use bru::BranchPredictor;
pub use eu::{dispatch, ExecOutcome, ExecutionUnit};
