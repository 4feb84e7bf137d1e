//! Simulation-time error taxonomy.
//!
//! Two kinds of failure flow through `SimError`:
//! 1. **Decode faults:** an unmapped `(opcode, function)` pair reached the
//!    decoder (`InvalidOpcode`).
//! 2. **Scheduling faults:** an internal contract of the issue logic was
//!    violated (`AlreadyExecuting`, `Unsupported`, `ResultNotReady`). The
//!    reservation station and dispatcher guarantee these never surface
//!    during normal execution; seeing one aborts the simulation.
//!
//! A branch misprediction is *not* an error. It is a routine control-flow
//! event handled by the flush/recovery path in the pipeline controller.

use thiserror::Error;

use crate::core::pipeline::rob::RobId;

/// Fatal simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// The `(opcode, function)` pair does not map to a supported operation.
    #[error("invalid opcode: primary {opcode:#08b}, function {function:#08b}")]
    InvalidOpcode {
        /// Primary opcode field (bits 31..26).
        opcode: u32,
        /// Function field (bits 5..0); meaningful only when `opcode` is 0.
        function: u32,
    },

    /// A functional subunit was handed a second instruction in one cycle.
    #[error("subunit {0} already executing an instruction this cycle")]
    AlreadyExecuting(&'static str),

    /// An instruction was dispatched to a unit lacking the required subunit.
    #[error("instruction `{0}` not supported by this execution unit")]
    Unsupported(&'static str),

    /// A forwarding read hit a re-order buffer entry that has not finished.
    #[error("result not yet ready for re-order buffer entry {0}")]
    ResultNotReady(RobId),

    /// A data access touched an address outside the loaded image.
    #[error("memory fault: no byte loaded at address {0:#x}")]
    MemoryFault(u32),
}
