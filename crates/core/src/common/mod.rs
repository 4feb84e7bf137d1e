//! Common utilities and types shared across the simulator.
//!
//! This module provides the fundamental building blocks used by every other
//! component:
//! 1. **Constants:** word layout, register file shape, and pipeline limits.
//! 2. **Error Handling:** the simulation-time error taxonomy.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for simulation-time failures.
pub mod error;

pub use error::SimError;
