//! Top-level simulator.
//!
//! Owns the pipeline and drives it tick by tick until the machine reports
//! itself idle. After termination the two return-value registers (`$v0`,
//! `$v1`) hold the program's results and the memory image can be dumped.

use tracing::debug;

use crate::common::SimError;
use crate::config::Config;
use crate::core::mem::Memory;
use crate::core::pipeline::Pipeline;
use crate::core::regfile::RegisterFile;
use crate::core::units::BranchPredictor;
use crate::isa::abi;
use crate::sim::loader::Program;
use crate::stats::SimStats;

/// The simulator: a pipeline plus the run loop.
#[derive(Debug)]
pub struct Simulator {
    pipeline: Pipeline,
}

impl Simulator {
    /// Builds a simulator for an assembled program.
    pub fn new(program: Program, config: &Config) -> Self {
        let entry = program.entry;
        Self {
            pipeline: Pipeline::new(program.into_memory(), entry, config),
        }
    }

    /// Advances the machine by one clock tick.
    pub fn tick(&mut self) -> Result<(), SimError> {
        self.pipeline.advance()
    }

    /// True once the pipeline has fully drained.
    pub fn finished(&self) -> bool {
        self.pipeline.finished()
    }

    /// Runs until the program terminates.
    ///
    /// Termination is a tick after which nothing was fetched, nothing is
    /// pending decode, and the reservation station, re-order buffer, and
    /// recovery machinery are all idle. The idle test is only meaningful
    /// after a tick, so this always advances at least once.
    pub fn run(&mut self) -> Result<(), SimError> {
        loop {
            self.tick()?;
            if self.finished() {
                debug!(
                    cycles = self.pipeline.stats().cycles,
                    "program terminated"
                );
                return Ok(());
            }
        }
    }

    /// The program's two return values: (`$v0`, `$v1`).
    pub fn return_values(&self) -> (i32, i32) {
        let regs = self.pipeline.registers();
        (regs.value(abi::V0), regs.value(abi::V1))
    }

    /// Architectural register file.
    pub fn registers(&self) -> &RegisterFile {
        self.pipeline.registers()
    }

    /// Final memory image.
    pub fn memory(&self) -> &Memory {
        self.pipeline.memory()
    }

    /// Branch predictor state.
    pub fn predictor(&self) -> &BranchPredictor {
        self.pipeline.predictor()
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &SimStats {
        self.pipeline.stats()
    }
}
