//! Assembled-program file format and loader.
//!
//! The contract between the assembler and the simulator is a serialized
//! pair: the memory image (a sparse address → byte mapping) and the entry
//! program counter. It is stored as JSON and must round-trip losslessly.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::mem::Memory;

/// Errors reading or writing a program file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read or written.
    #[error("program file i/o: {0}")]
    Io(#[from] std::io::Error),
    /// The file contents are not a valid program.
    #[error("program file format: {0}")]
    Format(#[from] serde_json::Error),
}

/// An assembled program: sparse byte memory plus the entry point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Byte-addressable memory image.
    pub memory: BTreeMap<u32, u8>,
    /// Initial program counter (the address of `main`).
    pub entry: u32,
}

impl Program {
    /// Reads a program from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let data = fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Writes the program to disk.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        let data = serde_json::to_vec(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Builds the simulator's memory image from this program.
    pub fn into_memory(self) -> Memory {
        Memory::new(self.memory)
    }
}

/// Writes a human-readable dump of a memory image.
///
/// One line per loaded byte, in address order. Used for the post-run
/// `memory.out` dump and the assembler's stdout listing.
pub fn dump_memory(mem: &Memory, mut out: impl Write) -> std::io::Result<()> {
    for (addr, byte) in mem.iter() {
        writeln!(out, "{addr}: {byte:08b}")?;
    }
    Ok(())
}
