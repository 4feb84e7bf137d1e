//! Instruction set definitions for the supported MIPS-I integer subset.
//!
//! This module covers everything the simulator knows about the ISA itself:
//! 1. **Opcode table:** the tagged `Opcode` enumeration and the mapping from
//!    `(primary, function)` encoding fields to it.
//! 2. **Decoding:** extraction of register indices, shift amounts, and
//!    immediates (with per-opcode sign/zero extension) from 32-bit words.
//! 3. **ABI:** conventional register names and well-known register indices.

/// Register ABI names and well-known indices.
pub mod abi;
/// Field extraction from 32-bit instruction words.
pub mod decode;
/// The decoded instruction record carried through the pipeline.
pub mod instruction;
/// Opcode enumeration and encoding tables.
pub mod opcode;

pub use instruction::{Instruction, Operand, Operands};
pub use opcode::{Kind, Opcode, Port};
