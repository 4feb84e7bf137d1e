//! The decoded instruction record carried through the pipeline.
//!
//! An `Instruction` is created at decode, has its operand snapshot captured
//! from the register file in the same stage, and is then owned by its
//! re-order buffer entry until it retires or its speculation block is
//! squashed. Functional units read the snapshot and, for renamed operands,
//! follow the recorded tag into the re-order buffer (the forwarding path).

use crate::core::pipeline::rob::RobId;
use crate::isa::abi;
use crate::isa::decode::Decoded;
use crate::isa::opcode::{Kind, Opcode};

/// One captured source operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    /// The architectural value was valid at decode.
    Value(i32),
    /// The register was renamed; the value must be read from this
    /// re-order buffer entry at execute.
    Pending(RobId),
}

/// Operand snapshot taken at decode.
///
/// `None` means the operation does not read that register at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Operands {
    /// Snapshot of `rs` (rewritten to HI/LO for `mfhi`/`mflo`).
    pub rs: Option<Operand>,
    /// Snapshot of `rt`.
    pub rt: Option<Operand>,
}

/// A decoded, in-flight instruction.
#[derive(Clone, Debug)]
pub struct Instruction {
    /// Program counter this instruction was fetched from.
    pub pc: u32,
    /// The decoded operation.
    pub opcode: Opcode,
    /// Source register index.
    pub rs: usize,
    /// Target register index.
    pub rt: usize,
    /// Destination register index.
    pub rd: usize,
    /// Constant shift amount for `sll`/`sra`.
    pub shamt: u32,
    /// Immediate, already extended per the operation.
    pub imm: i32,
    /// Absolute jump target for J-format operations.
    pub target: u32,
    /// Operand snapshot captured at decode.
    pub operands: Operands,
    /// Re-order buffer entry owning this instruction; bound at insertion.
    pub rob: Option<RobId>,
    /// Next PC predicted at fetch.
    pub prediction: u32,
    /// Speculation block this instruction was fetched under.
    pub block: u64,
    /// Remaining execution cycles; counted down by the functional unit.
    pub cycles: u32,
}

impl Instruction {
    /// Builds an instruction from decoded fields and fetch metadata.
    ///
    /// `mfhi`/`mflo` read HI/LO through the `rs` slot, so their source
    /// index is rewritten here, before the operand snapshot is captured.
    pub fn new(decoded: Decoded, pc: u32, prediction: u32, block: u64) -> Self {
        let rs = match decoded.opcode {
            Opcode::Mfhi => abi::HI,
            Opcode::Mflo => abi::LO,
            _ => decoded.rs,
        };
        Self {
            pc,
            opcode: decoded.opcode,
            rs,
            rt: decoded.rt,
            rd: decoded.rd,
            shamt: decoded.shamt,
            imm: decoded.imm,
            target: decoded.target,
            operands: Operands::default(),
            rob: None,
            prediction,
            block,
            cycles: decoded.opcode.latency(),
        }
    }

    /// Registers this instruction renames, in result-map order.
    ///
    /// `mult` tags LO; `div` tags LO and HI; branches, stores, `jr` and `j`
    /// tag nothing; `jal` tags the return register.
    pub fn destinations(&self) -> Vec<usize> {
        match self.opcode.kind() {
            Kind::R => match self.opcode {
                Opcode::Mult => vec![abi::LO],
                Opcode::Div => vec![abi::LO, abi::HI],
                Opcode::Jr => vec![],
                _ => vec![self.rd],
            },
            Kind::I => match self.opcode {
                Opcode::Beq | Opcode::Bne | Opcode::Blez | Opcode::Bgtz | Opcode::Sw => {
                    vec![]
                }
                _ => vec![self.rt],
            },
            Kind::J => match self.opcode {
                Opcode::Jal => vec![abi::RA],
                _ => vec![],
            },
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.opcode.kind() {
            Kind::R => write!(
                f,
                "{} (rd: {}) (rs: {}) (rt: {}) (shamt: {})",
                self.opcode,
                abi::register_name(self.rd),
                abi::register_name(self.rs),
                abi::register_name(self.rt),
                self.shamt,
            ),
            Kind::I => write!(
                f,
                "{} (rs: {}) (rt: {}) (imm: {})",
                self.opcode,
                abi::register_name(self.rs),
                abi::register_name(self.rt),
                self.imm,
            ),
            Kind::J => write!(f, "{} (addr: {})", self.opcode, self.target),
        }
    }
}
