//! Instruction encoding.
//!
//! Maps a mnemonic and its parsed operands to a 32-bit word using the
//! standard MIPS packings (R: `0|rs|rt|rd|shamt|funct`, I: `op|rs|rt|imm`,
//! J: `op|target`). Label operands resolve here: branch labels become the
//! signed word offset `(label − pc) / 4`, jump labels the absolute address,
//! and load/store labels an absolute displacement off `$zero`.

use std::collections::BTreeMap;

use mipsim_core::isa::opcode::Opcode;

use crate::error::AsmError;
use crate::parser::OperandToken;

/// Label → address mapping produced by the first pass.
pub type Labels = BTreeMap<String, u32>;

/// Encodes one instruction at address `pc`.
pub fn encode(
    mnemonic: &str,
    operands: &[OperandToken],
    pc: u32,
    labels: &Labels,
) -> Result<u32, AsmError> {
    // `nop` assembles to the all-zero word (`sll $zero, $zero, 0`).
    if mnemonic == "nop" {
        return if operands.is_empty() {
            Ok(0)
        } else {
            Err(AsmError::InvalidInstructionFormat(mnemonic.to_string()))
        };
    }

    let opcode = Opcode::from_mnemonic(mnemonic)
        .ok_or_else(|| AsmError::InvalidInstructionName(mnemonic.to_string()))?;
    let format = || AsmError::InvalidInstructionFormat(mnemonic.to_string());
    let (_, function) = opcode.fields();

    match opcode {
        Opcode::Add
        | Opcode::Sub
        | Opcode::And
        | Opcode::Or
        | Opcode::Xor
        | Opcode::Nor
        | Opcode::Slt => {
            let [rd, rs, rt] = expect::<3>(operands, format)?;
            Ok(r_type(function, reg(rd, format)?, reg(rs, format)?, reg(rt, format)?, 0))
        }
        Opcode::Sll | Opcode::Sra => {
            let [rd, rt, shamt] = expect::<3>(operands, format)?;
            let shamt = match immediate(shamt, format)? {
                s @ 0..=31 => s as u32,
                _ => return Err(format()),
            };
            Ok(r_type(function, reg(rd, format)?, 0, reg(rt, format)?, shamt))
        }
        Opcode::Mult | Opcode::Div => {
            let [rs, rt] = expect::<2>(operands, format)?;
            Ok(r_type(function, 0, reg(rs, format)?, reg(rt, format)?, 0))
        }
        Opcode::Jr => {
            let [rs] = expect::<1>(operands, format)?;
            Ok(r_type(function, 0, reg(rs, format)?, 0, 0))
        }
        Opcode::Mfhi | Opcode::Mflo => {
            let [rd] = expect::<1>(operands, format)?;
            Ok(r_type(function, reg(rd, format)?, 0, 0, 0))
        }
        Opcode::Addi | Opcode::Andi | Opcode::Ori | Opcode::Xori | Opcode::Slti => {
            let [rt, rs, imm] = expect::<3>(operands, format)?;
            i_type(opcode, reg(rs, format)?, reg(rt, format)?, immediate(imm, format)?, mnemonic)
        }
        Opcode::Lui => {
            let [rt, imm] = expect::<2>(operands, format)?;
            i_type(opcode, 0, reg(rt, format)?, immediate(imm, format)?, mnemonic)
        }
        Opcode::Beq | Opcode::Bne => {
            let [rs, rt, target] = expect::<3>(operands, format)?;
            let offset = branch_offset(target, pc, labels, format)?;
            i_type(opcode, reg(rs, format)?, reg(rt, format)?, offset, mnemonic)
        }
        Opcode::Blez | Opcode::Bgtz => {
            let [rs, target] = expect::<2>(operands, format)?;
            let offset = branch_offset(target, pc, labels, format)?;
            i_type(opcode, reg(rs, format)?, 0, offset, mnemonic)
        }
        Opcode::Lw | Opcode::Sw => {
            let [rt, addr] = expect::<2>(operands, format)?;
            let (base, offset) = match addr {
                OperandToken::Displacement { offset, base } => (*base, i64::from(*offset)),
                OperandToken::Label(name) => (0, i64::from(resolve(name, labels)?)),
                OperandToken::Immediate(value) => (0, *value),
                OperandToken::Register(_) => return Err(format()),
            };
            i_type(opcode, base, reg(rt, format)?, offset, mnemonic)
        }
        Opcode::J | Opcode::Jal => {
            let [target] = expect::<1>(operands, format)?;
            let address = match target {
                OperandToken::Label(name) => i64::from(resolve(name, labels)?),
                OperandToken::Immediate(value) => *value,
                _ => return Err(format()),
            };
            if !(0..1 << 26).contains(&address) {
                return Err(format());
            }
            let (primary, _) = opcode.fields();
            Ok((primary << 26) | (address as u32))
        }
    }
}

/// Exactly `N` operands, or the format error.
fn expect<const N: usize>(
    operands: &[OperandToken],
    format: impl Fn() -> AsmError,
) -> Result<[&OperandToken; N], AsmError> {
    if operands.len() != N {
        return Err(format());
    }
    let mut out = [&operands[0]; N];
    for (slot, op) in out.iter_mut().zip(operands) {
        *slot = op;
    }
    Ok(out)
}

/// A register operand's index.
fn reg(token: &OperandToken, format: impl Fn() -> AsmError) -> Result<usize, AsmError> {
    match token {
        OperandToken::Register(index) => Ok(*index),
        _ => Err(format()),
    }
}

/// A literal immediate operand's value.
fn immediate(token: &OperandToken, format: impl Fn() -> AsmError) -> Result<i64, AsmError> {
    match token {
        OperandToken::Immediate(value) => Ok(*value),
        _ => Err(format()),
    }
}

/// A defined label's address.
fn resolve(name: &str, labels: &Labels) -> Result<u32, AsmError> {
    labels
        .get(name)
        .copied()
        .ok_or_else(|| AsmError::InvalidLabel(name.to_string()))
}

/// A branch target: labels become the signed word offset from `pc`,
/// literals are used as given.
fn branch_offset(
    token: &OperandToken,
    pc: u32,
    labels: &Labels,
    format: impl Fn() -> AsmError,
) -> Result<i64, AsmError> {
    match token {
        OperandToken::Label(name) => {
            let target = i64::from(resolve(name, labels)?);
            Ok((target - i64::from(pc)) / 4)
        }
        OperandToken::Immediate(value) => Ok(*value),
        _ => Err(format()),
    }
}

/// Packs an R-format word.
fn r_type(function: u32, rd: usize, rs: usize, rt: usize, shamt: u32) -> u32 {
    ((rs as u32) << 21) | ((rt as u32) << 16) | ((rd as u32) << 11) | (shamt << 6) | function
}

/// Packs an I-format word, range-checking the immediate.
fn i_type(opcode: Opcode, rs: usize, rt: usize, imm: i64, mnemonic: &str) -> Result<u32, AsmError> {
    if !(-(1 << 15)..1 << 16).contains(&imm) {
        return Err(AsmError::InvalidInstructionFormat(mnemonic.to_string()));
    }
    let (primary, _) = opcode.fields();
    Ok((primary << 26) | ((rs as u32) << 21) | ((rt as u32) << 16) | ((imm as u32) & 0xFFFF))
}
