//! Field extraction from 32-bit instruction words.
//!
//! The primary opcode occupies bits 31..26; when it is zero the function
//! field in bits 5..0 selects among the R-format operations. Immediates are
//! extended per operation: sign-extended for arithmetic, memory, and branch
//! offsets; zero-extended for the logical immediates; `lui` keeps the raw
//! 16-bit field and shifts it at execute.

use crate::common::SimError;
use crate::isa::opcode::Opcode;

/// Bit shift of the primary opcode field.
const OPCODE_SHIFT: u32 = 26;
/// Mask for the 6-bit function field (bits 5..0).
const FUNCTION_MASK: u32 = 0x3F;
/// Mask for a 5-bit register index field.
const REG_MASK: u32 = 0x1F;
/// Bit shift of the `rs` field (bits 25..21).
const RS_SHIFT: u32 = 21;
/// Bit shift of the `rt` field (bits 20..16).
const RT_SHIFT: u32 = 16;
/// Bit shift of the `rd` field (bits 15..11).
const RD_SHIFT: u32 = 11;
/// Bit shift of the shift-amount field (bits 10..6).
const SHAMT_SHIFT: u32 = 6;
/// Mask for the 16-bit immediate field.
const IMM_MASK: u32 = 0xFFFF;
/// Mask for the 26-bit jump target field.
const TARGET_MASK: u32 = 0x03FF_FFFF;

/// Raw fields extracted from one instruction word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded operation.
    pub opcode: Opcode,
    /// Source register index (bits 25..21).
    pub rs: usize,
    /// Target register index (bits 20..16).
    pub rt: usize,
    /// Destination register index (bits 15..11).
    pub rd: usize,
    /// 5-bit constant shift amount (bits 10..6).
    pub shamt: u32,
    /// 16-bit immediate, extended per the operation's semantics.
    pub imm: i32,
    /// 26-bit absolute jump target.
    pub target: u32,
}

/// Decodes a 32-bit word into its fields.
///
/// Fails with `InvalidOpcode` when the `(primary, function)` pair is not in
/// the supported set.
pub fn decode(word: u32) -> Result<Decoded, SimError> {
    let primary = word >> OPCODE_SHIFT;
    let function = word & FUNCTION_MASK;
    let opcode = Opcode::decode_fields(primary, function)?;
    Ok(Decoded {
        opcode,
        rs: ((word >> RS_SHIFT) & REG_MASK) as usize,
        rt: ((word >> RT_SHIFT) & REG_MASK) as usize,
        rd: ((word >> RD_SHIFT) & REG_MASK) as usize,
        shamt: (word >> SHAMT_SHIFT) & REG_MASK,
        imm: extend_immediate(opcode, word & IMM_MASK),
        target: word & TARGET_MASK,
    })
}

/// Applies the per-operation extension rule to a raw 16-bit immediate.
fn extend_immediate(opcode: Opcode, raw: u32) -> i32 {
    match opcode {
        // Arithmetic, memory, and branch offsets are signed.
        Opcode::Addi
        | Opcode::Slti
        | Opcode::Lw
        | Opcode::Sw
        | Opcode::Beq
        | Opcode::Bne
        | Opcode::Blez
        | Opcode::Bgtz => raw as u16 as i16 as i32,
        // Logical immediates and `lui` are unsigned.
        _ => raw as i32,
    }
}
