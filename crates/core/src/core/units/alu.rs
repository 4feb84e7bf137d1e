//! Arithmetic/logic execution.
//!
//! All results are 32-bit two's complement with wrapping overflow. `mult`
//! deposits the low word of the product in LO; `div` uses floor division
//! (quotient rounds toward negative infinity, remainder takes the divisor's
//! sign) and deposits quotient in LO and remainder in HI. Division by zero
//! yields LO = -1 and HI = the dividend.

use crate::isa::abi;
use crate::isa::opcode::Opcode;
use crate::isa::Instruction;

use super::eu::Ops;

/// Executes an ALU-port operation, returning its `(register, value)` writes.
pub fn execute(ins: &Instruction, ops: &Ops) -> Vec<(usize, i32)> {
    match ins.opcode {
        Opcode::Add => vec![(ins.rd, ops.rs.wrapping_add(ops.rt))],
        Opcode::Sub => vec![(ins.rd, ops.rs.wrapping_sub(ops.rt))],
        Opcode::And => vec![(ins.rd, ops.rs & ops.rt)],
        Opcode::Or => vec![(ins.rd, ops.rs | ops.rt)],
        Opcode::Xor => vec![(ins.rd, ops.rs ^ ops.rt)],
        Opcode::Nor => vec![(ins.rd, !(ops.rs | ops.rt))],
        Opcode::Slt => vec![(ins.rd, i32::from(ops.rs < ops.rt))],
        Opcode::Sll => vec![(ins.rd, ((ops.rt as u32) << ins.shamt) as i32)],
        Opcode::Sra => vec![(ins.rd, ops.rt >> ins.shamt)],
        Opcode::Mult => vec![(abi::LO, ops.rs.wrapping_mul(ops.rt))],
        Opcode::Div => {
            let (quotient, remainder) = floor_div_rem(ops.rs, ops.rt);
            vec![(abi::LO, quotient), (abi::HI, remainder)]
        }
        Opcode::Mfhi | Opcode::Mflo => vec![(ins.rd, ops.rs)],
        Opcode::Addi => vec![(ins.rt, ops.rs.wrapping_add(ins.imm))],
        Opcode::Andi => vec![(ins.rt, ops.rs & ins.imm)],
        Opcode::Ori => vec![(ins.rt, ops.rs | ins.imm)],
        Opcode::Xori => vec![(ins.rt, ops.rs ^ ins.imm)],
        Opcode::Slti => vec![(ins.rt, i32::from(ops.rs < ins.imm))],
        Opcode::Lui => vec![(ins.rt, ((ins.imm as u32) << 16) as i32)],
        _ => Vec::new(),
    }
}

/// Floor division: quotient toward negative infinity, remainder with the
/// divisor's sign. Division by zero yields `(-1, dividend)`.
fn floor_div_rem(dividend: i32, divisor: i32) -> (i32, i32) {
    if divisor == 0 {
        return (-1, dividend);
    }
    let quotient = dividend.wrapping_div(divisor);
    let remainder = dividend.wrapping_rem(divisor);
    if remainder != 0 && (remainder < 0) != (divisor < 0) {
        (quotient.wrapping_sub(1), remainder.wrapping_add(divisor))
    } else {
        (quotient, remainder)
    }
}
