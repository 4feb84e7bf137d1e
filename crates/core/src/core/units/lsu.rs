//! Load/store execution.
//!
//! `lw` composes four consecutive bytes big-endian into the target
//! register's result; `sw` splits the target register into four big-endian
//! bytes at `rs + imm`. Stores take effect in memory at execute and produce
//! no register result. A load from an unloaded address is a `MemoryFault`.

use crate::common::SimError;
use crate::core::mem::Memory;
use crate::isa::opcode::Opcode;
use crate::isa::Instruction;

use super::eu::Ops;

/// Executes a load/store, returning the register write for `lw`.
pub fn execute(
    ins: &Instruction,
    ops: &Ops,
    mem: &mut Memory,
) -> Result<Option<(usize, i32)>, SimError> {
    let addr = ops.rs.wrapping_add(ins.imm) as u32;
    match ins.opcode {
        Opcode::Lw => Ok(Some((ins.rt, mem.load_word(addr)?))),
        Opcode::Sw => {
            mem.store_word(addr, ops.rt);
            Ok(None)
        }
        _ => Ok(None),
    }
}
