//! Branch execution.
//!
//! Resolves the true next PC for every branch-port operation. Conditional
//! branches test their sources, take `pc + (imm << 2)` when the condition
//! holds, fall through to `pc + 4` otherwise, and always train the shared
//! predictor with the outcome. `j`/`jal` return the decoded absolute target
//! (`jal` also links `pc + 4` into the return register); `jr` returns the
//! resolved source value.

use crate::core::units::bru::BranchPredictor;
use crate::isa::abi;
use crate::isa::opcode::Opcode;
use crate::isa::Instruction;

use super::eu::Ops;

/// Executes a branch-port operation.
///
/// Returns the true next PC and the register write, if any (`jal` only).
pub fn execute(
    ins: &Instruction,
    ops: &Ops,
    predictor: &mut BranchPredictor,
) -> (u32, Option<(usize, i32)>) {
    let fallthrough = ins.pc.wrapping_add(4);
    match ins.opcode {
        Opcode::Beq | Opcode::Bne | Opcode::Blez | Opcode::Bgtz => {
            let taken = match ins.opcode {
                Opcode::Beq => ops.rs == ops.rt,
                Opcode::Bne => ops.rs != ops.rt,
                Opcode::Blez => ops.rs <= 0,
                _ => ops.rs > 0,
            };
            predictor.update_prediction(taken);
            let next = if taken {
                ins.pc.wrapping_add((ins.imm << 2) as u32)
            } else {
                fallthrough
            };
            (next, None)
        }
        Opcode::J => (ins.target, None),
        Opcode::Jal => (ins.target, Some((abi::RA, fallthrough as i32))),
        Opcode::Jr => (ops.rs as u32, None),
        _ => (fallthrough, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::bru::CounterState;
    use crate::isa::decode;

    fn ins(word: u32, pc: u32) -> Instruction {
        Instruction::new(decode::decode(word).unwrap(), pc, pc + 4, 0)
    }

    /// `beq $t0, $t1, 2`
    const BEQ_FWD: u32 = (4 << 26) | (8 << 21) | (9 << 16) | 2;
    /// `bne $t0, $zero, -2`
    const BNE_BACK: u32 = (5 << 26) | (8 << 21) | 0xFFFE;

    #[test]
    fn taken_branch_scales_the_offset_by_four() {
        let mut bp = BranchPredictor::new();
        let (pc, write) = execute(&ins(BEQ_FWD, 100), &Ops { rs: 3, rt: 3 }, &mut bp);
        assert_eq!(pc, 108);
        assert_eq!(write, None);
    }

    #[test]
    fn not_taken_branch_falls_through() {
        let mut bp = BranchPredictor::new();
        let (pc, _) = execute(&ins(BEQ_FWD, 100), &Ops { rs: 3, rt: 4 }, &mut bp);
        assert_eq!(pc, 104);
    }

    #[test]
    fn backward_branch_targets_are_signed() {
        let mut bp = BranchPredictor::new();
        let (pc, _) = execute(&ins(BNE_BACK, 100), &Ops { rs: 1, rt: 0 }, &mut bp);
        assert_eq!(pc, 92);
    }

    #[test]
    fn conditional_branches_train_the_predictor() {
        let mut bp = BranchPredictor::new();
        let _ = execute(&ins(BEQ_FWD, 100), &Ops { rs: 1, rt: 1 }, &mut bp);
        assert_eq!(bp.state(), CounterState::StronglyTaken);
        let _ = execute(&ins(BEQ_FWD, 100), &Ops { rs: 1, rt: 2 }, &mut bp);
        assert_eq!(bp.state(), CounterState::WeaklyTaken);
    }

    #[test]
    fn blez_and_bgtz_test_the_source_sign() {
        let mut bp = BranchPredictor::new();
        let blez = (6 << 26) | (8 << 21) | 1;
        let (pc, _) = execute(&ins(blez, 0), &Ops { rs: 0, rt: 0 }, &mut bp);
        assert_eq!(pc, 4, "zero is less-or-equal: taken to pc + 4·1");
        let bgtz = (7 << 26) | (8 << 21) | 1;
        let (pc, _) = execute(&ins(bgtz, 0), &Ops { rs: 0, rt: 0 }, &mut bp);
        assert_eq!(pc, 4, "zero is not greater: falls through to pc + 4");
    }

    #[test]
    fn jal_links_the_return_address() {
        let mut bp = BranchPredictor::new();
        let jal = (3 << 26) | 64;
        let (pc, write) = execute(&ins(jal, 100), &Ops { rs: 0, rt: 0 }, &mut bp);
        assert_eq!(pc, 64);
        assert_eq!(write, Some((abi::RA, 104)));
    }

    #[test]
    fn jr_returns_the_source_value() {
        let mut bp = BranchPredictor::new();
        let jr = (8 << 21) | 8;
        let (pc, write) = execute(&ins(jr, 100), &Ops { rs: 200, rt: 0 }, &mut bp);
        assert_eq!(pc, 200);
        assert_eq!(write, None);
    }
}
