//! Execution unit composition and master/slave dispatch.
//!
//! An execution unit bundles up to three subunits (ALU, LSU, BEU), each of
//! which accepts one instruction per cycle. The controller runs a master
//! unit with all three and a slave with only an ALU; a ready instruction is
//! first offered to the master and falls over to the slave when the
//! master's subunit is occupied. The reservation station's port budget
//! (one LSU, one BEU, two ALU per cycle) guarantees the fallback always
//! succeeds; a failure here is a scheduling bug and aborts the simulation.

use crate::common::SimError;
use crate::core::mem::Memory;
use crate::core::pipeline::rob::Rob;
use crate::core::units::bru::BranchPredictor;
use crate::core::units::{alu, beu, lsu};
use crate::isa::instruction::Operand;
use crate::isa::opcode::Port;
use crate::isa::Instruction;

/// Resolved source operand values for one instruction.
///
/// Slots the instruction does not read resolve to zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ops {
    /// Resolved `rs` value.
    pub rs: i32,
    /// Resolved `rt` value.
    pub rt: i32,
}

/// What executing one instruction produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecOutcome {
    /// True next PC (always `pc + 4` for non-branch operations).
    pub next_pc: u32,
    /// Destination register writes, in result-map order.
    pub writes: Vec<(usize, i32)>,
}

/// One execution unit: a bundle of single-issue subunits.
#[derive(Clone, Debug)]
pub struct ExecutionUnit {
    has_lsu: bool,
    has_beu: bool,
    busy_alu: bool,
    busy_lsu: bool,
    busy_beu: bool,
}

impl ExecutionUnit {
    /// Full-capability unit: ALU, LSU, and BEU.
    pub fn master() -> Self {
        Self {
            has_lsu: true,
            has_beu: true,
            busy_alu: false,
            busy_lsu: false,
            busy_beu: false,
        }
    }

    /// ALU-only unit.
    pub fn slave() -> Self {
        Self {
            has_lsu: false,
            has_beu: false,
            busy_alu: false,
            busy_lsu: false,
            busy_beu: false,
        }
    }

    /// Executes one instruction on the matching subunit.
    ///
    /// Operands are taken from the decode-time snapshot; renamed operands
    /// are read out of the producing re-order buffer entry (the forwarding
    /// path). Fails with `AlreadyExecuting` when the subunit has been used
    /// this cycle and `Unsupported` when this unit lacks it.
    pub fn execute(
        &mut self,
        ins: &Instruction,
        rob: &Rob,
        mem: &mut Memory,
        predictor: &mut BranchPredictor,
    ) -> Result<ExecOutcome, SimError> {
        let ops = resolve_operands(ins, rob)?;
        let fallthrough = ins.pc.wrapping_add(4);
        match ins.opcode.port() {
            Port::Alu => {
                self.claim(true, Port::Alu, ins)?;
                Ok(ExecOutcome {
                    next_pc: fallthrough,
                    writes: alu::execute(ins, &ops),
                })
            }
            Port::Lsu => {
                self.claim(self.has_lsu, Port::Lsu, ins)?;
                Ok(ExecOutcome {
                    next_pc: fallthrough,
                    writes: lsu::execute(ins, &ops, mem)?.into_iter().collect(),
                })
            }
            Port::Beu => {
                self.claim(self.has_beu, Port::Beu, ins)?;
                let (next_pc, write) = beu::execute(ins, &ops, predictor);
                Ok(ExecOutcome {
                    next_pc,
                    writes: write.into_iter().collect(),
                })
            }
        }
    }

    /// Marks every subunit free again; called by the controller after each
    /// cycle's execute stage.
    pub fn clear_subunits(&mut self) {
        self.busy_alu = false;
        self.busy_lsu = false;
        self.busy_beu = false;
    }

    /// Checks capability and single-issue occupancy, then claims the slot.
    fn claim(&mut self, supported: bool, port: Port, ins: &Instruction) -> Result<(), SimError> {
        if !supported {
            return Err(SimError::Unsupported(ins.opcode.mnemonic()));
        }
        let (busy, name) = match port {
            Port::Alu => (&mut self.busy_alu, "alu"),
            Port::Lsu => (&mut self.busy_lsu, "lsu"),
            Port::Beu => (&mut self.busy_beu, "beu"),
        };
        if *busy {
            return Err(SimError::AlreadyExecuting(name));
        }
        *busy = true;
        Ok(())
    }
}

/// Resolves both source operands from the snapshot or the forwarding path.
fn resolve_operands(ins: &Instruction, rob: &Rob) -> Result<Ops, SimError> {
    let resolve = |op: Option<Operand>, reg: usize| match op {
        None => Ok(0),
        Some(Operand::Value(v)) => Ok(v),
        Some(Operand::Pending(tag)) => rob.get_result(tag, reg),
    };
    Ok(Ops {
        rs: resolve(ins.operands.rs, ins.rs)?,
        rt: resolve(ins.operands.rt, ins.rt)?,
    })
}

/// Routes one ready instruction to an available unit.
///
/// The master is tried first; only an occupied subunit falls the
/// instruction over to the slave. Any slave failure (occupied ALU or an
/// unsupported port) propagates as a fatal scheduling error.
pub fn dispatch(
    master: &mut ExecutionUnit,
    slave: &mut ExecutionUnit,
    ins: &Instruction,
    rob: &Rob,
    mem: &mut Memory,
    predictor: &mut BranchPredictor,
) -> Result<ExecOutcome, SimError> {
    match master.execute(ins, rob, mem, predictor) {
        Err(SimError::AlreadyExecuting(_)) => slave.execute(ins, rob, mem, predictor),
        outcome => outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pipeline::rob::RobId;
    use crate::isa::decode;
    use crate::isa::instruction::Operands;

    const ADD: u32 = (8 << 21) | (9 << 16) | (10 << 11) | 32;
    const LW: u32 = (35 << 26) | (8 << 21) | (9 << 16);

    fn ins(word: u32, operands: Operands) -> Instruction {
        let mut ins = Instruction::new(decode::decode(word).unwrap(), 0, 4, 0);
        ins.operands = operands;
        ins
    }

    fn values(rs: i32, rt: i32) -> Operands {
        Operands {
            rs: Some(Operand::Value(rs)),
            rt: Some(Operand::Value(rt)),
        }
    }

    #[test]
    fn subunits_accept_one_instruction_per_cycle() {
        let mut unit = ExecutionUnit::master();
        let mut mem = Memory::default();
        let mut bp = BranchPredictor::new();
        let rob = Rob::new();
        let add = ins(ADD, values(1, 2));

        assert!(unit.execute(&add, &rob, &mut mem, &mut bp).is_ok());
        assert_eq!(
            unit.execute(&add, &rob, &mut mem, &mut bp),
            Err(SimError::AlreadyExecuting("alu"))
        );

        unit.clear_subunits();
        assert!(unit.execute(&add, &rob, &mut mem, &mut bp).is_ok());
    }

    #[test]
    fn slave_rejects_loads_and_branches() {
        let mut slave = ExecutionUnit::slave();
        let mut mem = Memory::default();
        let mut bp = BranchPredictor::new();
        let rob = Rob::new();
        let lw = ins(LW, values(32, 0));
        assert_eq!(
            slave.execute(&lw, &rob, &mut mem, &mut bp),
            Err(SimError::Unsupported("lw"))
        );
    }

    #[test]
    fn dispatch_falls_over_to_the_slave_alu() {
        let mut master = ExecutionUnit::master();
        let mut slave = ExecutionUnit::slave();
        let mut mem = Memory::default();
        let mut bp = BranchPredictor::new();
        let rob = Rob::new();
        let add = ins(ADD, values(2, 3));

        let first = dispatch(&mut master, &mut slave, &add, &rob, &mut mem, &mut bp).unwrap();
        let second = dispatch(&mut master, &mut slave, &add, &rob, &mut mem, &mut bp).unwrap();
        assert_eq!(first.writes, vec![(10, 5)]);
        assert_eq!(second.writes, vec![(10, 5)]);

        // A third ALU op in the same cycle has nowhere to go.
        let third = dispatch(&mut master, &mut slave, &add, &rob, &mut mem, &mut bp);
        assert_eq!(third, Err(SimError::AlreadyExecuting("alu")));
    }

    #[test]
    fn forwarded_operands_read_the_producer_entry() {
        let mut master = ExecutionUnit::master();
        let mut mem = Memory::default();
        let mut bp = BranchPredictor::new();
        let mut rob = Rob::new();

        let producer = rob.insert_entry(ins(ADD, values(1, 2)));
        rob.write_result(producer, 8, 41);
        rob.mark_ready(producer);

        let consumer = ins(
            ADD,
            Operands {
                rs: Some(Operand::Pending(producer)),
                rt: Some(Operand::Value(1)),
            },
        );
        let outcome = master.execute(&consumer, &rob, &mut mem, &mut bp).unwrap();
        assert_eq!(outcome.writes, vec![(10, 42)]);
    }

    #[test]
    fn forwarding_from_an_unfinished_entry_is_fatal() {
        let mut master = ExecutionUnit::master();
        let mut mem = Memory::default();
        let mut bp = BranchPredictor::new();
        let mut rob = Rob::new();
        let producer = rob.insert_entry(ins(ADD, values(1, 2)));

        let consumer = ins(
            ADD,
            Operands {
                rs: Some(Operand::Pending(producer)),
                rt: None,
            },
        );
        assert_eq!(
            master.execute(&consumer, &rob, &mut mem, &mut bp),
            Err(SimError::ResultNotReady(RobId(0)))
        );
    }
}
