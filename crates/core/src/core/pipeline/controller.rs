//! Pipeline controller.
//!
//! Advances the machine one clock tick at a time. Within a tick the stage
//! order is fixed:
//! 1. **Recovery check:** once a mispredict flush has fully drained the
//!    re-order buffer, leave recovery and revalidate the register file.
//! 2. **Fetch:** up to N words, following predictions, unless the machine
//!    is in recovery or the reservation station is near-full.
//! 3. **Writeback:** retire up to N finished re-order buffer entries.
//! 4. **Execute:** issue ready reservation-station entries to the
//!    master/slave units; a mispredicting branch flushes here.
//! 5. **Decode:** the previous tick's fetch group enters the re-order
//!    buffer and reservation station, capturing operands and renaming
//!    destinations.
//! 6. **Rotate:** this tick's fetch group becomes the next tick's decode
//!    input.
//!
//! Writeback sees the previous tick's ready entries, execute sees the
//! station as of this tick, and decode runs last so dependencies on
//! just-executed instructions resolve over the forwarding path rather than
//! the register file.

use tracing::{debug, trace};

use crate::common::constants::WORD_BYTES;
use crate::common::SimError;
use crate::config::Config;
use crate::core::mem::Memory;
use crate::core::pipeline::rob::{Rob, RobId};
use crate::core::pipeline::station::ReservationStation;
use crate::core::regfile::{RegRead, RegisterFile};
use crate::core::units::bru::BranchPredictor;
use crate::core::units::eu::{self, ExecutionUnit};
use crate::isa::instruction::{Instruction, Operand, Operands};
use crate::isa::opcode::{Kind, Opcode};
use crate::isa::{abi, decode};
use crate::stats::SimStats;

/// One fetched instruction slot.
#[derive(Clone, Copy, Debug)]
pub struct Fetched {
    /// Address the word was fetched from.
    pub pc: u32,
    /// The raw 32-bit word.
    pub word: u32,
    /// Predicted next PC.
    pub prediction: u32,
    /// Speculation block current after prediction.
    pub block: u64,
}

/// The pipeline: all shared machine state plus the per-tick fetch buffers.
#[derive(Debug)]
pub struct Pipeline {
    width: usize,
    pc: u32,
    memory: Memory,
    regs: RegisterFile,
    rob: Rob,
    station: ReservationStation,
    predictor: BranchPredictor,
    master: ExecutionUnit,
    slave: ExecutionUnit,
    /// This tick's fetch group.
    raw: Vec<Option<Fetched>>,
    /// The previous tick's fetch group, pending decode.
    prev_raw: Vec<Option<Fetched>>,
    stats: SimStats,
}

impl Pipeline {
    /// Creates a pipeline over a loaded memory image.
    ///
    /// The stack pointer is parked `config.stack_words` words above the
    /// highest loaded address.
    pub fn new(memory: Memory, entry: u32, config: &Config) -> Self {
        let width = config.pipeline.width.max(1);
        let mut regs = RegisterFile::new();
        let stack_base = memory
            .highest_address()
            .map_or(0, |top| top + 1)
            .wrapping_add(config.stack_words * WORD_BYTES);
        regs.set_value(abi::SP, stack_base as i32);
        Self {
            width,
            pc: entry,
            memory,
            regs,
            rob: Rob::new(),
            station: ReservationStation::new(config.pipeline.rs_capacity),
            predictor: BranchPredictor::new(),
            master: ExecutionUnit::master(),
            slave: ExecutionUnit::slave(),
            raw: vec![None; width],
            prev_raw: vec![None; width],
            stats: SimStats::default(),
        }
    }

    /// Advances the pipeline by one clock tick.
    pub fn advance(&mut self) -> Result<(), SimError> {
        self.stats.cycles += 1;

        // 1. Leave recovery once every re-order buffer entry has drained.
        if self.predictor.in_recovery() && self.rob.no_writebacks() {
            self.predictor.finish_recovery();
            self.regs.set_all_valid();
            debug!(cycle = self.stats.cycles, "mispredict recovery complete");
        }

        // 2. Fetch, unless recovering or the station could overflow.
        if !self.predictor.in_recovery() && self.station.has_room_for(self.width) {
            self.raw = self.fetch();
        }

        // 3. Writeback.
        self.writeback();

        // 4. Execute.
        self.execute()?;

        // 5. Decode the previous tick's fetch group.
        self.decode_pending()?;

        // 6. Rotate the fetch buffers.
        self.prev_raw = std::mem::replace(&mut self.raw, vec![None; self.width]);
        Ok(())
    }

    /// True when the whole machine is idle: nothing fetched this tick,
    /// nothing pending decode, the station and re-order buffer drained, and
    /// the predictor out of recovery.
    pub fn finished(&self) -> bool {
        self.raw.iter().all(Option::is_none)
            && self.prev_raw.iter().all(Option::is_none)
            && self.station.is_empty()
            && self.rob.no_writebacks()
            && !self.predictor.in_recovery()
    }

    /// Fetches up to N words, following predictions.
    ///
    /// A miss (the PC has left the loaded instruction region) produces an
    /// empty slot and advances the PC by one word; this is how normal
    /// termination is signalled.
    fn fetch(&mut self) -> Vec<Option<Fetched>> {
        let mut slots = Vec::with_capacity(self.width);
        for _ in 0..self.width {
            match self.memory.try_word(self.pc) {
                Some(word) => {
                    let prediction = self.predictor.make_prediction(word, self.pc);
                    trace!(pc = self.pc, word, prediction, "fetch");
                    slots.push(Some(Fetched {
                        pc: self.pc,
                        word,
                        prediction,
                        block: self.predictor.block(),
                    }));
                    self.pc = prediction;
                }
                None => {
                    slots.push(None);
                    self.pc = self.pc.wrapping_add(WORD_BYTES);
                }
            }
        }
        slots
    }

    /// Retires up to N finished re-order buffer entries, in program order.
    fn writeback(&mut self) {
        for id in self.rob.finished_ids(self.width) {
            let Some(entry) = self.rob.entry(id) else {
                continue;
            };
            let results = entry.results.clone();
            let written = self.regs.write(id, &results);
            self.rob.mark_written(id);
            self.stats.instructions_retired += 1;
            trace!(rob = %id, ?written, "retire");
        }
    }

    /// Issues ready instructions to the execution units.
    ///
    /// A branch resolving against its prediction triggers the flush path:
    /// everything decoded after the branch is squashed from the reservation
    /// station and re-order buffer, speculative return addresses are
    /// pruned, both fetch buffers are emptied, the PC is redirected, and
    /// the predictor enters recovery. Remaining issued instructions this
    /// cycle are younger than the branch and are dropped with the rest;
    /// older instructions still pending keep executing while the machine
    /// drains.
    fn execute(&mut self) -> Result<(), SimError> {
        let issued = self.station.get_ready_instructions(&self.rob, self.width);
        for id in issued {
            let Some(entry) = self.rob.entry(id) else {
                continue;
            };
            let ins = entry.instruction.clone();
            let outcome = eu::dispatch(
                &mut self.master,
                &mut self.slave,
                &ins,
                &self.rob,
                &mut self.memory,
                &mut self.predictor,
            )?;

            for &(reg, value) in &outcome.writes {
                self.rob.write_result(id, reg, value);
            }
            let finished = match self.rob.instruction_mut(id) {
                Some(running) => {
                    running.cycles = running.cycles.saturating_sub(1);
                    running.cycles == 0
                }
                None => false,
            };
            if finished {
                self.rob.mark_ready(id);
                self.stats.instructions_executed += 1;
            }

            if ins.opcode.can_mispredict() && outcome.next_pc != ins.prediction {
                debug!(
                    pc = ins.pc,
                    predicted = ins.prediction,
                    actual = outcome.next_pc,
                    block = ins.block,
                    "branch mispredict, flushing"
                );
                self.stats.flushes += 1;
                self.predictor.begin_recovery();
                self.station.clear_after(id);
                let squashed = self.rob.clear_after(id);
                // Returns pushed after this branch belong to jal call sites
                // in younger blocks (every push opens its own block).
                self.predictor.remove_invalid_returns(ins.block + 1);
                self.flush_fetch_buffers();
                self.pc = outcome.next_pc;
                trace!(squashed, "speculative entries discarded");
                break;
            }
        }
        self.master.clear_subunits();
        self.slave.clear_subunits();
        Ok(())
    }

    /// Decodes the previous tick's fetch group.
    ///
    /// Each instruction is inserted into the re-order buffer, captures its
    /// operand snapshot from the register file, renames its destinations to
    /// the new entry, and enters the reservation station. The snapshot is
    /// taken *before* renaming so an instruction reading and writing the
    /// same register observes its predecessor, and decode proceeds in
    /// program order so later slots in the group see earlier renames.
    fn decode_pending(&mut self) -> Result<(), SimError> {
        let pending = std::mem::take(&mut self.prev_raw);
        for fetched in pending.into_iter().flatten() {
            let decoded = decode::decode(fetched.word)?;
            let ins = Instruction::new(decoded, fetched.pc, fetched.prediction, fetched.block);
            let id = self.rob.insert_entry(ins);
            self.capture_operands(id);
            self.rename_destinations(id);
            self.station.add_instruction(id, &self.rob);
            trace!(pc = fetched.pc, rob = %id, "decode");
        }
        Ok(())
    }

    /// Snapshots the source operands of a just-inserted instruction.
    fn capture_operands(&mut self, id: RobId) {
        let Some(entry) = self.rob.entry(id) else {
            return;
        };
        let ins = &entry.instruction;
        let (reads_rs, reads_rt) = operand_usage(ins);
        let (rs, rt) = (ins.rs, ins.rt);

        let snapshot = |read: RegRead| match read {
            RegRead::Value(v) => Operand::Value(v),
            RegRead::Pending(tag) => Operand::Pending(tag),
        };
        let operands = Operands {
            rs: reads_rs.then(|| snapshot(self.regs.get_value(rs))),
            rt: reads_rt.then(|| snapshot(self.regs.get_value(rt))),
        };
        if let Some(ins) = self.rob.instruction_mut(id) {
            ins.operands = operands;
        }
    }

    /// Renames the instruction's destination registers to its entry id.
    fn rename_destinations(&mut self, id: RobId) {
        let Some(entry) = self.rob.entry(id) else {
            return;
        };
        for reg in entry.instruction.destinations() {
            self.regs.invalidate(reg, id);
        }
    }

    /// Empties both fetch buffers after a mispredict.
    fn flush_fetch_buffers(&mut self) {
        self.raw = vec![None; self.width];
        self.prev_raw = vec![None; self.width];
    }

    /// Architectural register file (reporting and tests).
    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    /// Memory image (reporting and tests).
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Branch predictor state (reporting and tests).
    pub fn predictor(&self) -> &BranchPredictor {
        &self.predictor
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Current program counter.
    pub fn pc(&self) -> u32 {
        self.pc
    }
}

/// Which source registers an operation reads at execute.
///
/// Mirrors the operand-capture rules: `jr` and the HI/LO moves read only
/// `rs` (the moves through a rewritten index); `sll`/`sra` read only `rt`;
/// `lui` and jumps read nothing; stores and equality branches read both.
fn operand_usage(ins: &Instruction) -> (bool, bool) {
    match ins.opcode.kind() {
        Kind::R => match ins.opcode {
            Opcode::Jr | Opcode::Mfhi | Opcode::Mflo => (true, false),
            Opcode::Sll | Opcode::Sra => (false, true),
            _ => (true, true),
        },
        Kind::I => match ins.opcode {
            Opcode::Lui => (false, false),
            Opcode::Beq | Opcode::Bne | Opcode::Sw => (true, true),
            _ => (true, false),
        },
        Kind::J => (false, false),
    }
}
