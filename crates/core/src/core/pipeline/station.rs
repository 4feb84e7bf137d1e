//! Reservation station: the issue queue.
//!
//! Decoded instructions wait here until they can issue. Readiness is
//! recomputed for every entry each cycle:
//! 1. **Operands:** each captured operand is either valid (snapshotted at
//!    decode) or renamed against a re-order buffer entry that has finished,
//!    so its value is reachable over the forwarding path. Decode renames
//!    every write, so this test subsumes RAW and WAW ordering.
//! 2. **Ports:** among the ready entries, at most one load/store, one
//!    branch, and two ALU operations may issue per cycle; the rest are
//!    deferred.
//!
//! Issue consumes up to the superscalar width of ready entries in queue
//! order; non-ready predecessors are skipped over, which is what makes
//! execution out-of-order.

use crate::core::pipeline::rob::{Rob, RobId};
use crate::isa::instruction::Operand;
use crate::isa::opcode::Port;

/// Per-cycle issue budget for the load/store port.
const LSU_SLOTS: usize = 1;
/// Per-cycle issue budget for the branch port.
const BEU_SLOTS: usize = 1;
/// Per-cycle issue budget for the ALU ports (master + slave).
const ALU_SLOTS: usize = 2;

/// One pending instruction.
#[derive(Clone, Copy, Debug)]
struct Entry {
    /// Re-order buffer entry owning the instruction.
    id: RobId,
    /// Speculation block, copied out for flush scoping.
    block: u64,
    /// Hardware port the operation will occupy.
    port: Port,
    /// Recomputed each cycle.
    ready: bool,
}

/// The reservation station.
#[derive(Clone, Debug)]
pub struct ReservationStation {
    queue: Vec<Entry>,
    capacity: usize,
}

impl ReservationStation {
    /// Creates an empty station with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a freshly decoded instruction.
    pub fn add_instruction(&mut self, id: RobId, rob: &Rob) {
        let Some(entry) = rob.entry(id) else { return };
        self.queue.push(Entry {
            id,
            block: entry.instruction.block,
            port: entry.instruction.opcode.port(),
            ready: false,
        });
    }

    /// Recomputes readiness and consumes up to `width` ready entries.
    ///
    /// Returned ids are in queue (decode) order; entries left behind keep
    /// their relative order.
    pub fn get_ready_instructions(&mut self, rob: &Rob, width: usize) -> Vec<RobId> {
        self.update_dependencies(rob);
        let mut issued = Vec::with_capacity(width);
        self.queue.retain(|entry| {
            if entry.ready && issued.len() < width {
                issued.push(entry.id);
                false
            } else {
                true
            }
        });
        issued
    }

    /// Discards every entry strictly younger than re-order buffer entry
    /// `id`. This is the mispredict flush: pending instructions decoded
    /// after the branch are squashed, older ones (possibly passed over by
    /// out-of-order issue) stay.
    pub fn clear_after(&mut self, id: RobId) {
        self.queue.retain(|entry| entry.id <= id);
    }

    /// Discards every entry fetched under speculation block ≥ `block`.
    pub fn clear_block(&mut self, block: u64) {
        self.queue.retain(|entry| entry.block < block);
    }

    /// Number of pending instructions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no instruction is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True when a fetch group of `width` instructions still fits.
    pub fn has_room_for(&self, width: usize) -> bool {
        self.queue.len() <= self.capacity.saturating_sub(width)
    }

    /// Recomputes every entry's ready flag, then applies the port budget.
    fn update_dependencies(&mut self, rob: &Rob) {
        for entry in &mut self.queue {
            entry.ready = Self::operands_ready(entry.id, rob);
        }
        self.apply_port_limits();
    }

    /// Operand readiness: valid snapshot, or renamed against a finished
    /// re-order buffer entry.
    fn operands_ready(id: RobId, rob: &Rob) -> bool {
        let Some(entry) = rob.entry(id) else {
            return false;
        };
        let operand_ready = |op: Option<Operand>| match op {
            None | Some(Operand::Value(_)) => true,
            Some(Operand::Pending(tag)) => rob.is_ready(tag),
        };
        operand_ready(entry.instruction.operands.rs) && operand_ready(entry.instruction.operands.rt)
    }

    /// Defers ready entries that exceed the per-port issue budget.
    fn apply_port_limits(&mut self) {
        let (mut lsu, mut beu, mut alu) = (0usize, 0usize, 0usize);
        for entry in &mut self.queue {
            if !entry.ready {
                continue;
            }
            let slot = match entry.port {
                Port::Lsu => {
                    lsu += 1;
                    lsu <= LSU_SLOTS
                }
                Port::Beu => {
                    beu += 1;
                    beu <= BEU_SLOTS
                }
                Port::Alu => {
                    alu += 1;
                    alu <= ALU_SLOTS
                }
            };
            if !slot {
                entry.ready = false;
            }
        }
    }
}
