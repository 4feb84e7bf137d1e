//! Re-Order Buffer (ROB) for in-order retirement.
//!
//! The ROB is an insertion-ordered ledger of every decoded instruction. It
//! provides:
//! 1. **Allocation:** each decoded instruction gets the next integer id; the
//!    register file's renaming tags point at these ids.
//! 2. **Completion:** functional units record per-register results and mark
//!    the entry ready.
//! 3. **In-order retirement:** entries drain to the architectural file
//!    strictly in id order, up to the superscalar width per cycle.
//! 4. **Forwarding:** a ready entry's result map serves operand reads for
//!    dependent instructions that renamed against it.
//! 5. **Flush:** speculative entries are squashed by speculation block.
//!
//! Retired entries stay in the buffer (marked written) so renaming tags and
//! the forwarding path remain resolvable; ids therefore only grow, and gaps
//! appear only where a squash removed speculative entries.

use std::collections::BTreeMap;

use crate::common::SimError;
use crate::isa::Instruction;

/// Identifier of a re-order buffer entry; doubles as the renaming tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RobId(pub usize);

impl std::fmt::Display for RobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ledger entry.
#[derive(Clone, Debug)]
pub struct RobEntry {
    /// Execution has finished and `results` is complete.
    pub ready: bool,
    /// Results have been retired to the architectural register file.
    pub written: bool,
    /// The owning instruction.
    pub instruction: Instruction,
    /// Destination register index → computed value. Usually zero or one
    /// pair; two for `div`, which produces both HI and LO.
    pub results: BTreeMap<usize, i32>,
}

/// The re-order buffer.
#[derive(Clone, Debug, Default)]
pub struct Rob {
    entries: BTreeMap<RobId, RobEntry>,
}

impl Rob {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction, binding it to the next id.
    ///
    /// The id is `max(existing) + 1`, or 0 for an empty buffer. The
    /// instruction's own `rob` field is bound to the new id.
    pub fn insert_entry(&mut self, mut instruction: Instruction) -> RobId {
        let id = self
            .entries
            .keys()
            .next_back()
            .map_or(RobId(0), |last| RobId(last.0 + 1));
        instruction.rob = Some(id);
        self.entries.insert(
            id,
            RobEntry {
                ready: false,
                written: false,
                instruction,
                results: BTreeMap::new(),
            },
        );
        id
    }

    /// Records one destination result for an entry.
    pub fn write_result(&mut self, id: RobId, reg: usize, value: i32) {
        if let Some(entry) = self.entries.get_mut(&id) {
            let _ = entry.results.insert(reg, value);
        }
    }

    /// Marks an entry as finished executing.
    pub fn mark_ready(&mut self, id: RobId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.ready = true;
        }
    }

    /// Marks an entry as retired.
    pub fn mark_written(&mut self, id: RobId) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.written = true;
        }
    }

    /// Ids ready to retire this cycle, in program order.
    ///
    /// Walks ids in ascending order, collecting entries that are ready but
    /// not yet written, and stops at the first non-ready entry: nothing may
    /// retire past a still-pending predecessor. At most `limit` ids are
    /// returned.
    pub fn finished_ids(&self, limit: usize) -> Vec<RobId> {
        let mut ids = Vec::new();
        for (&id, entry) in &self.entries {
            if ids.len() == limit {
                break;
            }
            if !entry.ready {
                break;
            }
            if !entry.written {
                ids.push(id);
            }
        }
        ids
    }

    /// Forwarding read: the value entry `id` computed for `reg`.
    ///
    /// Fails with `ResultNotReady` when the entry has not finished; the
    /// reservation station's readiness check makes that unreachable in
    /// normal scheduling.
    pub fn get_result(&self, id: RobId, reg: usize) -> Result<i32, SimError> {
        let entry = self.entries.get(&id).ok_or(SimError::ResultNotReady(id))?;
        if !entry.ready {
            return Err(SimError::ResultNotReady(id));
        }
        entry
            .results
            .get(&reg)
            .copied()
            .ok_or(SimError::ResultNotReady(id))
    }

    /// True when entry `id` exists and has finished executing.
    pub fn is_ready(&self, id: RobId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.ready)
    }

    /// Read-only view of an entry.
    pub fn entry(&self, id: RobId) -> Option<&RobEntry> {
        self.entries.get(&id)
    }

    /// Mutable view of an entry's instruction (cycle countdown).
    pub fn instruction_mut(&mut self, id: RobId) -> Option<&mut Instruction> {
        self.entries.get_mut(&id).map(|e| &mut e.instruction)
    }

    /// Squashes every entry strictly younger than `id`.
    ///
    /// This is the mispredict flush: the branch itself stays (it resolved
    /// and will retire), everything decoded after it is discarded. Returns
    /// the number of entries removed.
    pub fn clear_after(&mut self, id: RobId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&key, _| key <= id);
        before - self.entries.len()
    }

    /// Squashes every entry fetched under speculation block ≥ `block`.
    ///
    /// Block-scoped variant of [`Rob::clear_after`]; for a branch that
    /// opened its own block the two coincide on its successors. Returns the
    /// number of entries removed.
    pub fn clear_block(&mut self, block: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.instruction.block < block);
        before - self.entries.len()
    }

    /// True when every entry has been retired.
    pub fn no_writebacks(&self) -> bool {
        self.entries.values().all(|e| e.written)
    }

    /// Number of entries currently in the ledger (including retired ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::decode;
    use crate::isa::instruction::Instruction;

    /// `addi $t0, $zero, 7` decoded with fetch metadata.
    fn addi(block: u64) -> Instruction {
        let word = (8 << 26) | (8 << 16) | 7;
        Instruction::new(decode::decode(word).unwrap(), 32, 36, block)
    }

    #[test]
    fn ids_count_up_from_zero() {
        let mut rob = Rob::new();
        assert_eq!(rob.insert_entry(addi(0)), RobId(0));
        assert_eq!(rob.insert_entry(addi(0)), RobId(1));
        assert_eq!(rob.insert_entry(addi(0)), RobId(2));
    }

    #[test]
    fn insertion_binds_the_instruction_to_its_id() {
        let mut rob = Rob::new();
        let id = rob.insert_entry(addi(0));
        assert_eq!(rob.entry(id).unwrap().instruction.rob, Some(id));
    }

    #[test]
    fn retirement_is_in_order() {
        let mut rob = Rob::new();
        let a = rob.insert_entry(addi(0));
        let b = rob.insert_entry(addi(0));

        // Only the younger entry is ready: nothing can retire.
        rob.mark_ready(b);
        assert!(rob.finished_ids(4).is_empty());

        // Once the older entry finishes, both drain in id order.
        rob.mark_ready(a);
        assert_eq!(rob.finished_ids(4), vec![a, b]);
    }

    #[test]
    fn retirement_respects_the_width_limit() {
        let mut rob = Rob::new();
        let ids: Vec<_> = (0..6).map(|_| rob.insert_entry(addi(0))).collect();
        for &id in &ids {
            rob.mark_ready(id);
        }
        assert_eq!(rob.finished_ids(4).len(), 4);
    }

    #[test]
    fn written_entries_are_skipped_not_retired_again() {
        let mut rob = Rob::new();
        let a = rob.insert_entry(addi(0));
        let b = rob.insert_entry(addi(0));
        rob.mark_ready(a);
        rob.mark_ready(b);
        rob.mark_written(a);
        assert_eq!(rob.finished_ids(4), vec![b]);
    }

    #[test]
    fn forwarding_requires_readiness() {
        let mut rob = Rob::new();
        let id = rob.insert_entry(addi(0));
        rob.write_result(id, 8, 7);
        assert_eq!(rob.get_result(id, 8), Err(SimError::ResultNotReady(id)));

        rob.mark_ready(id);
        assert_eq!(rob.get_result(id, 8), Ok(7));
    }

    #[test]
    fn clear_after_keeps_the_branch_and_its_elders() {
        let mut rob = Rob::new();
        let a = rob.insert_entry(addi(0));
        let b = rob.insert_entry(addi(1));
        let c = rob.insert_entry(addi(1));
        assert_eq!(rob.clear_after(b), 1);
        assert!(rob.entry(a).is_some());
        assert!(rob.entry(b).is_some());
        assert!(rob.entry(c).is_none());
        // The next id continues past the surviving maximum.
        assert_eq!(rob.insert_entry(addi(1)), RobId(2));
    }

    #[test]
    fn clear_block_discards_the_speculative_tail() {
        let mut rob = Rob::new();
        let a = rob.insert_entry(addi(0));
        let b = rob.insert_entry(addi(1));
        let c = rob.insert_entry(addi(2));
        assert_eq!(rob.clear_block(1), 2);
        assert!(rob.entry(a).is_some());
        assert!(rob.entry(b).is_none());
        assert!(rob.entry(c).is_none());
    }

    #[test]
    fn ids_resume_after_a_squash() {
        let mut rob = Rob::new();
        let _ = rob.insert_entry(addi(0));
        let _ = rob.insert_entry(addi(1));
        let removed = rob.clear_block(1);
        assert_eq!(removed, 1);
        // max(remaining) + 1: the squashed id is reused.
        assert_eq!(rob.insert_entry(addi(1)), RobId(1));
    }

    #[test]
    fn no_writebacks_tracks_retirement() {
        let mut rob = Rob::new();
        assert!(rob.no_writebacks(), "an empty ledger has nothing pending");
        let id = rob.insert_entry(addi(0));
        assert!(!rob.no_writebacks());
        rob.mark_ready(id);
        rob.mark_written(id);
        assert!(rob.no_writebacks());
    }
}
