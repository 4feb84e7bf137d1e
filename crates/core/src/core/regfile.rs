//! Architectural register file with validity and renaming tags.
//!
//! Each of the 34 registers (32 general-purpose plus HI and LO) carries a
//! 32-bit signed value, a `valid` flag, and the id of the re-order buffer
//! entry that last renamed it. When `valid` is set the tag is stale and must
//! not be consulted. Register 0 is hard-wired to zero: writes are discarded
//! and it is never invalidated.

use std::collections::BTreeMap;

use crate::common::constants::NUM_REGISTERS;
use crate::core::pipeline::rob::RobId;
use crate::isa::abi;

/// One architectural register.
#[derive(Clone, Debug)]
pub struct Register {
    /// Conventional ABI name.
    pub name: &'static str,
    /// Current architectural value.
    pub value: i32,
    /// True when `value` is architecturally current.
    pub valid: bool,
    /// Re-order buffer entry that last renamed this register.
    /// Stale whenever `valid` is set.
    pub rob_entry: Option<RobId>,
}

/// What a register read yields at decode time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegRead {
    /// The register is valid; here is its value.
    Value(i32),
    /// The register is renamed; the value will appear in this entry.
    Pending(RobId),
}

/// The architectural register file.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    regs: [Register; NUM_REGISTERS],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    /// Creates a register file with every register valid and zero.
    pub fn new() -> Self {
        Self {
            regs: std::array::from_fn(|i| Register {
                name: abi::register_name(i),
                value: 0,
                valid: true,
                rob_entry: None,
            }),
        }
    }

    /// Reads a register for the decode-time operand snapshot.
    ///
    /// Returns the architectural value when valid, otherwise the renaming
    /// tag recorded by the last writer.
    pub fn get_value(&self, reg: usize) -> RegRead {
        let r = &self.regs[reg];
        match (r.valid, r.rob_entry) {
            (false, Some(tag)) => RegRead::Pending(tag),
            _ => RegRead::Value(r.value),
        }
    }

    /// Marks `reg` as renamed by `tag`. No-op for register 0.
    pub fn invalidate(&mut self, reg: usize, tag: RobId) {
        if reg == abi::ZERO {
            return;
        }
        self.regs[reg].valid = false;
        self.regs[reg].rob_entry = Some(tag);
    }

    /// Retires a re-order buffer entry's results into the file.
    ///
    /// Every `(register, value)` pair is applied (register 0 excepted); a
    /// register becomes valid again only when its pending tag matches the
    /// retiring entry, so replaying the same entry is idempotent and an
    /// older writer can never clear a younger rename. Returns the registers
    /// actually updated.
    pub fn write(&mut self, id: RobId, results: &BTreeMap<usize, i32>) -> Vec<usize> {
        let mut written = Vec::with_capacity(results.len());
        for (&reg, &value) in results {
            if reg == abi::ZERO {
                continue;
            }
            let r = &mut self.regs[reg];
            r.value = value;
            if r.rob_entry == Some(id) {
                r.valid = true;
            }
            written.push(reg);
        }
        written
    }

    /// Forces every register valid. Used only by speculation recovery.
    pub fn set_all_valid(&mut self) {
        for r in &mut self.regs {
            r.valid = true;
        }
    }

    /// True when no register has a pending writeback.
    pub fn no_writebacks(&self) -> bool {
        self.regs.iter().all(|r| r.valid)
    }

    /// Direct read of a register's current value (for reporting).
    pub fn value(&self, reg: usize) -> i32 {
        self.regs[reg].value
    }

    /// Direct write of an architectural value, bypassing renaming.
    ///
    /// Used only for machine setup (the initial stack pointer). Writes to
    /// register 0 are discarded.
    pub fn set_value(&mut self, reg: usize, value: i32) {
        if reg != abi::ZERO {
            self.regs[reg].value = value;
        }
    }

    /// Read-only view of one register.
    pub fn register(&self, reg: usize) -> &Register {
        &self.regs[reg]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn results(pairs: &[(usize, i32)]) -> BTreeMap<usize, i32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn fresh_file_is_all_valid_zero() {
        let regs = RegisterFile::new();
        assert!(regs.no_writebacks());
        for i in 0..NUM_REGISTERS {
            assert_eq!(regs.get_value(i), RegRead::Value(0));
        }
    }

    #[test]
    fn invalidate_exposes_the_tag() {
        let mut regs = RegisterFile::new();
        regs.invalidate(8, RobId(3));
        assert_eq!(regs.get_value(8), RegRead::Pending(RobId(3)));
        assert!(!regs.no_writebacks());
    }

    #[test]
    fn zero_register_cannot_be_renamed_or_written() {
        let mut regs = RegisterFile::new();
        regs.invalidate(0, RobId(1));
        assert_eq!(regs.get_value(0), RegRead::Value(0));

        let written = regs.write(RobId(1), &results(&[(0, 99)]));
        assert!(written.is_empty());
        assert_eq!(regs.value(0), 0);
    }

    #[test]
    fn write_clears_validity_only_for_the_matching_tag() {
        let mut regs = RegisterFile::new();
        regs.invalidate(8, RobId(0));
        regs.invalidate(8, RobId(1)); // younger rename wins

        // The older writer retires first: value lands, register stays renamed.
        assert_eq!(regs.write(RobId(0), &results(&[(8, 10)])), vec![8]);
        assert_eq!(regs.get_value(8), RegRead::Pending(RobId(1)));

        // The younger writer retires: register becomes valid.
        assert_eq!(regs.write(RobId(1), &results(&[(8, 20)])), vec![8]);
        assert_eq!(regs.get_value(8), RegRead::Value(20));
    }

    #[test]
    fn write_is_idempotent_under_replay() {
        let mut regs = RegisterFile::new();
        regs.invalidate(9, RobId(4));
        regs.write(RobId(4), &results(&[(9, 7)]));
        regs.write(RobId(4), &results(&[(9, 7)]));
        assert_eq!(regs.get_value(9), RegRead::Value(7));
    }

    #[test]
    fn div_style_double_write_updates_both_registers() {
        let mut regs = RegisterFile::new();
        regs.invalidate(32, RobId(2));
        regs.invalidate(33, RobId(2));
        let written = regs.write(RobId(2), &results(&[(32, 1), (33, 6)]));
        assert_eq!(written, vec![32, 33]);
        assert_eq!(regs.get_value(32), RegRead::Value(1));
        assert_eq!(regs.get_value(33), RegRead::Value(6));
    }

    #[test]
    fn set_all_valid_clears_every_pending_tag_effect() {
        let mut regs = RegisterFile::new();
        regs.invalidate(5, RobId(1));
        regs.invalidate(6, RobId(2));
        regs.set_all_valid();
        assert!(regs.no_writebacks());
    }
}
