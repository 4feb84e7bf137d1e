//! Sparse byte-addressable memory image.
//!
//! The image is a mapping from 32-bit address to byte, populated from the
//! assembled program. Words are big-endian. Reads of unloaded addresses are
//! observable: the fetch path treats them as the end of the instruction
//! region (normal termination), while the load/store unit treats them as a
//! fault.

use std::collections::BTreeMap;

use crate::common::constants::WORD_BYTES;
use crate::common::SimError;

/// Byte-addressable sparse memory.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    bytes: BTreeMap<u32, u8>,
}

impl Memory {
    /// Creates a memory image from an address→byte mapping.
    pub fn new(bytes: BTreeMap<u32, u8>) -> Self {
        Self { bytes }
    }

    /// Reads one byte, if loaded.
    pub fn byte(&self, addr: u32) -> Option<u8> {
        self.bytes.get(&addr).copied()
    }

    /// Reads a big-endian word, or `None` when any of its bytes is missing.
    ///
    /// The fetch stage uses this form: a miss means the PC has run past the
    /// loaded instruction region.
    pub fn try_word(&self, addr: u32) -> Option<u32> {
        let mut word = 0u32;
        for offset in 0..WORD_BYTES {
            word = (word << 8) | u32::from(self.byte(addr.wrapping_add(offset))?);
        }
        Some(word)
    }

    /// Reads a big-endian word, failing with `MemoryFault` on a miss.
    ///
    /// The load/store unit uses this form: a data access outside the loaded
    /// range is a bug in the program being simulated.
    pub fn load_word(&self, addr: u32) -> Result<i32, SimError> {
        self.try_word(addr)
            .map(|w| w as i32)
            .ok_or(SimError::MemoryFault(addr))
    }

    /// Writes a word as four big-endian bytes.
    pub fn store_word(&mut self, addr: u32, value: i32) {
        for (offset, byte) in (value as u32).to_be_bytes().into_iter().enumerate() {
            self.bytes.insert(addr.wrapping_add(offset as u32), byte);
        }
    }

    /// Highest loaded address, or `None` when the image is empty.
    pub fn highest_address(&self) -> Option<u32> {
        self.bytes.keys().next_back().copied()
    }

    /// Number of loaded bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when no byte is loaded.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Iterates loaded bytes in address order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.bytes.iter().map(|(&a, &b)| (a, b))
    }

    /// Consumes the memory, returning the underlying mapping.
    pub fn into_bytes(self) -> BTreeMap<u32, u8> {
        self.bytes
    }
}
