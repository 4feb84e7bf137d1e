//! Shared test infrastructure: a word-level instruction builder and a
//! harness that lays programs out in memory and runs them to termination.

#![allow(dead_code)]

use std::collections::BTreeMap;

use mipsim_core::{Config, Program, Simulator};

/// Address the harness lays the first word at, matching the assembler.
pub const BASE: u32 = 32;

/// Builds a program image from words laid out from [`BASE`].
pub fn program(words: &[u32]) -> Program {
    program_with_entry(words, BASE)
}

/// Builds a program image with an explicit entry point.
pub fn program_with_entry(words: &[u32], entry: u32) -> Program {
    let mut memory = BTreeMap::new();
    for (i, word) in words.iter().enumerate() {
        let addr = BASE + 4 * i as u32;
        for (offset, byte) in word.to_be_bytes().into_iter().enumerate() {
            let _ = memory.insert(addr + offset as u32, byte);
        }
    }
    Program { memory, entry }
}

/// Runs a word program to termination at the given superscalar width.
pub fn run(words: &[u32], width: usize) -> Simulator {
    run_program(program(words), width)
}

/// Runs an assembled program to termination, with a runaway guard.
pub fn run_program(program: Program, width: usize) -> Simulator {
    let mut sim = Simulator::new(program, &Config::with_width(width));
    loop {
        sim.tick().expect("simulation fault");
        if sim.finished() {
            return sim;
        }
        assert!(sim.stats().cycles < 200_000, "program did not terminate");
    }
}

// ── Instruction builders ─────────────────────────────────────────────

pub const fn add(rd: u32, rs: u32, rt: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | 32
}

pub const fn sub(rd: u32, rs: u32, rt: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | 34
}

pub const fn slt(rd: u32, rs: u32, rt: u32) -> u32 {
    (rs << 21) | (rt << 16) | (rd << 11) | 42
}

pub const fn sll(rd: u32, rt: u32, shamt: u32) -> u32 {
    (rt << 16) | (rd << 11) | (shamt << 6)
}

pub const fn mult(rs: u32, rt: u32) -> u32 {
    (rs << 21) | (rt << 16) | 24
}

pub const fn div(rs: u32, rt: u32) -> u32 {
    (rs << 21) | (rt << 16) | 26
}

pub const fn mfhi(rd: u32) -> u32 {
    (rd << 11) | 16
}

pub const fn mflo(rd: u32) -> u32 {
    (rd << 11) | 18
}

pub const fn jr(rs: u32) -> u32 {
    (rs << 21) | 8
}

pub const fn addi(rt: u32, rs: u32, imm: i16) -> u32 {
    (8 << 26) | (rs << 21) | (rt << 16) | (imm as u16 as u32)
}

pub const fn ori(rt: u32, rs: u32, imm: u16) -> u32 {
    (13 << 26) | (rs << 21) | (rt << 16) | (imm as u32)
}

pub const fn lui(rt: u32, imm: u16) -> u32 {
    (15 << 26) | (rt << 16) | (imm as u32)
}

pub const fn lw(rt: u32, rs: u32, imm: i16) -> u32 {
    (35 << 26) | (rs << 21) | (rt << 16) | (imm as u16 as u32)
}

pub const fn sw(rt: u32, rs: u32, imm: i16) -> u32 {
    (43 << 26) | (rs << 21) | (rt << 16) | (imm as u16 as u32)
}

pub const fn beq(rs: u32, rt: u32, offset: i16) -> u32 {
    (4 << 26) | (rs << 21) | (rt << 16) | (offset as u16 as u32)
}

pub const fn bne(rs: u32, rt: u32, offset: i16) -> u32 {
    (5 << 26) | (rs << 21) | (rt << 16) | (offset as u16 as u32)
}

pub const fn blez(rs: u32, offset: i16) -> u32 {
    (6 << 26) | (rs << 21) | (offset as u16 as u32)
}

pub const fn bgtz(rs: u32, offset: i16) -> u32 {
    (7 << 26) | (rs << 21) | (offset as u16 as u32)
}

pub const fn j(target: u32) -> u32 {
    (2 << 26) | target
}

pub const fn jal(target: u32) -> u32 {
    (3 << 26) | target
}

pub const fn nop() -> u32 {
    0
}

/// Loads an arbitrary 32-bit constant via `lui` + `ori`.
pub fn load_constant(rt: u32, value: i32) -> [u32; 2] {
    let bits = value as u32;
    [lui(rt, (bits >> 16) as u16), ori(rt, rt, bits as u16)]
}
