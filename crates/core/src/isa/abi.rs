//! Register ABI: conventional MIPS register names and indices.

/// Index of the hard-wired zero register.
pub const ZERO: usize = 0;
/// Index of the first return-value register (`$v0`).
pub const V0: usize = 2;
/// Index of the second return-value register (`$v1`).
pub const V1: usize = 3;
/// Index of the stack pointer (`$sp`).
pub const SP: usize = 29;
/// Index of the return-address register (`$ra`), the link target of `jal`.
pub const RA: usize = 31;
/// Index of the HI register (remainder of `div`).
pub const HI: usize = 32;
/// Index of the LO register (product of `mult`, quotient of `div`).
pub const LO: usize = 33;

/// Conventional names for all 34 architectural registers, indexed by number.
pub const REG_NAMES: [&str; 34] = [
    "zero", "at", "v0", "v1", "a0", "a1", "a2", "a3", // 0-7
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", // 8-15
    "s0", "s1", "s2", "s3", "s4", "s5", "s6", "s7", // 16-23
    "t8", "t9", "k0", "k1", "gp", "sp", "fp", "ra", // 24-31
    "hi", "lo", // 32-33
];

/// Resolves a register name (without the `$` sigil) to its index.
///
/// Accepts the conventional names of the 32 general-purpose registers and
/// bare numerics `0`–`31`. HI and LO are not addressable by name; they are
/// reached only through `mfhi`/`mflo`.
pub fn register_index(name: &str) -> Option<usize> {
    if let Ok(n) = name.parse::<usize>() {
        return (n < 32).then_some(n);
    }
    REG_NAMES[..32].iter().position(|&r| r == name)
}

/// Returns the conventional name for a register index.
pub fn register_name(index: usize) -> &'static str {
    REG_NAMES.get(index).copied().unwrap_or("??")
}
