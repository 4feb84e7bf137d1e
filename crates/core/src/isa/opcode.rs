//! Opcode enumeration and encoding tables.
//!
//! The supported ISA is a 28-operation integer subset of MIPS-I. Every
//! operation is a variant of [`Opcode`]; behaviour elsewhere in the
//! simulator is selected by exhaustive pattern match, so an unmapped
//! encoding can only fail in one place: [`Opcode::from_fields`].

use crate::common::SimError;

/// Instruction format class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// Register format: `op rs, rt -> rd` with a function field.
    R,
    /// Immediate format: `op rs, imm -> rt`.
    I,
    /// Jump format: 26-bit absolute target.
    J,
}

/// Hardware port an operation occupies when issued.
///
/// The reservation station budgets issue slots per cycle by port: two ALU
/// operations, one LSU operation, and one BEU operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    /// Arithmetic/logic (including mult/div and the HI/LO moves).
    Alu,
    /// Load/store unit.
    Lsu,
    /// Branch execution unit.
    Beu,
}

/// One of the 28 supported MIPS-I integer operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sll,
    Sra,
    Mult,
    Div,
    Jr,
    Mfhi,
    Mflo,
    Addi,
    Andi,
    Ori,
    Xori,
    Slti,
    Lui,
    Lw,
    Sw,
    Beq,
    Bne,
    Blez,
    Bgtz,
    J,
    Jal,
}

/// Every supported operation, for table-driven lookups.
pub const ALL: [Opcode; 28] = [
    Opcode::Add,
    Opcode::Sub,
    Opcode::And,
    Opcode::Or,
    Opcode::Xor,
    Opcode::Nor,
    Opcode::Slt,
    Opcode::Sll,
    Opcode::Sra,
    Opcode::Mult,
    Opcode::Div,
    Opcode::Jr,
    Opcode::Mfhi,
    Opcode::Mflo,
    Opcode::Addi,
    Opcode::Andi,
    Opcode::Ori,
    Opcode::Xori,
    Opcode::Slti,
    Opcode::Lui,
    Opcode::Lw,
    Opcode::Sw,
    Opcode::Beq,
    Opcode::Bne,
    Opcode::Blez,
    Opcode::Bgtz,
    Opcode::J,
    Opcode::Jal,
];

/// Primary opcode field values (bits 31..26) for I- and J-format operations.
pub mod primary {
    pub const J: u32 = 2;
    pub const JAL: u32 = 3;
    pub const BEQ: u32 = 4;
    pub const BNE: u32 = 5;
    pub const BLEZ: u32 = 6;
    pub const BGTZ: u32 = 7;
    pub const ADDI: u32 = 8;
    pub const SLTI: u32 = 10;
    pub const ANDI: u32 = 12;
    pub const ORI: u32 = 13;
    pub const XORI: u32 = 14;
    pub const LUI: u32 = 15;
    pub const LW: u32 = 35;
    pub const SW: u32 = 43;
}

/// Function field values (bits 5..0) for R-format operations (primary 0).
pub mod function {
    pub const SLL: u32 = 0;
    pub const SRA: u32 = 3;
    pub const JR: u32 = 8;
    pub const MFHI: u32 = 16;
    pub const MFLO: u32 = 18;
    pub const MULT: u32 = 24;
    pub const DIV: u32 = 26;
    pub const ADD: u32 = 32;
    pub const SUB: u32 = 34;
    pub const AND: u32 = 36;
    pub const OR: u32 = 37;
    pub const XOR: u32 = 38;
    pub const NOR: u32 = 39;
    pub const SLT: u32 = 42;
}

impl Opcode {
    /// Maps a `(primary, function)` field pair to an operation.
    ///
    /// The function field is consulted only when the primary opcode is 0.
    /// Returns `None` for unmapped pairs; [`Opcode::decode_fields`] wraps
    /// this in the `InvalidOpcode` error.
    pub fn from_fields(opcode: u32, func: u32) -> Option<Self> {
        if opcode == 0 {
            return Some(match func {
                function::SLL => Opcode::Sll,
                function::SRA => Opcode::Sra,
                function::JR => Opcode::Jr,
                function::MFHI => Opcode::Mfhi,
                function::MFLO => Opcode::Mflo,
                function::MULT => Opcode::Mult,
                function::DIV => Opcode::Div,
                function::ADD => Opcode::Add,
                function::SUB => Opcode::Sub,
                function::AND => Opcode::And,
                function::OR => Opcode::Or,
                function::XOR => Opcode::Xor,
                function::NOR => Opcode::Nor,
                function::SLT => Opcode::Slt,
                _ => return None,
            });
        }
        Some(match opcode {
            primary::J => Opcode::J,
            primary::JAL => Opcode::Jal,
            primary::BEQ => Opcode::Beq,
            primary::BNE => Opcode::Bne,
            primary::BLEZ => Opcode::Blez,
            primary::BGTZ => Opcode::Bgtz,
            primary::ADDI => Opcode::Addi,
            primary::SLTI => Opcode::Slti,
            primary::ANDI => Opcode::Andi,
            primary::ORI => Opcode::Ori,
            primary::XORI => Opcode::Xori,
            primary::LUI => Opcode::Lui,
            primary::LW => Opcode::Lw,
            primary::SW => Opcode::Sw,
            _ => return None,
        })
    }

    /// As [`Opcode::from_fields`], but failing with `InvalidOpcode`.
    pub fn decode_fields(opcode: u32, func: u32) -> Result<Self, SimError> {
        Self::from_fields(opcode, func).ok_or(SimError::InvalidOpcode {
            opcode,
            function: func,
        })
    }

    /// Maps an assembly mnemonic to its operation.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|op| op.mnemonic() == name)
    }

    /// The `(primary, function)` encoding fields of this operation.
    ///
    /// The function field is zero for non-R-format operations; the inverse
    /// of [`Opcode::from_fields`].
    pub fn fields(self) -> (u32, u32) {
        match self {
            Opcode::Sll => (0, function::SLL),
            Opcode::Sra => (0, function::SRA),
            Opcode::Jr => (0, function::JR),
            Opcode::Mfhi => (0, function::MFHI),
            Opcode::Mflo => (0, function::MFLO),
            Opcode::Mult => (0, function::MULT),
            Opcode::Div => (0, function::DIV),
            Opcode::Add => (0, function::ADD),
            Opcode::Sub => (0, function::SUB),
            Opcode::And => (0, function::AND),
            Opcode::Or => (0, function::OR),
            Opcode::Xor => (0, function::XOR),
            Opcode::Nor => (0, function::NOR),
            Opcode::Slt => (0, function::SLT),
            Opcode::J => (primary::J, 0),
            Opcode::Jal => (primary::JAL, 0),
            Opcode::Beq => (primary::BEQ, 0),
            Opcode::Bne => (primary::BNE, 0),
            Opcode::Blez => (primary::BLEZ, 0),
            Opcode::Bgtz => (primary::BGTZ, 0),
            Opcode::Addi => (primary::ADDI, 0),
            Opcode::Slti => (primary::SLTI, 0),
            Opcode::Andi => (primary::ANDI, 0),
            Opcode::Ori => (primary::ORI, 0),
            Opcode::Xori => (primary::XORI, 0),
            Opcode::Lui => (primary::LUI, 0),
            Opcode::Lw => (primary::LW, 0),
            Opcode::Sw => (primary::SW, 0),
        }
    }

    /// Instruction format class of this operation.
    pub fn kind(self) -> Kind {
        match self {
            Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Nor
            | Opcode::Slt
            | Opcode::Sll
            | Opcode::Sra
            | Opcode::Mult
            | Opcode::Div
            | Opcode::Jr
            | Opcode::Mfhi
            | Opcode::Mflo => Kind::R,
            Opcode::Addi
            | Opcode::Andi
            | Opcode::Ori
            | Opcode::Xori
            | Opcode::Slti
            | Opcode::Lui
            | Opcode::Lw
            | Opcode::Sw
            | Opcode::Beq
            | Opcode::Bne
            | Opcode::Blez
            | Opcode::Bgtz => Kind::I,
            Opcode::J | Opcode::Jal => Kind::J,
        }
    }

    /// Hardware port this operation issues to.
    pub fn port(self) -> Port {
        match self {
            Opcode::Lw | Opcode::Sw => Port::Lsu,
            Opcode::Beq
            | Opcode::Bne
            | Opcode::Blez
            | Opcode::Bgtz
            | Opcode::J
            | Opcode::Jal
            | Opcode::Jr => Port::Beu,
            _ => Port::Alu,
        }
    }

    /// True for the four conditional branches.
    pub fn is_conditional_branch(self) -> bool {
        matches!(self, Opcode::Beq | Opcode::Bne | Opcode::Blez | Opcode::Bgtz)
    }

    /// True for operations whose resolved target can differ from the
    /// prediction made at fetch (`j` and `jal` targets are always known).
    pub fn can_mispredict(self) -> bool {
        self.is_conditional_branch() || self == Opcode::Jr
    }

    /// Execution latency in cycles.
    pub fn latency(self) -> u32 {
        1
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Nor => "nor",
            Opcode::Slt => "slt",
            Opcode::Sll => "sll",
            Opcode::Sra => "sra",
            Opcode::Mult => "mult",
            Opcode::Div => "div",
            Opcode::Jr => "jr",
            Opcode::Mfhi => "mfhi",
            Opcode::Mflo => "mflo",
            Opcode::Addi => "addi",
            Opcode::Andi => "andi",
            Opcode::Ori => "ori",
            Opcode::Xori => "xori",
            Opcode::Slti => "slti",
            Opcode::Lui => "lui",
            Opcode::Lw => "lw",
            Opcode::Sw => "sw",
            Opcode::Beq => "beq",
            Opcode::Bne => "bne",
            Opcode::Blez => "blez",
            Opcode::Bgtz => "bgtz",
            Opcode::J => "j",
            Opcode::Jal => "jal",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
