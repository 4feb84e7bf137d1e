//! Two-pass MIPS-I assembler.
//!
//! Translates two-section assembly source (`.data` word definitions, then
//! `.text` instructions) into an assembled [`Program`]:
//! 1. **First pass:** lays out data words from address 32 and instructions
//!    at the following addresses, recording every label. The `main` label
//!    marks the entry point.
//! 2. **Second pass:** parses operands, resolves labels (branch targets
//!    become relative word offsets, jump and data references absolute
//!    addresses), encodes each instruction, and stores it big-endian.

use mipsim_core::common::constants::{DATA_BASE, WORD_BYTES};
use mipsim_core::core::mem::Memory;
use mipsim_core::Program;

/// Instruction encoding (mnemonic + operands → 32-bit word).
pub mod encoder;
/// Assembly-time errors.
pub mod error;
/// Source-line and operand parsing.
pub mod parser;

pub use error::AsmError;

use encoder::Labels;
use parser::{Line, OperandToken, Section};

/// An instruction recorded by the first pass, awaiting label resolution.
#[derive(Clone, Debug)]
struct Pending {
    address: u32,
    mnemonic: String,
    operands: Vec<String>,
}

/// Assembles a complete source file into a program image.
pub fn assemble(source: &str) -> Result<Program, AsmError> {
    let mut section = None;
    let mut next_address = DATA_BASE;
    let mut labels = Labels::new();
    let mut memory = Memory::default();
    let mut pending = Vec::new();
    let mut entry = None;

    // First pass: allocate addresses, lay out data, record labels.
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let Some(line) = parser::parse_line(raw, number)? else {
            continue;
        };
        match line {
            Line::Section(next) => section = Some(next),
            Line::Data { label, words } => {
                if section != Some(Section::Data) {
                    return Err(AsmError::Syntax {
                        line: number,
                        message: ".word outside the .data section".to_string(),
                    });
                }
                let _ = labels.insert(label, next_address);
                for word in words {
                    memory.store_word(next_address, word);
                    next_address += WORD_BYTES;
                }
            }
            Line::Label(label) => {
                expect_text(section, number)?;
                define_label(&mut labels, &mut entry, label, next_address);
            }
            Line::Instruction {
                label,
                mnemonic,
                operands,
            } => {
                expect_text(section, number)?;
                if let Some(label) = label {
                    define_label(&mut labels, &mut entry, label, next_address);
                }
                pending.push(Pending {
                    address: next_address,
                    mnemonic,
                    operands,
                });
                next_address += WORD_BYTES;
            }
        }
    }

    // Second pass: resolve operands and encode.
    for ins in &pending {
        let tokens = ins
            .operands
            .iter()
            .map(|text| parser::parse_operand(text))
            .collect::<Result<Vec<OperandToken>, AsmError>>()?;
        let word = encoder::encode(&ins.mnemonic, &tokens, ins.address, &labels)?;
        memory.store_word(ins.address, word as i32);
    }

    let entry = entry.ok_or_else(|| AsmError::InvalidLabel("main".to_string()))?;
    Ok(Program {
        memory: memory.into_bytes(),
        entry,
    })
}

/// Instructions and labels are only legal in the `.text` section.
fn expect_text(section: Option<Section>, line: usize) -> Result<(), AsmError> {
    if section == Some(Section::Text) {
        return Ok(());
    }
    Err(AsmError::Syntax {
        line,
        message: "instruction outside the .text section".to_string(),
    })
}

/// Records a text label; `main` marks the entry point.
fn define_label(labels: &mut Labels, entry: &mut Option<u32>, label: String, address: u32) {
    if label == "main" {
        *entry = Some(address);
    }
    let _ = labels.insert(label, address);
}
