//! Source-line and operand parsing.
//!
//! The source is two sections: `.data` (word definitions) then `.text`
//! (labels and instructions). `#` starts a comment, full-line or trailing.
//! A label may stand alone or prefix an instruction on the same line.

use mipsim_core::isa::abi;

use crate::error::AsmError;

/// One meaningful source line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    /// Section switch: `.data` or `.text`.
    Section(Section),
    /// `label: .word v1, v2, …`
    Data {
        /// The defined label.
        label: String,
        /// The word values, in layout order.
        words: Vec<i32>,
    },
    /// `label:` with nothing after the colon.
    Label(String),
    /// `op a, b, c`, optionally behind a `label:` prefix.
    Instruction {
        /// Label defined at this instruction's address, if any.
        label: Option<String>,
        /// The mnemonic.
        mnemonic: String,
        /// Raw operand texts, comma-split and trimmed.
        operands: Vec<String>,
    },
}

/// The two source sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// Word-definition section.
    Data,
    /// Instruction section.
    Text,
}

/// One parsed operand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperandToken {
    /// A literal integer.
    Immediate(i64),
    /// A register, by index.
    Register(usize),
    /// A label reference, resolved in the second pass.
    Label(String),
    /// The load/store form `imm($reg)`.
    Displacement {
        /// Signed byte offset.
        offset: i32,
        /// Base register index.
        base: usize,
    },
}

/// Parses one source line. Returns `None` for blanks and pure comments.
pub fn parse_line(raw: &str, number: usize) -> Result<Option<Line>, AsmError> {
    let text = strip_comment(raw).trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text == ".data" {
        return Ok(Some(Line::Section(Section::Data)));
    }
    if text == ".text" {
        return Ok(Some(Line::Section(Section::Text)));
    }

    if let Some((label, rest)) = text.split_once(':') {
        let label = label.trim();
        if !is_label(label) {
            return Err(AsmError::Syntax {
                line: number,
                message: format!("`{label}` is not a valid label"),
            });
        }
        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(Some(Line::Label(label.to_string())));
        }
        if let Some(words) = rest
            .strip_prefix(".word")
            .filter(|w| w.is_empty() || w.starts_with(char::is_whitespace))
        {
            return Ok(Some(Line::Data {
                label: label.to_string(),
                words: parse_words(words, number)?,
            }));
        }
        let (mnemonic, operands) = split_instruction(rest);
        return Ok(Some(Line::Instruction {
            label: Some(label.to_string()),
            mnemonic,
            operands,
        }));
    }

    let (mnemonic, operands) = split_instruction(text);
    Ok(Some(Line::Instruction {
        label: None,
        mnemonic,
        operands,
    }))
}

/// Parses one instruction operand.
pub fn parse_operand(text: &str) -> Result<OperandToken, AsmError> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Ok(OperandToken::Immediate(value));
    }
    if let Some(name) = text.strip_prefix('$') {
        let index = abi::register_index(name)
            .ok_or_else(|| AsmError::InvalidLabel(text.to_string()))?;
        return Ok(OperandToken::Register(index));
    }
    if let Some((offset, rest)) = text.split_once('(') {
        let base = rest
            .strip_suffix(')')
            .and_then(|r| r.trim().strip_prefix('$'))
            .and_then(abi::register_index)
            .ok_or_else(|| AsmError::InvalidInstructionFormat(text.to_string()))?;
        let offset = match offset.trim() {
            "" => 0,
            o => o
                .parse::<i32>()
                .map_err(|_| AsmError::InvalidInstructionFormat(text.to_string()))?,
        };
        return Ok(OperandToken::Displacement { offset, base });
    }
    if is_label(text) {
        return Ok(OperandToken::Label(text.to_string()));
    }
    Err(AsmError::InvalidLabel(text.to_string()))
}

/// Removes a trailing `#` comment.
fn strip_comment(raw: &str) -> &str {
    raw.split('#').next().unwrap_or("")
}

/// Splits `op a, b, c` into the mnemonic and trimmed operand texts.
fn split_instruction(text: &str) -> (String, Vec<String>) {
    match text.split_once(char::is_whitespace) {
        None => (text.to_string(), Vec::new()),
        Some((mnemonic, rest)) => (
            mnemonic.to_string(),
            rest.split(',').map(|part| part.trim().to_string()).collect(),
        ),
    }
}

/// Parses the value list of a `.word` directive.
fn parse_words(text: &str, number: usize) -> Result<Vec<i32>, AsmError> {
    text.split(',')
        .map(|part| {
            part.trim().parse::<i32>().map_err(|_| AsmError::Syntax {
                line: number,
                message: format!("`{}` is not a 32-bit word value", part.trim()),
            })
        })
        .collect()
}

/// Labels are non-empty identifiers of word characters.
fn is_label(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with(|c: char| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
