//! Assembly-time error taxonomy.

use thiserror::Error;

/// Fatal assembly errors, reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    /// An operand named a label that was never defined.
    #[error("invalid label: `{0}`")]
    InvalidLabel(String),

    /// An unknown instruction mnemonic.
    #[error("invalid instruction name: `{0}`")]
    InvalidInstructionName(String),

    /// An instruction with the wrong number or shape of operands.
    #[error("invalid instruction format: `{0}`")]
    InvalidInstructionFormat(String),

    /// A line that fits no legal shape for its section.
    #[error("syntax error at line {line}: {message}")]
    Syntax {
        /// One-based source line number.
        line: usize,
        /// What was wrong.
        message: String,
    },
}
