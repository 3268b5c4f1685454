//! Error types for target description loading
//!
//! Misuse of an instruction (bad operand index, immediate at the result
//! position, `replace` with live implicit references) is a caller defect and
//! panics. Only configuration input is fallible.

use thiserror::Error;

/// Target configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Target description is not valid JSON or does not match the schema
    ///
    /// **Triggered by:** Malformed target description files
    /// **Example:** `{"name": "sbpf", "opcodes": 3}`
    #[error("Invalid target description: {0}")]
    InvalidDescription(String),

    /// The same opcode name appears twice
    #[error("Duplicate opcode '{name}' in target {target}")]
    DuplicateOpcode {
        /// Target name
        target: String,
        /// Repeated opcode name
        name: String,
    },

    /// Result position does not address one of the declared operands
    ///
    /// **Triggered by:** `result_position >= operand_count` for a fixed-arity opcode
    /// **Example:** `{"name": "neg", "operand_count": 1, "result_position": 1}`
    #[error("Opcode '{name}' declares result position {position} but only {operand_count} operands")]
    InvalidResultPosition {
        /// Opcode name
        name: String,
        /// Declared result position
        position: i32,
        /// Declared operand count
        operand_count: i32,
    },

    /// Physical registers would overlap the virtual register numbering
    #[error("Target {target} names {count} registers but virtual registers start at {first_virtual}")]
    RegisterOverlap {
        /// Target name
        target: String,
        /// Number of named physical registers
        count: usize,
        /// First virtual register number
        first_virtual: u32,
    },

    /// More opcodes than an [`Opcode`](crate::Opcode) can number
    #[error("Target {target} declares {count} opcodes but at most {max} are addressable")]
    TooManyOpcodes {
        /// Target name
        target: String,
        /// Number of declared opcodes
        count: usize,
        /// Largest supported opcode count
        max: usize,
    },

    /// A register or opcode was given an empty name
    #[error("Empty {what} name at index {index}")]
    EmptyName {
        /// "register" or "opcode"
        what: &'static str,
        /// Position in the description
        index: usize,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidDescription(err.to_string())
    }
}

/// Result type for fallible configuration operations
pub type Result<T> = std::result::Result<T, Error>;
