//! # Target services
//!
//! The machine instruction core consumes two read-only services from the
//! target: opcode descriptors ([`InstrInfo`]) and register names
//! ([`RegisterInfo`]). [`Target`] bundles both for one compilation session.
//!
//! ```text
//! target/
//! ├── mod.rs          # Target bundle
//! ├── opcodes.rs      # Opcode, OpcodeDescriptor, InstrInfo, OpcodeTable
//! ├── registers.rs    # Reg, RegisterInfo, RegisterTable
//! ├── description.rs  # TargetDescription (JSON configuration)
//! └── sbpf.rs         # Built-in sBPF target
//! ```

mod description;
mod opcodes;
mod registers;
pub mod sbpf;

pub use description::TargetDescription;
pub use opcodes::{InstrInfo, Opcode, OpcodeDescriptor, OpcodeTable, MAX_OPCODES};
pub use registers::{Reg, RegisterInfo, RegisterTable};

use std::fmt;
use std::sync::Arc;

/// Shared handle to an opcode descriptor table
pub type InstrInfoRef = Arc<dyn InstrInfo + Send + Sync>;

/// Shared handle to a register naming service
pub type RegisterInfoRef = Arc<dyn RegisterInfo + Send + Sync>;

/// Descriptor table and register catalogue for one target
#[derive(Clone)]
pub struct Target {
    name: String,
    instr_info: InstrInfoRef,
    register_info: RegisterInfoRef,
}

impl Target {
    /// Bundle the services of a target
    pub fn new(name: impl Into<String>, instr_info: InstrInfoRef, register_info: RegisterInfoRef) -> Self {
        Self {
            name: name.into(),
            instr_info,
            register_info,
        }
    }

    /// Target name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Opcode descriptor table
    pub fn instr_info(&self) -> &InstrInfoRef {
        &self.instr_info
    }

    /// Register naming service
    pub fn register_info(&self) -> &RegisterInfoRef {
        &self.register_info
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target").field("name", &self.name).finish()
    }
}
