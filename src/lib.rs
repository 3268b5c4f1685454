//! # machinst - Machine Instructions for Compiler Backends
//!
//! A target-independent machine instruction model: an opcode, typed
//! operands with def/use classification, implicit references, and the rules
//! for mutating, substituting and rendering them.
//!
//! ## Features
//!
//! - **Closed operand kinds** - virtual / condition-code / machine registers,
//!   sign- and zero-extended immediates, PC-relative displacements
//! - **Injected target services** - opcode descriptors and register names are
//!   passed in, so several targets can coexist
//! - **Value substitution** - retarget references after renumbering passes
//! - **Deterministic rendering** - with or without target services
//!
//! ## Quick Start
//!
//! ```rust
//! use machinst::machine::{MachineInstr, OperandKind};
//! use machinst::target::sbpf::{self, SbpfOp};
//! use machinst::value::{ValueKind, ValueTable};
//!
//! let target = sbpf::target();
//! let mut values = ValueTable::new();
//! let sum = values.add("sum", ValueKind::Instruction);
//!
//! // add64 has two operands; operand 0 is the declared result
//! let mut mi = MachineInstr::new(target.instr_info().clone(), SbpfOp::Add.opcode());
//! mi.set_value_operand(0, OperandKind::VirtualRegisterRef, sum, false, false);
//! mi.set_immediate_operand(1, OperandKind::SignExtendedImmediate, 8);
//!
//! assert!(mi.operand(0).is_defined());
//! assert_eq!(
//!     mi.display_with(&values, &target).to_string(),
//!     "add64\t%reg(val sum)<def>\t8"
//! );
//! ```
//!
//! ### Register allocation and substitution
//!
//! ```rust
//! use machinst::machine::{DefUse, MachineInstr, OperandKind};
//! use machinst::target::sbpf::{self, SbpfOp, SbpfReg};
//! use machinst::value::{ValueKind, ValueTable};
//!
//! let target = sbpf::target();
//! let mut values = ValueTable::new();
//! let a = values.add("a", ValueKind::Instruction);
//! let b = values.add("b", ValueKind::Instruction);
//!
//! let mut mi = MachineInstr::new(target.instr_info().clone(), SbpfOp::Mov.opcode());
//! mi.set_value_operand(0, OperandKind::VirtualRegisterRef, a, false, false);
//! mi.set_value_operand(1, OperandKind::VirtualRegisterRef, a, false, false);
//!
//! // coalescing: only the definition is renamed
//! assert_eq!(mi.substitute_value(a, b, true), 1);
//!
//! mi.bind_register_for_operand(0, SbpfReg::R6.into());
//! assert!(mi.uses_register(SbpfReg::R6.into()));
//! assert_eq!(
//!     mi.display_with(&values, &target).to_string(),
//!     "mov64\t%reg(val b)==%r6<def>\t%reg(val a)"
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! value → target → machine::operand → machine::instruction → render / block
//! ```
//!
//! ### Main Components
//!
//! - [`MachineInstr`] - Opcode, operands, implicit references, used registers
//! - [`MachineOperand`] - One explicit operand
//! - [`MachineBasicBlock`] - Append-only instruction container
//! - [`Target`] - Opcode descriptor table plus register names
//! - [`TargetDescription`] - JSON target configuration
//! - [`ValueTable`] - Owner of the symbolic values operands refer to
//!
//! ## Error Handling
//!
//! Misusing an instruction panics. Loading a target description is the only
//! fallible operation:
//!
//! ```rust
//! use machinst::{Error, TargetDescription};
//!
//! let json = r#"{"name": "bad", "first_virtual_register": 1,
//!                "opcodes": [{"name": "neg", "operand_count": 1, "result_position": 3}]}"#;
//! match TargetDescription::from_json(json) {
//!     Ok(_) => panic!("Should have failed"),
//!     Err(e) => assert!(matches!(e, Error::InvalidResultPosition { .. })),
//! }
//! ```
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod machine;
pub mod target;
pub mod value;

// Re-export main types
pub use error::{Error, Result};
pub use machine::{
    AddressModifier, DefUse, ImplicitRef, MachineBasicBlock, MachineInstr, MachineOperand,
    OperandKind,
};
pub use target::{
    InstrInfo, Opcode, OpcodeDescriptor, OpcodeTable, Reg, RegisterInfo, RegisterTable, Target,
    TargetDescription,
};
pub use value::{ValueId, ValueKind, ValueLookup, ValueTable};
