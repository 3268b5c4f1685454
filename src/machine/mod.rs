//! # Machine Instructions
//!
//! The data model that instruction selection produces and later backend
//! passes (scheduling, register allocation, emission) read and rewrite.
//!
//! ## Module Structure
//!
//! ```text
//! machine/
//! ├── mod.rs          # This file - module definition and re-exports
//! ├── operand.rs      # OperandKind, DefUse, AddressModifier, MachineOperand, ImplicitRef
//! ├── instruction.rs  # MachineInstr: construction, setters, implicit refs
//! ├── substitute.rs   # MachineInstr::substitute_value
//! ├── render.rs       # RenderContext, Display adapters
//! ├── block.rs        # MachineBasicBlock
//! └── debug.rs        # Listings and dumps
//! ```
//!
//! ## Construction
//!
//! | Constructor | Operands | Filled with |
//! |-------------|----------|-------------|
//! | [`MachineInstr::new`] | descriptor arity | `set_*_operand` |
//! | [`MachineInstr::with_operand_count`] | caller arity | `set_*_operand` |
//! | [`MachineInstr::with_capacity`] | none | `add_*` builders |
//! | [`MachineBasicBlock::build_at_end`] | none, appended to block | `add_*` builders |
//!
//! ## Invariant violations
//!
//! Out-of-range operand indices, immediates at the result position,
//! `replace` with implicit references present, and appending to a complete
//! operand list are caller defects and panic.

mod block;
pub mod debug;
mod instruction;
mod operand;
mod render;
mod substitute;

pub use block::MachineBasicBlock;
pub use debug::{dump_block, format_block, format_machine_instr};
pub use instruction::MachineInstr;
pub use operand::{
    AddressModifier, DefUse, ImplicitRef, MachineOperand, OperandKind, OperandValue,
};
pub use render::{DisplayInstr, DisplayOperand, RenderContext};
