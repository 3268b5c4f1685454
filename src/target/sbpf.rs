//! # Built-in sBPF target
//!
//! sBPF uses 11 64-bit registers (R0-R10) and a RISC-like instruction set.
//! ALU operations are two-address: the destination is read and written.
//!
//! - R0 return value
//! - R1-R5 arguments, caller-saved
//! - R6-R9 callee-saved
//! - R10 frame pointer (read-only)

use super::{OpcodeDescriptor, OpcodeTable, Opcode, Reg, RegisterTable, Target};
use std::sync::Arc;

/// First register number that denotes a virtual register
pub const FIRST_VIRTUAL_REGISTER: u32 = 11;

/// sBPF physical registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SbpfReg {
    /// Return value register
    R0 = 0,
    /// Argument 1 / caller-saved register
    R1 = 1,
    /// Argument 2 / caller-saved register
    R2 = 2,
    /// Argument 3 / caller-saved register
    R3 = 3,
    /// Argument 4 / caller-saved register
    R4 = 4,
    /// Argument 5 / caller-saved register
    R5 = 5,
    /// Callee-saved register
    R6 = 6,
    /// Callee-saved register
    R7 = 7,
    /// Callee-saved register
    R8 = 8,
    /// Callee-saved register
    R9 = 9,
    /// Frame pointer (read-only)
    R10 = 10,
}

impl SbpfReg {
    /// All registers in numbering order
    pub const ALL: [SbpfReg; 11] = [
        SbpfReg::R0,
        SbpfReg::R1,
        SbpfReg::R2,
        SbpfReg::R3,
        SbpfReg::R4,
        SbpfReg::R5,
        SbpfReg::R6,
        SbpfReg::R7,
        SbpfReg::R8,
        SbpfReg::R9,
        SbpfReg::R10,
    ];

    /// Assembly name
    pub fn name(self) -> &'static str {
        match self {
            SbpfReg::R0 => "r0",
            SbpfReg::R1 => "r1",
            SbpfReg::R2 => "r2",
            SbpfReg::R3 => "r3",
            SbpfReg::R4 => "r4",
            SbpfReg::R5 => "r5",
            SbpfReg::R6 => "r6",
            SbpfReg::R7 => "r7",
            SbpfReg::R8 => "r8",
            SbpfReg::R9 => "r9",
            SbpfReg::R10 => "r10",
        }
    }
}

impl From<SbpfReg> for Reg {
    fn from(reg: SbpfReg) -> Self {
        Reg(reg as u32)
    }
}

/// sBPF operations known to the built-in descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SbpfOp {
    /// dst = src
    Mov,
    /// dst += src
    Add,
    /// dst -= src
    Sub,
    /// dst *= src
    Mul,
    /// dst /= src
    Div,
    /// dst %= src
    Mod,
    /// dst &= src
    And,
    /// dst |= src
    Or,
    /// dst ^= src
    Xor,
    /// dst <<= src
    Lsh,
    /// dst >>= src
    Rsh,
    /// dst = -dst
    Neg,
    /// dst = *(u64 *)(base + offset)
    Ldxdw,
    /// *(u64 *)(base + offset) = src
    Stxdw,
    /// dst = imm64 (16-byte instruction)
    Lddw,
    /// Unconditional jump
    Ja,
    /// Jump if equal
    Jeq,
    /// Jump if not equal
    Jne,
    /// Jump if greater than (unsigned)
    Jgt,
    /// Function or syscall call (variable operand count)
    Call,
    /// Return from function
    Exit,
}

impl SbpfOp {
    /// All operations in opcode order
    pub const ALL: [SbpfOp; 21] = [
        SbpfOp::Mov,
        SbpfOp::Add,
        SbpfOp::Sub,
        SbpfOp::Mul,
        SbpfOp::Div,
        SbpfOp::Mod,
        SbpfOp::And,
        SbpfOp::Or,
        SbpfOp::Xor,
        SbpfOp::Lsh,
        SbpfOp::Rsh,
        SbpfOp::Neg,
        SbpfOp::Ldxdw,
        SbpfOp::Stxdw,
        SbpfOp::Lddw,
        SbpfOp::Ja,
        SbpfOp::Jeq,
        SbpfOp::Jne,
        SbpfOp::Jgt,
        SbpfOp::Call,
        SbpfOp::Exit,
    ];

    /// Opcode in the built-in descriptor table
    pub fn opcode(self) -> Opcode {
        Opcode(self as u16)
    }

    /// Descriptor for this operation
    pub fn descriptor(self) -> OpcodeDescriptor {
        match self {
            SbpfOp::Mov => OpcodeDescriptor::new("mov64", 2, Some(0)),
            SbpfOp::Add => OpcodeDescriptor::new("add64", 2, Some(0)),
            SbpfOp::Sub => OpcodeDescriptor::new("sub64", 2, Some(0)),
            SbpfOp::Mul => OpcodeDescriptor::new("mul64", 2, Some(0)),
            SbpfOp::Div => OpcodeDescriptor::new("div64", 2, Some(0)),
            SbpfOp::Mod => OpcodeDescriptor::new("mod64", 2, Some(0)),
            SbpfOp::And => OpcodeDescriptor::new("and64", 2, Some(0)),
            SbpfOp::Or => OpcodeDescriptor::new("or64", 2, Some(0)),
            SbpfOp::Xor => OpcodeDescriptor::new("xor64", 2, Some(0)),
            SbpfOp::Lsh => OpcodeDescriptor::new("lsh64", 2, Some(0)),
            SbpfOp::Rsh => OpcodeDescriptor::new("rsh64", 2, Some(0)),
            SbpfOp::Neg => OpcodeDescriptor::new("neg64", 1, Some(0)),
            SbpfOp::Ldxdw => OpcodeDescriptor::new("ldxdw", 3, Some(0)),
            SbpfOp::Stxdw => OpcodeDescriptor::new("stxdw", 3, None),
            SbpfOp::Lddw => OpcodeDescriptor::new("lddw", 2, Some(0)),
            SbpfOp::Ja => OpcodeDescriptor::new("ja", 1, None),
            SbpfOp::Jeq => OpcodeDescriptor::new("jeq", 3, None),
            SbpfOp::Jne => OpcodeDescriptor::new("jne", 3, None),
            SbpfOp::Jgt => OpcodeDescriptor::new("jgt", 3, None),
            SbpfOp::Call => OpcodeDescriptor::variadic("call", None),
            SbpfOp::Exit => OpcodeDescriptor::new("exit", 0, None),
        }
    }
}

/// Descriptor table for the built-in sBPF operations
pub fn opcode_table() -> OpcodeTable {
    SbpfOp::ALL.iter().map(|op| op.descriptor()).collect()
}

/// Register catalogue R0-R10
pub fn register_table() -> RegisterTable {
    RegisterTable::new(SbpfReg::ALL.iter().map(|r| r.name()), FIRST_VIRTUAL_REGISTER)
}

/// The built-in sBPF target
pub fn target() -> Target {
    Target::new("sbpf", Arc::new(opcode_table()), Arc::new(register_table()))
}
