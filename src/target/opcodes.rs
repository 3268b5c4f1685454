//! Opcode descriptors
//!
//! Every instruction-constructing call receives an [`InstrInfo`] handle
//! instead of reading a process-wide table, so several targets can coexist
//! in one process.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operation code: index into a target's descriptor table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u16);

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "opcode({})", self.0)
    }
}

/// Largest number of opcodes one table can hold
pub const MAX_OPCODES: usize = u16::MAX as usize + 1;

fn no_result() -> i32 {
    -1
}

fn descriptor_field(n: usize) -> i32 {
    match i32::try_from(n) {
        Ok(n) => n,
        Err(_) => panic!("{} does not fit an opcode descriptor field", n),
    }
}

/// Static properties of one opcode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodeDescriptor {
    /// Mnemonic used when rendering
    pub name: String,
    /// Number of explicit operands (negative = variable arity)
    pub operand_count: i32,
    /// Operand index written by the instruction (negative = none)
    #[serde(default = "no_result")]
    pub result_position: i32,
}

impl OpcodeDescriptor {
    /// Fixed-arity opcode with an optional result operand
    pub fn new(name: &str, operand_count: usize, result_position: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            operand_count: descriptor_field(operand_count),
            result_position: result_position.map_or(-1, descriptor_field),
        }
    }

    /// Variable-arity opcode
    pub fn variadic(name: &str, result_position: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            operand_count: -1,
            result_position: result_position.map_or(-1, descriptor_field),
        }
    }

    /// Declared operand count, or `None` for variable arity
    pub fn fixed_arity(&self) -> Option<usize> {
        usize::try_from(self.operand_count).ok()
    }

    /// Index of the defined result operand, if any
    pub fn result_index(&self) -> Option<usize> {
        usize::try_from(self.result_position).ok()
    }

    /// True if operand `index` is the declared result
    pub fn is_result(&self, index: usize) -> bool {
        self.result_index() == Some(index)
    }
}

/// Read-only opcode descriptor lookup
pub trait InstrInfo {
    /// Descriptor for `opcode`. Panics on an opcode the target does not define.
    fn descriptor(&self, opcode: Opcode) -> &OpcodeDescriptor;

    /// Mnemonic for `opcode`
    fn name(&self, opcode: Opcode) -> &str {
        &self.descriptor(opcode).name
    }
}

/// Descriptor table indexed by opcode number
#[derive(Debug, Clone, Default)]
pub struct OpcodeTable {
    descriptors: Vec<OpcodeDescriptor>,
    by_name: HashMap<String, Opcode>,
}

impl OpcodeTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor; its opcode is the next free index.
    ///
    /// Panics once the table holds [`MAX_OPCODES`] descriptors.
    pub fn push(&mut self, descriptor: OpcodeDescriptor) -> Opcode {
        let opcode = match u16::try_from(self.descriptors.len()) {
            Ok(n) => Opcode(n),
            Err(_) => panic!("opcode table is full ({} opcodes)", MAX_OPCODES),
        };
        self.by_name.insert(descriptor.name.clone(), opcode);
        self.descriptors.push(descriptor);
        opcode
    }

    /// Find an opcode by mnemonic
    pub fn lookup(&self, name: &str) -> Option<Opcode> {
        self.by_name.get(name).copied()
    }

    /// Number of opcodes
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True if no opcodes were added
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate over `(opcode, descriptor)` pairs in opcode order
    pub fn iter(&self) -> impl Iterator<Item = (Opcode, &OpcodeDescriptor)> {
        self.descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| (Opcode(i as u16), d))
    }
}

impl FromIterator<OpcodeDescriptor> for OpcodeTable {
    fn from_iter<I: IntoIterator<Item = OpcodeDescriptor>>(iter: I) -> Self {
        let mut table = OpcodeTable::new();
        for descriptor in iter {
            table.push(descriptor);
        }
        table
    }
}

impl InstrInfo for OpcodeTable {
    fn descriptor(&self, opcode: Opcode) -> &OpcodeDescriptor {
        match self.descriptors.get(opcode.0 as usize) {
            Some(d) => d,
            None => panic!(
                "{} is not defined ({} opcodes in table)",
                opcode,
                self.descriptors.len()
            ),
        }
    }
}
