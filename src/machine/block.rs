//! Machine basic blocks
//!
//! The core only ever appends to a block; scheduling and other reordering
//! passes work on the instruction list directly.

use super::instruction::MachineInstr;
use crate::target::{InstrInfoRef, Opcode};

/// Ordered list of machine instructions under a label
#[derive(Debug, Default)]
pub struct MachineBasicBlock {
    label: String,
    instructions: Vec<MachineInstr>,
}

impl MachineBasicBlock {
    /// Create an empty block
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            instructions: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Append an instruction and return it for further editing
    pub fn push_back(&mut self, mi: MachineInstr) -> &mut MachineInstr {
        tracing::trace!(block = %self.label, index = self.instructions.len(), "appending instruction");
        self.instructions.push(mi);
        let last = self.instructions.len() - 1;
        &mut self.instructions[last]
    }

    /// Create a reserve-only instruction directly at the end of the block.
    /// Its operands are filled through the returned reference.
    pub fn build_at_end(
        &mut self,
        info: InstrInfoRef,
        opcode: Opcode,
        capacity: usize,
    ) -> &mut MachineInstr {
        self.push_back(MachineInstr::with_capacity(info, opcode, capacity))
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MachineInstr> {
        self.instructions.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MachineInstr> {
        self.instructions.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MachineInstr> {
        self.instructions.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, MachineInstr> {
        self.instructions.iter_mut()
    }
}

impl<'a> IntoIterator for &'a MachineBasicBlock {
    type Item = &'a MachineInstr;
    type IntoIter = std::slice::Iter<'a, MachineInstr>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
