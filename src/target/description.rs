//! JSON target descriptions
//!
//! ```ignore
//! let json = std::fs::read_to_string("sbpf.json")?;
//! let target = TargetDescription::from_json(&json)?.into_target()?;
//! ```

use super::opcodes::{OpcodeDescriptor, OpcodeTable, MAX_OPCODES};
use super::registers::RegisterTable;
use super::Target;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Serializable description of a target's opcodes and registers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescription {
    /// Target name (used in error messages)
    pub name: String,
    /// First register number treated as virtual
    pub first_virtual_register: u32,
    /// Physical register names, indexed by register number
    #[serde(default)]
    pub registers: Vec<String>,
    /// Opcode descriptors, indexed by opcode number
    #[serde(default)]
    pub opcodes: Vec<OpcodeDescriptor>,
}

impl TargetDescription {
    /// Parse a description from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let description: TargetDescription = serde_json::from_str(json)?;
        description.validate()?;
        tracing::debug!(
            target_name = %description.name,
            opcodes = description.opcodes.len(),
            registers = description.registers.len(),
            "loaded target description"
        );
        Ok(description)
    }

    /// Serialize back to pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the description for inconsistencies
    pub fn validate(&self) -> Result<()> {
        if self.registers.len() as u64 > self.first_virtual_register as u64 {
            return Err(Error::RegisterOverlap {
                target: self.name.clone(),
                count: self.registers.len(),
                first_virtual: self.first_virtual_register,
            });
        }
        if let Some(index) = self.registers.iter().position(|r| r.is_empty()) {
            return Err(Error::EmptyName {
                what: "register",
                index,
            });
        }

        if self.opcodes.len() > MAX_OPCODES {
            return Err(Error::TooManyOpcodes {
                target: self.name.clone(),
                count: self.opcodes.len(),
                max: MAX_OPCODES,
            });
        }

        let mut seen = HashSet::new();
        for (index, opcode) in self.opcodes.iter().enumerate() {
            if opcode.name.is_empty() {
                return Err(Error::EmptyName {
                    what: "opcode",
                    index,
                });
            }
            if !seen.insert(opcode.name.as_str()) {
                return Err(Error::DuplicateOpcode {
                    target: self.name.clone(),
                    name: opcode.name.clone(),
                });
            }
            if let (Some(count), Some(pos)) = (opcode.fixed_arity(), opcode.result_index()) {
                if pos >= count {
                    return Err(Error::InvalidResultPosition {
                        name: opcode.name.clone(),
                        position: opcode.result_position,
                        operand_count: opcode.operand_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Build the descriptor table and register catalogue
    pub fn into_target(self) -> Result<Target> {
        self.validate()?;
        let opcodes: OpcodeTable = self.opcodes.into_iter().collect();
        let registers = RegisterTable::new(self.registers, self.first_virtual_register);
        Ok(Target::new(
            self.name,
            Arc::new(opcodes),
            Arc::new(registers),
        ))
    }
}
