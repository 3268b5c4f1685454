//! Machine operands
//!
//! An operand is a sum type over its kinds. Each variant carries only the
//! fields that make sense for it; def/use classification and the hi/lo
//! address modifier are orthogonal fields shared by all variants.

use crate::target::Reg;
use crate::value::ValueId;

/// Operand kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Virtual register identified by the value that defines it
    VirtualRegisterRef,
    /// Condition-code register identified by the value that defines it
    ConditionCodeRegisterRef,
    /// Concrete machine register
    PhysicalRegister,
    /// Immediate sign-extended to the operation width
    SignExtendedImmediate,
    /// Immediate zero-extended to the operation width
    UnsignedImmediate,
    /// Offset from the current instruction to a label or address
    PCRelativeDisplacement,
}

impl OperandKind {
    /// Kinds that carry a referenced value
    pub fn carries_value(self) -> bool {
        matches!(
            self,
            OperandKind::VirtualRegisterRef
                | OperandKind::ConditionCodeRegisterRef
                | OperandKind::PCRelativeDisplacement
        )
    }

    /// Immediate kinds
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            OperandKind::SignExtendedImmediate | OperandKind::UnsignedImmediate
        )
    }
}

/// Whether an operand is read, written, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DefUse {
    /// Read by the instruction
    #[default]
    Use,
    /// Written by the instruction
    Def,
    /// Read and written by the instruction
    DefAndUse,
}

impl DefUse {
    /// Classification from the pair of flags used by instruction setters
    pub fn from_flags(is_def: bool, is_def_and_use: bool) -> Self {
        if is_def_and_use {
            DefUse::DefAndUse
        } else if is_def {
            DefUse::Def
        } else {
            DefUse::Use
        }
    }

    /// Written (including read-modify-write)
    pub fn is_def(self) -> bool {
        matches!(self, DefUse::Def | DefUse::DefAndUse)
    }

    /// Read (including read-modify-write)
    pub fn is_use(self) -> bool {
        matches!(self, DefUse::Use | DefUse::DefAndUse)
    }
}

/// Part of a wide constant or address that the operand stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressModifier {
    /// Bits 32..63 of the low word (`%lm`)
    HighBits32,
    /// Bits 0..31 (`%lo`)
    LowBits32,
    /// Upper bits of a 64-bit value (`%hh`)
    HighBits64,
    /// Middle bits of a 64-bit value (`%hm`)
    LowBits64,
}

/// Kind-specific payload of an operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperandValue {
    /// Slot created by a pre-sizing constructor and not yet filled
    #[default]
    Unset,
    /// Virtual register reference
    VirtualRegister {
        /// Value that defines the register
        value: ValueId,
        /// Register bound by the allocator
        allocated: Option<Reg>,
    },
    /// Condition-code register reference
    ConditionCodeRegister {
        /// Value that defines the condition code
        value: ValueId,
        /// Register bound by the allocator
        allocated: Option<Reg>,
    },
    /// Machine register
    PhysicalRegister(Reg),
    /// Sign-extended immediate
    SignExtendedImmediate(i64),
    /// Zero-extended immediate
    UnsignedImmediate(i64),
    /// PC-relative displacement to a label or value address
    PCRelativeDisplacement(ValueId),
}

/// One explicit operand of a machine instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineOperand {
    value: OperandValue,
    def_use: DefUse,
    modifier: Option<AddressModifier>,
}

impl MachineOperand {
    fn build(value: OperandValue, def_use: DefUse) -> Self {
        Self {
            value,
            def_use,
            modifier: None,
        }
    }

    /// Virtual register reference to `value`
    pub fn virtual_register(value: ValueId, def_use: DefUse) -> Self {
        Self::build(
            OperandValue::VirtualRegister {
                value,
                allocated: None,
            },
            def_use,
        )
    }

    /// Condition-code register reference to `value`
    pub fn cc_register(value: ValueId, def_use: DefUse) -> Self {
        Self::build(
            OperandValue::ConditionCodeRegister {
                value,
                allocated: None,
            },
            def_use,
        )
    }

    /// Machine register operand
    pub fn machine_register(reg: Reg, def_use: DefUse) -> Self {
        Self::build(OperandValue::PhysicalRegister(reg), def_use)
    }

    /// Sign-extended immediate (always a use)
    pub fn signed_immediate(value: i64) -> Self {
        Self::build(OperandValue::SignExtendedImmediate(value), DefUse::Use)
    }

    /// Zero-extended immediate (always a use)
    pub fn unsigned_immediate(value: i64) -> Self {
        Self::build(OperandValue::UnsignedImmediate(value), DefUse::Use)
    }

    /// PC-relative displacement to `target` (always a use)
    pub fn pc_displacement(target: ValueId) -> Self {
        Self::build(OperandValue::PCRelativeDisplacement(target), DefUse::Use)
    }

    /// Value-carrying operand of the given kind. Panics for other kinds.
    pub fn with_value(kind: OperandKind, value: ValueId, def_use: DefUse) -> Self {
        match kind {
            OperandKind::VirtualRegisterRef => Self::virtual_register(value, def_use),
            OperandKind::ConditionCodeRegisterRef => Self::cc_register(value, def_use),
            OperandKind::PCRelativeDisplacement => Self::build(
                OperandValue::PCRelativeDisplacement(value),
                def_use,
            ),
            other => panic!("{:?} operands do not reference a value", other),
        }
    }

    /// Immediate operand of the given kind. Panics for non-immediate kinds.
    pub fn immediate(kind: OperandKind, value: i64) -> Self {
        match kind {
            OperandKind::SignExtendedImmediate => Self::signed_immediate(value),
            OperandKind::UnsignedImmediate => Self::unsigned_immediate(value),
            other => panic!("{:?} is not an immediate kind", other),
        }
    }

    /// Attach an address modifier
    pub fn with_modifier(mut self, modifier: AddressModifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Kind tag, or `None` for an unset slot
    pub fn kind(&self) -> Option<OperandKind> {
        match self.value {
            OperandValue::Unset => None,
            OperandValue::VirtualRegister { .. } => Some(OperandKind::VirtualRegisterRef),
            OperandValue::ConditionCodeRegister { .. } => {
                Some(OperandKind::ConditionCodeRegisterRef)
            }
            OperandValue::PhysicalRegister(_) => Some(OperandKind::PhysicalRegister),
            OperandValue::SignExtendedImmediate(_) => Some(OperandKind::SignExtendedImmediate),
            OperandValue::UnsignedImmediate(_) => Some(OperandKind::UnsignedImmediate),
            OperandValue::PCRelativeDisplacement(_) => Some(OperandKind::PCRelativeDisplacement),
        }
    }

    /// Kind-specific payload
    pub fn value(&self) -> &OperandValue {
        &self.value
    }

    /// True once a setter has filled the slot
    pub fn is_set(&self) -> bool {
        self.value != OperandValue::Unset
    }

    /// Def/use classification
    pub fn def_use(&self) -> DefUse {
        self.def_use
    }

    /// Address modifier, if any
    pub fn address_modifier(&self) -> Option<AddressModifier> {
        self.modifier
    }

    pub fn is_defined(&self) -> bool {
        self.def_use.is_def()
    }

    pub fn is_used(&self) -> bool {
        self.def_use.is_use()
    }

    pub fn is_def_and_use(&self) -> bool {
        self.def_use == DefUse::DefAndUse
    }

    /// Register references and machine registers
    pub fn is_register(&self) -> bool {
        matches!(
            self.value,
            OperandValue::VirtualRegister { .. }
                | OperandValue::ConditionCodeRegister { .. }
                | OperandValue::PhysicalRegister(_)
        )
    }

    pub fn is_immediate(&self) -> bool {
        matches!(
            self.value,
            OperandValue::SignExtendedImmediate(_) | OperandValue::UnsignedImmediate(_)
        )
    }

    /// Referenced value for value-carrying kinds
    pub fn referenced_value(&self) -> Option<ValueId> {
        match self.value {
            OperandValue::VirtualRegister { value, .. }
            | OperandValue::ConditionCodeRegister { value, .. }
            | OperandValue::PCRelativeDisplacement(value) => Some(value),
            _ => None,
        }
    }

    /// True for register operands that carry a physical register number
    pub fn has_allocated_register(&self) -> bool {
        self.allocated_register().is_some()
    }

    /// Physical register bound to a register reference, or the machine register
    pub fn allocated_register(&self) -> Option<Reg> {
        match self.value {
            OperandValue::VirtualRegister { allocated, .. }
            | OperandValue::ConditionCodeRegister { allocated, .. } => allocated,
            OperandValue::PhysicalRegister(reg) => Some(reg),
            _ => None,
        }
    }

    /// Machine register number. Panics unless this is a `PhysicalRegister`.
    pub fn machine_register_number(&self) -> Reg {
        match self.value {
            OperandValue::PhysicalRegister(reg) => reg,
            _ => panic!("machine register requested from {:?} operand", self.kind()),
        }
    }

    /// Immediate value. Panics unless this is an immediate kind.
    pub fn immediate_value(&self) -> i64 {
        match self.value {
            OperandValue::SignExtendedImmediate(v) | OperandValue::UnsignedImmediate(v) => v,
            _ => panic!("immediate value requested from {:?} operand", self.kind()),
        }
    }

    /// Bind a physical register. Only reachable through the owning
    /// instruction, which records `reg` in its used-register set.
    pub(crate) fn bind_register(&mut self, reg: Reg) {
        match &mut self.value {
            OperandValue::VirtualRegister { allocated, .. }
            | OperandValue::ConditionCodeRegister { allocated, .. } => *allocated = Some(reg),
            OperandValue::PhysicalRegister(current) => *current = reg,
            _ => panic!("cannot bind register {} to {:?} operand", reg, self.kind()),
        }
    }

    pub(crate) fn set_def_use(&mut self, def_use: DefUse) {
        self.def_use = def_use;
    }

    pub(crate) fn set_modifier(&mut self, modifier: Option<AddressModifier>) {
        self.modifier = modifier;
    }

    /// Retarget the referenced value, keeping classification and allocation
    pub(crate) fn retarget(&mut self, new_value: ValueId) {
        match &mut self.value {
            OperandValue::VirtualRegister { value, .. }
            | OperandValue::ConditionCodeRegister { value, .. }
            | OperandValue::PCRelativeDisplacement(value) => *value = new_value,
            _ => panic!("{:?} operand does not reference a value", self.kind()),
        }
    }
}

/// Reference to a value that is read or written without being a positional operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImplicitRef {
    value: ValueId,
    def_use: DefUse,
}

impl ImplicitRef {
    /// New implicit reference
    pub fn new(value: ValueId, def_use: DefUse) -> Self {
        Self { value, def_use }
    }

    /// Referenced value
    pub fn value(&self) -> ValueId {
        self.value
    }

    /// Def/use classification
    pub fn def_use(&self) -> DefUse {
        self.def_use
    }

    pub fn is_defined(&self) -> bool {
        self.def_use.is_def()
    }

    pub fn is_used(&self) -> bool {
        self.def_use.is_use()
    }

    pub fn is_def_and_use(&self) -> bool {
        self.def_use == DefUse::DefAndUse
    }

    pub(crate) fn retarget(&mut self, value: ValueId) {
        self.value = value;
    }
}
