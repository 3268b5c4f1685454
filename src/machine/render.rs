//! Textual rendering of operands and instructions
//!
//! One algorithm serves both entry points. `display` renders without target
//! services (registers print as `%mreg(N)`, opcode names come from the
//! instruction's own descriptor table); `display_with` resolves register
//! names through the given [`Target`]. Operand content is identical in both.
//!
//! ```text
//! add64	%reg(val x)==%r3<def>	%r4
//! call	%disp(label memcpy)	ImplicitRefs: 	(val dst)<def>
//! ```

use super::instruction::MachineInstr;
use super::operand::{AddressModifier, DefUse, MachineOperand, OperandValue};
use crate::target::{Reg, Target};
use crate::value::{ValueId, ValueLookup};
use std::fmt;

/// Services available while rendering
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    values: &'a dyn ValueLookup,
    target: Option<&'a Target>,
}

impl<'a> RenderContext<'a> {
    /// Context without target services
    pub fn new(values: &'a dyn ValueLookup) -> Self {
        Self {
            values,
            target: None,
        }
    }

    /// Context that resolves register and opcode names through `target`
    pub fn with_target(values: &'a dyn ValueLookup, target: &'a Target) -> Self {
        Self {
            values,
            target: Some(target),
        }
    }

    fn write_value(&self, f: &mut fmt::Formatter<'_>, value: ValueId) -> fmt::Result {
        f.write_str("(val ")?;
        self.write_value_name(f, value)?;
        f.write_str(")")
    }

    fn write_value_name(&self, f: &mut fmt::Formatter<'_>, value: ValueId) -> fmt::Result {
        match self.values.name(value) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", value),
        }
    }

    fn write_reg(&self, f: &mut fmt::Formatter<'_>, reg: Reg) -> fmt::Result {
        let regs = match self.target {
            Some(target) => target.register_info(),
            None => return write!(f, "%mreg({})", reg.0),
        };
        if !regs.is_physical(reg) {
            return write!(f, "%reg{}", reg.0);
        }
        match regs.name(reg) {
            Some(name) => write!(f, "%{}", name),
            // physical by number but unnamed by the target
            None => write!(f, "%mreg({})", reg.0),
        }
    }

    /// Render one operand
    pub fn write_operand(&self, f: &mut fmt::Formatter<'_>, op: &MachineOperand) -> fmt::Result {
        let modifier = op.address_modifier();
        if let Some(m) = modifier {
            f.write_str(match m {
                AddressModifier::HighBits32 => "%lm(",
                AddressModifier::LowBits32 => "%lo(",
                AddressModifier::HighBits64 => "%hh(",
                AddressModifier::LowBits64 => "%hm(",
            })?;
        }

        match *op.value() {
            OperandValue::Unset => f.write_str("<unset>")?,
            OperandValue::VirtualRegister { value, allocated } => {
                f.write_str("%reg")?;
                self.write_value(f, value)?;
                if let Some(reg) = allocated {
                    f.write_str("==")?;
                    self.write_reg(f, reg)?;
                }
            }
            OperandValue::ConditionCodeRegister { value, allocated } => {
                f.write_str("%ccreg")?;
                self.write_value(f, value)?;
                if let Some(reg) = allocated {
                    f.write_str("==")?;
                    self.write_reg(f, reg)?;
                }
            }
            OperandValue::PhysicalRegister(reg) => self.write_reg(f, reg)?,
            OperandValue::SignExtendedImmediate(v) | OperandValue::UnsignedImmediate(v) => {
                write!(f, "{}", v)?
            }
            OperandValue::PCRelativeDisplacement(value) => {
                let prefix = if self.values.kind(value).is_label() {
                    "label "
                } else {
                    "addr-of-val "
                };
                write!(f, "%disp({}", prefix)?;
                self.write_value_name(f, value)?;
                f.write_str(")")?;
            }
        }

        if modifier.is_some() {
            f.write_str(")")?;
        }
        Ok(())
    }

    /// Render a whole instruction (no trailing newline)
    pub fn write_instr(&self, f: &mut fmt::Formatter<'_>, mi: &MachineInstr) -> fmt::Result {
        match self.target {
            Some(target) => f.write_str(target.instr_info().name(mi.opcode()))?,
            None => f.write_str(mi.instr_info().name(mi.opcode()))?,
        }

        for op in mi.operands() {
            f.write_str("\t")?;
            self.write_operand(f, op)?;
            write_marker(f, op.def_use())?;
        }

        if mi.implicit_ref_count() > 0 {
            f.write_str("\tImplicitRefs: ")?;
            for imp in mi.implicit_refs() {
                f.write_str("\t")?;
                self.write_value(f, imp.value())?;
                write_marker(f, imp.def_use())?;
            }
        }
        Ok(())
    }
}

fn write_marker(f: &mut fmt::Formatter<'_>, def_use: DefUse) -> fmt::Result {
    match def_use {
        DefUse::DefAndUse => f.write_str("<def&use>"),
        DefUse::Def => f.write_str("<def>"),
        DefUse::Use => Ok(()),
    }
}

/// `Display` adapter for an operand
pub struct DisplayOperand<'a> {
    op: &'a MachineOperand,
    ctx: RenderContext<'a>,
}

impl fmt::Display for DisplayOperand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ctx.write_operand(f, self.op)
    }
}

/// `Display` adapter for an instruction
pub struct DisplayInstr<'a> {
    mi: &'a MachineInstr,
    ctx: RenderContext<'a>,
}

impl fmt::Display for DisplayInstr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.ctx.write_instr(f, self.mi)
    }
}

impl MachineOperand {
    /// Render without target services
    pub fn display<'a>(&'a self, values: &'a dyn ValueLookup) -> DisplayOperand<'a> {
        self.display_in(RenderContext::new(values))
    }

    /// Render with register names from `target`
    pub fn display_with<'a>(
        &'a self,
        values: &'a dyn ValueLookup,
        target: &'a Target,
    ) -> DisplayOperand<'a> {
        self.display_in(RenderContext::with_target(values, target))
    }

    /// Render in an explicit context
    pub fn display_in<'a>(&'a self, ctx: RenderContext<'a>) -> DisplayOperand<'a> {
        DisplayOperand { op: self, ctx }
    }
}

impl MachineInstr {
    /// Render without target services
    pub fn display<'a>(&'a self, values: &'a dyn ValueLookup) -> DisplayInstr<'a> {
        self.display_in(RenderContext::new(values))
    }

    /// Render with opcode and register names from `target`
    pub fn display_with<'a>(
        &'a self,
        values: &'a dyn ValueLookup,
        target: &'a Target,
    ) -> DisplayInstr<'a> {
        self.display_in(RenderContext::with_target(values, target))
    }

    /// Render in an explicit context
    pub fn display_in<'a>(&'a self, ctx: RenderContext<'a>) -> DisplayInstr<'a> {
        DisplayInstr { mi: self, ctx }
    }

    /// Emit the context-free rendering as a debug event
    pub fn dump(&self, values: &dyn ValueLookup) {
        tracing::debug!(instr = %self.display(values), "machine instruction");
    }
}
