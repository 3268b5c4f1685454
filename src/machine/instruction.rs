//! Machine instructions
//!
//! A [`MachineInstr`] is an opcode, an ordered list of explicit operands, an
//! append-only list of implicit references, and the set of register numbers
//! its operands have mentioned. The opcode descriptor table is injected at
//! construction and kept as a shared handle.

use super::operand::{AddressModifier, DefUse, ImplicitRef, MachineOperand, OperandKind};
use crate::target::{InstrInfoRef, Opcode, OpcodeDescriptor, Reg};
use crate::value::ValueId;
use std::collections::BTreeSet;
use std::fmt;

/// A target-independent machine instruction
pub struct MachineInstr {
    opcode: Opcode,
    pub(super) operands: Vec<MachineOperand>,
    pub(super) implicit_refs: Vec<ImplicitRef>,
    used_regs: BTreeSet<Reg>,
    info: InstrInfoRef,
}

impl MachineInstr {
    /// Instruction with the fixed operand count declared by its descriptor.
    ///
    /// Panics if the opcode has variable arity.
    pub fn new(info: InstrInfoRef, opcode: Opcode) -> Self {
        let count = match info.descriptor(opcode).fixed_arity() {
            Some(count) => count,
            None => panic!(
                "{} has variable arity; use with_operand_count or with_capacity",
                info.name(opcode)
            ),
        };
        Self::with_operand_count(info, opcode, count)
    }

    /// Instruction with `count` unset operands (variable-arity opcodes)
    pub fn with_operand_count(info: InstrInfoRef, opcode: Opcode, count: usize) -> Self {
        Self {
            opcode,
            operands: vec![MachineOperand::default(); count],
            implicit_refs: Vec::new(),
            used_regs: BTreeSet::new(),
            info,
        }
    }

    /// Instruction with no operands and room for `capacity`; fill it with
    /// the `add_*` builders
    pub fn with_capacity(info: InstrInfoRef, opcode: Opcode, capacity: usize) -> Self {
        Self {
            opcode,
            operands: Vec::with_capacity(capacity),
            implicit_refs: Vec::new(),
            used_regs: BTreeSet::new(),
            info,
        }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Descriptor of the current opcode
    pub fn descriptor(&self) -> &OpcodeDescriptor {
        self.info.descriptor(self.opcode)
    }

    /// Descriptor table this instruction was built against
    pub fn instr_info(&self) -> &InstrInfoRef {
        &self.info
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    /// Operand `index`. Panics when out of range.
    pub fn operand(&self, index: usize) -> &MachineOperand {
        self.check_index(index);
        &self.operands[index]
    }

    pub fn operands(&self) -> &[MachineOperand] {
        &self.operands
    }

    /// True when the opcode has a fixed arity and the operand list has
    /// reached (or overrun) it. Appending is illegal from then on.
    pub fn is_operand_list_complete(&self) -> bool {
        match self.descriptor().fixed_arity() {
            Some(declared) => self.operands.len() >= declared,
            None => false,
        }
    }

    pub fn operand_is_defined(&self, index: usize) -> bool {
        self.operand(index).is_defined()
    }

    pub fn operand_is_def_and_use(&self, index: usize) -> bool {
        self.operand(index).is_def_and_use()
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.operands.len(),
            "operand index {} out of range for {} with {} operands",
            index,
            self.info.name(self.opcode),
            self.operands.len()
        );
    }

    fn classify(&self, index: usize, is_def: bool, is_def_and_use: bool) -> DefUse {
        let is_result = self.descriptor().is_result(index);
        DefUse::from_flags(is_def || is_result, is_def_and_use)
    }

    /// Make operand `index` a machine register. `is_def`, or `index` being
    /// the descriptor's result position, marks it as a definition.
    pub fn set_register_operand(&mut self, index: usize, reg: Reg, is_def: bool) {
        self.check_index(index);
        let def_use = self.classify(index, is_def, false);
        self.operands[index] = MachineOperand::machine_register(reg, def_use);
        self.used_regs.insert(reg);
    }

    /// Make operand `index` reference `value`. `kind` must be a
    /// value-carrying kind (register reference or PC-relative displacement).
    pub fn set_value_operand(
        &mut self,
        index: usize,
        kind: OperandKind,
        value: ValueId,
        is_def: bool,
        is_def_and_use: bool,
    ) {
        self.check_index(index);
        let def_use = self.classify(index, is_def, is_def_and_use);
        self.operands[index] = MachineOperand::with_value(kind, value, def_use);
    }

    /// Make operand `index` an immediate. Constants cannot be written, so
    /// the descriptor's result position is rejected.
    pub fn set_immediate_operand(&mut self, index: usize, kind: OperandKind, literal: i64) {
        self.check_index(index);
        assert!(
            !self.descriptor().is_result(index),
            "immediate constant cannot be the defined result (operand {} of {})",
            index,
            self.info.name(self.opcode)
        );
        self.operands[index] = MachineOperand::immediate(kind, literal);
    }

    /// Record the register chosen by the allocator for operand `index`
    pub fn bind_register_for_operand(&mut self, index: usize, reg: Reg) {
        self.check_index(index);
        self.operands[index].bind_register(reg);
        self.used_regs.insert(reg);
    }

    /// Mark operand `index` as one part of a split wide value
    pub fn set_address_modifier(&mut self, index: usize, modifier: Option<AddressModifier>) {
        self.check_index(index);
        self.operands[index].set_modifier(modifier);
    }

    /// Reuse this instruction for a different opcode with `operand_count`
    /// unset operands.
    ///
    /// Panics while implicit references exist: their def/use meaning belongs
    /// to the old opcode.
    pub fn replace(&mut self, opcode: Opcode, operand_count: usize) {
        assert!(
            self.implicit_refs.is_empty(),
            "replace would drop {} implicit references of {}",
            self.implicit_refs.len(),
            self.info.name(self.opcode)
        );
        tracing::trace!(
            from = %self.info.name(self.opcode),
            to = %self.info.name(opcode),
            operand_count,
            "replacing machine instruction"
        );
        self.opcode = opcode;
        self.operands.clear();
        self.operands.resize(operand_count, MachineOperand::default());
    }

    // =========================================================================
    // APPEND-STYLE BUILDERS
    // =========================================================================

    /// Appends at the next index. The descriptor's result position applies
    /// here as it does for the setters: an immediate there is rejected and a
    /// plain use becomes a definition.
    fn push_operand(&mut self, mut operand: MachineOperand) -> &mut Self {
        let index = self.operands.len();
        assert!(
            !self.is_operand_list_complete(),
            "{} already has its {} operands",
            self.info.name(self.opcode),
            index
        );
        if self.descriptor().is_result(index) {
            assert!(
                !operand.is_immediate(),
                "immediate constant cannot be the defined result (operand {} of {})",
                index,
                self.info.name(self.opcode)
            );
            if operand.def_use() == DefUse::Use {
                operand.set_def_use(DefUse::Def);
            }
        }
        self.operands.push(operand);
        self
    }

    /// Append a virtual register reference
    pub fn add_register_operand(&mut self, value: ValueId, def_use: DefUse) -> &mut Self {
        self.push_operand(MachineOperand::virtual_register(value, def_use))
    }

    /// Append a condition-code register reference
    pub fn add_cc_register_operand(&mut self, value: ValueId, def_use: DefUse) -> &mut Self {
        self.push_operand(MachineOperand::cc_register(value, def_use))
    }

    /// Append a machine register
    pub fn add_machine_register_operand(&mut self, reg: Reg, def_use: DefUse) -> &mut Self {
        self.push_operand(MachineOperand::machine_register(reg, def_use));
        self.used_regs.insert(reg);
        self
    }

    /// Append a sign-extended immediate
    pub fn add_signed_immediate(&mut self, value: i64) -> &mut Self {
        self.push_operand(MachineOperand::signed_immediate(value))
    }

    /// Append a zero-extended immediate
    pub fn add_unsigned_immediate(&mut self, value: i64) -> &mut Self {
        self.push_operand(MachineOperand::unsigned_immediate(value))
    }

    /// Append a PC-relative displacement
    pub fn add_pc_displacement(&mut self, target: ValueId) -> &mut Self {
        self.push_operand(MachineOperand::pc_displacement(target))
    }

    // =========================================================================
    // IMPLICIT REFERENCES
    // =========================================================================

    /// Append an implicit reference
    pub fn add_implicit_ref(&mut self, value: ValueId, def_use: DefUse) -> &mut Self {
        self.implicit_refs.push(ImplicitRef::new(value, def_use));
        self
    }

    pub fn implicit_ref_count(&self) -> usize {
        self.implicit_refs.len()
    }

    /// Value of implicit reference `index`. Panics when out of range.
    pub fn implicit_ref(&self, index: usize) -> ValueId {
        self.implicit(index).value()
    }

    pub fn implicit_refs(&self) -> &[ImplicitRef] {
        &self.implicit_refs
    }

    pub fn implicit_ref_is_defined(&self, index: usize) -> bool {
        self.implicit(index).is_defined()
    }

    pub fn implicit_ref_is_used(&self, index: usize) -> bool {
        self.implicit(index).is_used()
    }

    pub fn implicit_ref_is_def_and_use(&self, index: usize) -> bool {
        self.implicit(index).is_def_and_use()
    }

    fn implicit(&self, index: usize) -> &ImplicitRef {
        match self.implicit_refs.get(index) {
            Some(r) => r,
            None => panic!(
                "implicit reference {} out of range ({} present)",
                index,
                self.implicit_refs.len()
            ),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// `(operand index, value, def/use)` for every operand that references a value
    pub fn value_operands(&self) -> impl Iterator<Item = (usize, ValueId, DefUse)> + '_ {
        self.operands
            .iter()
            .enumerate()
            .filter_map(|(i, op)| op.referenced_value().map(|v| (i, v, op.def_use())))
    }

    /// Registers mentioned by operands so far, in ascending order
    pub fn used_registers(&self) -> impl Iterator<Item = Reg> + '_ {
        self.used_regs.iter().copied()
    }

    /// True if any operand has mentioned `reg`
    pub fn uses_register(&self, reg: Reg) -> bool {
        self.used_regs.contains(&reg)
    }
}

impl fmt::Debug for MachineInstr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineInstr")
            .field("opcode", &self.opcode)
            .field("operands", &self.operands)
            .field("implicit_refs", &self.implicit_refs)
            .field("used_regs", &self.used_regs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{OpcodeDescriptor, OpcodeTable};
    use std::sync::Arc;

    const ADD: Opcode = Opcode(0);
    const STORE: Opcode = Opcode(1);
    const CALL: Opcode = Opcode(2);

    fn info() -> InstrInfoRef {
        let table: OpcodeTable = vec![
            OpcodeDescriptor::new("add", 3, Some(0)),
            OpcodeDescriptor::new("store", 2, None),
            OpcodeDescriptor::variadic("call", None),
        ]
        .into_iter()
        .collect();
        Arc::new(table)
    }

    #[test]
    fn test_fixed_arity_is_complete() {
        let mi = MachineInstr::new(info(), ADD);
        assert_eq!(mi.operand_count(), 3);
        assert!(mi.is_operand_list_complete());
        assert!(mi.operands().iter().all(|op| !op.is_set()));
    }

    #[test]
    fn test_explicit_arity_for_variadic() {
        let mi = MachineInstr::with_operand_count(info(), CALL, 4);
        assert_eq!(mi.operand_count(), 4);
        assert!(!mi.is_operand_list_complete());
    }

    #[test]
    #[should_panic(expected = "variable arity")]
    fn test_fixed_arity_rejects_variadic() {
        MachineInstr::new(info(), CALL);
    }

    #[test]
    fn test_reserve_only_starts_empty() {
        let mi = MachineInstr::with_capacity(info(), STORE, 2);
        assert_eq!(mi.operand_count(), 0);
        assert!(!mi.is_operand_list_complete());
    }

    #[test]
    fn test_result_position_forces_def() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_value_operand(0, OperandKind::VirtualRegisterRef, ValueId(0), false, false);
        mi.set_value_operand(1, OperandKind::VirtualRegisterRef, ValueId(1), false, false);
        mi.set_value_operand(2, OperandKind::VirtualRegisterRef, ValueId(2), true, false);

        assert_eq!(mi.operand(0).def_use(), DefUse::Def);
        assert_eq!(mi.operand(1).def_use(), DefUse::Use);
        assert_eq!(mi.operand(2).def_use(), DefUse::Def);
    }

    #[test]
    fn test_def_and_use_flag() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_value_operand(0, OperandKind::VirtualRegisterRef, ValueId(0), false, true);
        assert!(mi.operand_is_def_and_use(0));
        assert!(mi.operand_is_defined(0));
    }

    #[test]
    fn test_set_register_operand_tracks_register() {
        let mut mi = MachineInstr::new(info(), STORE);
        mi.set_register_operand(1, Reg(5), false);
        assert!(mi.operand(1).is_used());
        assert_eq!(mi.operand(1).machine_register_number(), Reg(5));
        assert!(mi.uses_register(Reg(5)));
    }

    #[test]
    fn test_set_immediate_operand() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_immediate_operand(2, OperandKind::SignExtendedImmediate, -8);
        assert_eq!(mi.operand(2).immediate_value(), -8);
        assert!(mi.operand(2).is_used());
    }

    #[test]
    #[should_panic(expected = "cannot be the defined result")]
    fn test_immediate_at_result_position_panics() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_immediate_operand(0, OperandKind::UnsignedImmediate, 1);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_setter_index_out_of_range_panics() {
        let mut mi = MachineInstr::new(info(), STORE);
        mi.set_register_operand(2, Reg(1), false);
    }

    #[test]
    #[should_panic(expected = "do not reference a value")]
    fn test_value_setter_rejects_immediate_kind() {
        let mut mi = MachineInstr::new(info(), STORE);
        mi.set_value_operand(0, OperandKind::SignExtendedImmediate, ValueId(0), false, false);
    }

    #[test]
    fn test_bind_register_for_operand() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_value_operand(1, OperandKind::VirtualRegisterRef, ValueId(1), false, false);
        mi.bind_register_for_operand(1, Reg(7));

        assert_eq!(mi.operand(1).allocated_register(), Some(Reg(7)));
        assert!(mi.uses_register(Reg(7)));
        assert_eq!(mi.used_registers().collect::<Vec<_>>(), vec![Reg(7)]);
    }

    #[test]
    fn test_replace_resets_operands() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_register_operand(1, Reg(3), false);
        mi.replace(STORE, 2);

        assert_eq!(mi.opcode(), STORE);
        assert_eq!(mi.operand_count(), 2);
        assert!(mi.operands().iter().all(|op| !op.is_set()));
        // the register cache is never pruned
        assert!(mi.uses_register(Reg(3)));
    }

    #[test]
    #[should_panic(expected = "implicit references")]
    fn test_replace_with_implicit_refs_panics() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.add_implicit_ref(ValueId(0), DefUse::Use);
        mi.replace(STORE, 2);
    }

    #[test]
    fn test_append_builders() {
        let mut mi = MachineInstr::with_capacity(info(), STORE, 2);
        mi.add_machine_register_operand(Reg(10), DefUse::Use)
            .add_signed_immediate(-16);

        assert_eq!(mi.operand_count(), 2);
        assert!(mi.is_operand_list_complete());
        assert!(mi.uses_register(Reg(10)));
        assert_eq!(mi.operand(1).kind(), Some(OperandKind::SignExtendedImmediate));
    }

    #[test]
    #[should_panic(expected = "already has its 2 operands")]
    fn test_append_past_arity_panics() {
        let mut mi = MachineInstr::with_capacity(info(), STORE, 2);
        mi.add_unsigned_immediate(1)
            .add_unsigned_immediate(2)
            .add_unsigned_immediate(3);
    }

    #[test]
    fn test_append_at_result_position_defines() {
        let mut mi = MachineInstr::with_capacity(info(), ADD, 3);
        mi.add_register_operand(ValueId(0), DefUse::Use)
            .add_register_operand(ValueId(1), DefUse::Use)
            .add_signed_immediate(4);

        assert_eq!(mi.operand(0).def_use(), DefUse::Def);
        assert_eq!(mi.operand(1).def_use(), DefUse::Use);
        assert_eq!(mi.operand(2).def_use(), DefUse::Use);
    }

    #[test]
    fn test_append_at_result_position_keeps_def_and_use() {
        let mut mi = MachineInstr::with_capacity(info(), ADD, 3);
        mi.add_machine_register_operand(Reg(3), DefUse::DefAndUse);
        assert!(mi.operand_is_def_and_use(0));
    }

    #[test]
    #[should_panic(expected = "cannot be the defined result")]
    fn test_append_immediate_at_result_position_panics() {
        let mut mi = MachineInstr::with_capacity(info(), ADD, 3);
        mi.add_unsigned_immediate(7);
    }

    #[test]
    fn test_variadic_append_never_complete() {
        let mut mi = MachineInstr::with_capacity(info(), CALL, 0);
        for i in 0..6 {
            mi.add_register_operand(ValueId(i), DefUse::Use);
        }
        mi.add_pc_displacement(ValueId(9))
            .add_cc_register_operand(ValueId(10), DefUse::Def);
        assert_eq!(mi.operand_count(), 8);
        assert!(!mi.is_operand_list_complete());
    }

    #[test]
    fn test_implicit_ref_accessors() {
        let mut mi = MachineInstr::with_capacity(info(), CALL, 0);
        mi.add_implicit_ref(ValueId(1), DefUse::Use)
            .add_implicit_ref(ValueId(2), DefUse::Def)
            .add_implicit_ref(ValueId(3), DefUse::DefAndUse);

        assert_eq!(mi.implicit_ref_count(), 3);
        assert_eq!(mi.implicit_ref(1), ValueId(2));
        assert!(!mi.implicit_ref_is_defined(0));
        assert!(mi.implicit_ref_is_used(0));
        assert!(mi.implicit_ref_is_defined(1));
        assert!(!mi.implicit_ref_is_def_and_use(1));
        assert!(mi.implicit_ref_is_def_and_use(2));
        // implicit references are not operands
        assert_eq!(mi.operand_count(), 0);
    }

    #[test]
    fn test_value_operands_skip_registers_and_immediates() {
        let mut mi = MachineInstr::new(info(), ADD);
        mi.set_value_operand(0, OperandKind::VirtualRegisterRef, ValueId(4), false, false);
        mi.set_register_operand(1, Reg(2), false);
        mi.set_immediate_operand(2, OperandKind::SignExtendedImmediate, 3);

        let vals: Vec<_> = mi.value_operands().collect();
        assert_eq!(vals, vec![(0, ValueId(4), DefUse::Def)]);
    }

    #[test]
    fn test_address_modifier() {
        let mut mi = MachineInstr::new(info(), STORE);
        mi.set_value_operand(1, OperandKind::PCRelativeDisplacement, ValueId(0), false, false);
        mi.set_address_modifier(1, Some(AddressModifier::HighBits64));
        assert_eq!(
            mi.operand(1).address_modifier(),
            Some(AddressModifier::HighBits64)
        );
    }
}
