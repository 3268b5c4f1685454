//! # Machine Instruction Integration Tests
//!
//! End-to-end behaviour of construction, mutation, substitution and
//! rendering through the public API.

use machinst::machine::{format_block, DefUse, MachineBasicBlock, MachineInstr, OperandKind};
use machinst::target::sbpf::{self, SbpfOp, SbpfReg};
use machinst::{
    InstrInfo, Opcode, OpcodeDescriptor, OpcodeTable, Reg, Target, TargetDescription, ValueKind,
    ValueTable,
};
use std::sync::Arc;

/// Two-operand opcode whose operand 0 is the result, plus a variadic call
fn toy_target() -> Target {
    let json = r#"{
        "name": "toy",
        "first_virtual_register": 32,
        "registers": ["g0", "g1", "g2", "g3", "g4", "g5", "g6", "g7"],
        "opcodes": [
            { "name": "op2", "operand_count": 2, "result_position": 0 },
            { "name": "call", "operand_count": -1 },
            { "name": "st", "operand_count": 3 }
        ]
    }"#;
    TargetDescription::from_json(json)
        .unwrap()
        .into_target()
        .unwrap()
}

const OP2: Opcode = Opcode(0);
const CALL: Opcode = Opcode(1);
const ST: Opcode = Opcode(2);

#[test]
fn test_fixed_arity_construction_is_complete() {
    let target = toy_target();
    for opcode in [OP2, ST] {
        let n = target.instr_info().descriptor(opcode).fixed_arity().unwrap();
        let mi = MachineInstr::new(target.instr_info().clone(), opcode);
        assert_eq!(mi.operand_count(), n);
        assert!(mi.is_operand_list_complete());
    }
}

#[test]
fn test_reserve_only_construction_is_empty() {
    let target = toy_target();
    for capacity in [0, 1, 16] {
        let mi = MachineInstr::with_capacity(target.instr_info().clone(), ST, capacity);
        assert_eq!(mi.operand_count(), 0);
    }
}

#[test]
#[should_panic(expected = "cannot be the defined result")]
fn test_immediate_at_result_position_is_fatal() {
    let target = toy_target();
    let mut mi = MachineInstr::new(target.instr_info().clone(), OP2);
    mi.set_immediate_operand(0, OperandKind::SignExtendedImmediate, 0);
}

#[test]
fn test_append_builders_follow_result_position() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let x = values.add("x", ValueKind::Instruction);
    let y = values.add("y", ValueKind::Instruction);

    let mut appended = MachineInstr::with_capacity(target.instr_info().clone(), OP2, 2);
    appended
        .add_register_operand(x, DefUse::Use)
        .add_register_operand(y, DefUse::Use);

    let mut set = MachineInstr::new(target.instr_info().clone(), OP2);
    set.set_value_operand(0, OperandKind::VirtualRegisterRef, x, false, false);
    set.set_value_operand(1, OperandKind::VirtualRegisterRef, y, false, false);

    assert!(appended.operand_is_defined(0));
    assert!(!appended.operand_is_defined(1));
    assert_eq!(appended.operands(), set.operands());
    assert_eq!(
        appended.display(&values).to_string(),
        "op2\t%reg(val x)<def>\t%reg(val y)"
    );
}

#[test]
#[should_panic(expected = "cannot be the defined result")]
fn test_appended_immediate_at_result_position_is_fatal() {
    let target = sbpf::target();
    let mut mi = MachineInstr::with_capacity(target.instr_info().clone(), SbpfOp::Mov.opcode(), 2);
    mi.add_signed_immediate(7);
}

#[test]
fn test_unnamed_physical_register_renders_by_number() {
    let target = toy_target();
    let values = ValueTable::new();
    let mut mi = MachineInstr::new(target.instr_info().clone(), ST);
    mi.set_register_operand(0, Reg(3), false);
    mi.set_register_operand(1, Reg(20), false);
    mi.set_register_operand(2, Reg(32), false);

    assert_eq!(
        mi.display_with(&values, &target).to_string(),
        "st\t%g3\t%mreg(20)\t%reg32"
    );
}

#[test]
fn test_context_free_implicit_refs() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let f = values.add("f", ValueKind::Function);
    let acc = values.add("acc", ValueKind::Instruction);
    let out = values.add("out", ValueKind::Instruction);

    let mut mi = MachineInstr::with_capacity(target.instr_info().clone(), CALL, 2);
    mi.add_pc_displacement(f)
        .add_register_operand(acc, DefUse::DefAndUse)
        .add_implicit_ref(out, DefUse::Def)
        .add_implicit_ref(acc, DefUse::Use);

    let expected = "call\t%disp(label f)\t%reg(val acc)<def&use>\tImplicitRefs: \t(val out)<def>\t(val acc)";
    assert_eq!(mi.display(&values).to_string(), expected);
    assert_eq!(mi.display_with(&values, &target).to_string(), expected);
}

#[test]
fn test_substitution_counts_and_idempotence() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let a = values.add("a", ValueKind::Instruction);
    let b = values.add("b", ValueKind::Instruction);

    let build = || {
        let mut mi = MachineInstr::with_capacity(target.instr_info().clone(), CALL, 2);
        mi.add_register_operand(a, DefUse::Use)
            .add_register_operand(a, DefUse::Def)
            .add_implicit_ref(a, DefUse::Use);
        mi
    };

    let mut all = build();
    assert_eq!(all.substitute_value(a, b, false), 3);
    assert!(all.value_operands().all(|(_, v, _)| v == b));
    assert_eq!(all.implicit_ref(0), b);
    assert_eq!(all.substitute_value(a, b, false), 0);

    let mut defs = build();
    assert_eq!(defs.substitute_value(a, b, true), 1);
    assert_eq!(defs.operand(0).referenced_value(), Some(a));
    assert_eq!(defs.operand(1).referenced_value(), Some(b));
    assert_eq!(defs.implicit_ref(0), a);
}

#[test]
fn test_substitution_is_local_to_one_instruction() {
    let target = sbpf::target();
    let mut values = ValueTable::new();
    let a = values.add("a", ValueKind::Instruction);
    let b = values.add("b", ValueKind::Instruction);

    let mut block = MachineBasicBlock::new("entry");
    for _ in 0..2 {
        block
            .build_at_end(target.instr_info().clone(), SbpfOp::Mov.opcode(), 2)
            .add_register_operand(a, DefUse::Def)
            .add_signed_immediate(1);
    }

    let first = block.get_mut(0).unwrap();
    assert_eq!(first.substitute_value(a, b, false), 1);
    assert_eq!(block.get(1).unwrap().operand(0).referenced_value(), Some(a));
}

#[test]
fn test_rendering_is_deterministic() {
    let target = sbpf::target();
    let mut values = ValueTable::new();
    let x = values.add("x", ValueKind::Instruction);
    let f = values.add("helper", ValueKind::Function);

    let mut mi = MachineInstr::with_capacity(target.instr_info().clone(), SbpfOp::Call.opcode(), 3);
    mi.add_pc_displacement(f)
        .add_register_operand(x, DefUse::Use)
        .add_machine_register_operand(SbpfReg::R1.into(), DefUse::Use)
        .add_implicit_ref(x, DefUse::Def);

    let first = mi.display_with(&values, &target).to_string();
    let second = mi.display_with(&values, &target).to_string();
    assert_eq!(first, second);
    assert_eq!(mi.display(&values).to_string(), mi.display(&values).to_string());
}

#[test]
fn test_bind_register_reports_used_register() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let v = values.add("v", ValueKind::Argument);

    let mut mi = MachineInstr::new(target.instr_info().clone(), OP2);
    mi.set_value_operand(1, OperandKind::VirtualRegisterRef, v, false, false);
    mi.bind_register_for_operand(1, Reg(40));
    assert!(mi.uses_register(Reg(40)));
    assert!(mi.used_registers().any(|r| r == Reg(40)));
}

#[test]
fn test_end_to_end_result_from_descriptor() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let v = values.add("v", ValueKind::Instruction);

    let mut mi = MachineInstr::new(target.instr_info().clone(), OP2);
    assert_eq!(mi.operand_count(), 2);

    mi.set_value_operand(0, OperandKind::VirtualRegisterRef, v, false, false);
    assert!(!mi.operand(0).has_allocated_register());
    assert!(mi.operand(0).is_defined());

    mi.set_register_operand(1, Reg(5), false);
    assert!(mi.operand(1).is_used());
    assert!(!mi.operand(1).is_defined());
    assert!(mi.uses_register(Reg(5)));

    assert_eq!(
        mi.display_with(&values, &target).to_string(),
        "op2\t%reg(val v)<def>\t%g5"
    );
    assert_eq!(mi.display(&values).to_string(), "op2\t%reg(val v)<def>\t%mreg(5)");
}

#[test]
fn test_replace_then_refill() {
    let target = toy_target();
    let mut values = ValueTable::new();
    let v = values.add("v", ValueKind::Instruction);

    let mut mi = MachineInstr::new(target.instr_info().clone(), OP2);
    mi.set_value_operand(0, OperandKind::VirtualRegisterRef, v, false, false);
    mi.replace(ST, 3);

    assert_eq!(mi.opcode(), ST);
    assert!(mi.is_operand_list_complete());
    mi.set_value_operand(0, OperandKind::VirtualRegisterRef, v, false, false);
    // st has no result position
    assert!(!mi.operand(0).is_defined());
}

#[test]
fn test_two_targets_coexist() {
    let sbpf_target = sbpf::target();
    let toy = toy_target();

    let a = MachineInstr::new(sbpf_target.instr_info().clone(), SbpfOp::Exit.opcode());
    let b = MachineInstr::new(toy.instr_info().clone(), OP2);
    assert_eq!(a.operand_count(), 0);
    assert_eq!(b.operand_count(), 2);
    assert_eq!(a.descriptor().name, "exit");
    assert_eq!(b.descriptor().name, "op2");
}

#[test]
fn test_custom_descriptor_table() {
    let table: OpcodeTable = vec![OpcodeDescriptor::new("nop", 0, None)].into_iter().collect();
    let info: Arc<dyn InstrInfo + Send + Sync> = Arc::new(table);
    let mi = MachineInstr::new(info, Opcode(0));
    assert!(mi.is_operand_list_complete());
}

#[test]
fn test_block_listing_with_sbpf_target() {
    let target = sbpf::target();
    let mut values = ValueTable::new();
    let ptr = values.add("ptr", ValueKind::Argument);
    let val = values.add("val", ValueKind::Instruction);

    let mut block = MachineBasicBlock::new("store");
    let st = block.build_at_end(target.instr_info().clone(), SbpfOp::Stxdw.opcode(), 3);
    st.add_register_operand(ptr, DefUse::Use)
        .add_signed_immediate(8)
        .add_register_operand(val, DefUse::Use);
    st.bind_register_for_operand(0, SbpfReg::R1.into());
    st.bind_register_for_operand(2, SbpfReg::R2.into());
    block.build_at_end(target.instr_info().clone(), SbpfOp::Exit.opcode(), 0);

    let listing = format_block(&block, &values, Some(&target));
    assert_eq!(
        listing,
        "store:\n0000: stxdw\t%reg(val ptr)==%r1\t8\t%reg(val val)==%r2\n0001: exit\n"
    );
}
