//! Debug utilities for inspecting machine code
//!
//! Listing helpers used while developing backend passes. The text has no
//! stability guarantee.

use super::block::MachineBasicBlock;
use super::instruction::MachineInstr;
use super::render::RenderContext;
use crate::target::Target;
use crate::value::ValueLookup;

fn context<'a>(values: &'a dyn ValueLookup, target: Option<&'a Target>) -> RenderContext<'a> {
    match target {
        Some(t) => RenderContext::with_target(values, t),
        None => RenderContext::new(values),
    }
}

/// Format a single instruction
pub fn format_machine_instr(
    mi: &MachineInstr,
    values: &dyn ValueLookup,
    target: Option<&Target>,
) -> String {
    mi.display_in(context(values, target)).to_string()
}

/// Format a block as a numbered listing
pub fn format_block(
    block: &MachineBasicBlock,
    values: &dyn ValueLookup,
    target: Option<&Target>,
) -> String {
    let ctx = context(values, target);
    let mut out = format!("{}:\n", block.label());
    for (i, mi) in block.iter().enumerate() {
        out.push_str(&format!("{:04}: {}\n", i, mi.display_in(ctx)));
    }
    out
}

/// Print a block in human-readable format
pub fn dump_block(block: &MachineBasicBlock, values: &dyn ValueLookup, target: Option<&Target>) {
    println!("═══════════════════════════════════════════════════════════");
    println!("                 MACHINE CODE DUMP");
    println!("═══════════════════════════════════════════════════════════");
    if let Some(t) = target {
        println!("Target: {}", t.name());
    }
    println!("Instructions: {}", block.len());
    println!("───────────────────────────────────────────────────────────");
    print!("{}", format_block(block, values, target));
    println!("═══════════════════════════════════════════════════════════\n");
}
