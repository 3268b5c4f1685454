//! Value substitution
//!
//! Retargets references after value renumbering or coalescing. Only the
//! referenced value changes; def/use, allocation and modifiers stay.

use super::instruction::MachineInstr;
use crate::value::ValueId;

impl MachineInstr {
    /// Replace every reference to `old` with `new` in the explicit operands
    /// and then the implicit references. With `defs_only`, only entries that
    /// define the value are rewritten. Returns the number of rewrites.
    pub fn substitute_value(&mut self, old: ValueId, new: ValueId, defs_only: bool) -> usize {
        let mut count = 0;

        for op in &mut self.operands {
            if op.referenced_value() == Some(old) && (!defs_only || op.is_defined()) {
                op.retarget(new);
                count += 1;
            }
        }

        for imp in &mut self.implicit_refs {
            if imp.value() == old && (!defs_only || imp.is_defined()) {
                imp.retarget(new);
                count += 1;
            }
        }

        tracing::trace!(%old, %new, defs_only, count, "substituted value");
        count
    }
}
