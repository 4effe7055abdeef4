//! Object-model opcodes (spec.md §4.6 "Object model"), grounded on the
//! teacher's `contract.rs` — code that resolves a reference, looks up
//! metadata through it, and reads/writes storage at a computed offset —
//! generalized here from contract state to class instances and v-tables.

use crate::error::{BoundsKind, Fault};
use crate::host::Host;
use crate::value::{index_to_word, word_to_index};

use super::Interpreter;

impl<H: Host> Interpreter<H> {
    pub(super) fn op_new(&mut self) -> Result<(), Fault> {
        let class_idx = self.fetch_u8()? as usize;
        let class = self
            .classes
            .get(class_idx)
            .ok_or_else(|| Fault::bounds(BoundsKind::Class, class_idx, self.classes.len()))?;
        let idx = self.heap.allocate_object(class_idx, class.fields.len());
        self.frame.push(index_to_word(idx))
    }

    pub(super) fn op_getfield(&mut self) -> Result<(), Fault> {
        let field_idx = self.fetch_u8()? as usize;
        let obj_ref = word_to_index(self.frame.pop()?);
        let (_, fields) = self.heap.object(obj_ref)?;
        let value = fields
            .get(field_idx)
            .copied()
            .ok_or_else(|| Fault::bounds(BoundsKind::Field, field_idx, fields.len()))?;
        self.frame.push(value)
    }

    pub(super) fn op_putfield(&mut self) -> Result<(), Fault> {
        let field_idx = self.fetch_u8()? as usize;
        let value = self.frame.pop()?;
        let obj_ref = word_to_index(self.frame.pop()?);
        let (_, fields) = self.heap.object_mut(obj_ref)?;
        let len = fields.len();
        let slot = fields
            .get_mut(field_idx)
            .ok_or(Fault::bounds(BoundsKind::Field, field_idx, len))?;
        *slot = value;
        Ok(())
    }

    pub(super) fn op_invoke_virtual(&mut self) -> Result<(), Fault> {
        let vtable_idx = self.fetch_u32()? as usize;
        let arg_count = self.fetch_u8()?;
        // The object reference is consumed here, not passed as an implicit
        // `this` argument to the callee (spec.md §9 open question 4 — this
        // spec freezes "consume, do not pass").
        let obj_ref = word_to_index(self.frame.pop()?);
        let (class_idx, _) = self.heap.object(obj_ref)?;
        let class = self.classes.get(class_idx).expect("heap object references a registered class");
        let slot = class
            .vtable
            .get(vtable_idx)
            .copied()
            .ok_or_else(|| Fault::bounds(BoundsKind::Vtable, vtable_idx, class.vtable.len()))?;
        let method_class = self.classes.get(slot.class).expect("vtable entry references a registered class");
        let entry_point = method_class.methods[slot.method].entry_point;

        let return_ip = self.ip;
        self.frame.enter_call(return_ip, arg_count)?;
        self.ip = entry_point;
        Ok(())
    }
}
