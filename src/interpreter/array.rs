//! Array opcodes (spec.md §4.6 "Arrays"). Every array slot in [`crate::heap`]
//! already holds a full [`crate::value::Word`] regardless of the element's
//! declared size (see `heap/mod.rs`'s doc comment); `ASTORE` truncates a
//! written `Word` to the element's real width so a later `ALOAD` reads back
//! only the bits a real byte-packed array would have kept.

use crate::error::{BoundsKind, Fault};
use crate::host::Host;
use crate::opcode::FieldType;
use crate::value::{index_to_word, word_to_index};

use super::Interpreter;

impl<H: Host> Interpreter<H> {
    pub(super) fn op_newarray(&mut self) -> Result<(), Fault> {
        let ty_byte = self.fetch_u8()?;
        let ty = FieldType::decode(ty_byte)
            .ok_or_else(|| Fault::bounds(BoundsKind::Class, ty_byte as usize, 4))?;
        let len = word_to_index(self.frame.pop()?);
        let idx = self.heap.allocate_array(ty, len);
        self.frame.push(index_to_word(idx))
    }

    pub(super) fn op_aload(&mut self) -> Result<(), Fault> {
        let index = word_to_index(self.frame.pop()?);
        let array_ref = word_to_index(self.frame.pop()?);
        let (ty, data) = self.heap.array(array_ref)?;
        let value = data
            .get(index)
            .copied()
            .ok_or_else(|| Fault::bounds(BoundsKind::Array, index, data.len()))?;
        let value = match ty {
            // A stored CHAR only ever carries its low byte (see ASTORE
            // below); read it back through `i8` the way a `char`-typed
            // load on the reference platform sign-extends on access.
            FieldType::Char => ((value & 0xFF) as u8 as i8) as i32 as Word,
            FieldType::Int | FieldType::Object | FieldType::Float => value,
        };
        self.frame.push(value)
    }

    pub(super) fn op_astore(&mut self) -> Result<(), Fault> {
        let value = self.frame.pop()?;
        let index = word_to_index(self.frame.pop()?);
        let array_ref = word_to_index(self.frame.pop()?);
        let (ty, data) = self.heap.array_mut(array_ref)?;
        let len = data.len();
        let slot = data
            .get_mut(index)
            .ok_or(Fault::bounds(BoundsKind::Array, index, len))?;
        *slot = match ty {
            FieldType::Char => value & 0xFF,
            FieldType::Int | FieldType::Object | FieldType::Float => value,
        };
        Ok(())
    }
}
