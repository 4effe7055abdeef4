//! Class metadata: fields, methods, layout and v-tables.

mod registry;
mod vtable;

pub use registry::ClassRegistry;

use crate::opcode::FieldType;

/// A single declared field: name, declared type, and (once layout is
/// computed) its byte offset within an instance's field storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Field name as it appears in the class-metadata table.
    pub name: String,
    /// Declared type.
    pub ty: FieldType,
}

/// A single declared method: name, and whether it participates in virtual
/// dispatch (non-virtual methods never enter a v-table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    /// Method name, used to resolve overriding during v-table construction.
    pub name: String,
    /// Entry point: byte offset into the code segment.
    pub entry_point: u32,
    /// Whether this method overrides/extends the v-table.
    pub is_virtual: bool,
}

/// A fully described class: its own fields and methods, a resolved
/// superclass link, a computed field-offset table, and (after
/// [`ClassRegistry::build_vtables`] runs) a resolved v-table.
///
/// Field layout is per-class only: a subclass's own fields are laid out
/// from offset 0 of *its* field storage, they do not follow the
/// superclass's fields in the same array. Field *inheritance* (which
/// fields an instance carries) is a heap-allocation concern, not a layout
/// one — see [`crate::heap`].
#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Class name.
    pub name: String,
    /// Index of the superclass in the owning [`ClassRegistry`], or `None`
    /// for a root class.
    pub superclass: Option<usize>,
    /// Fields declared directly on this class, in declaration order.
    pub fields: Vec<FieldInfo>,
    /// Methods declared directly on this class, in declaration order.
    pub methods: Vec<MethodInfo>,
    /// Byte offset of each field in `fields`, parallel to it.
    pub field_offsets: Vec<usize>,
    /// Total byte size of this class's own field storage.
    pub object_size: usize,
    /// Resolved v-table: one entry per virtual slot, each an index into
    /// `methods` of *some* class — populated by
    /// [`ClassRegistry::build_vtables`], empty before that runs.
    pub vtable: Vec<VtableEntry>,
}

/// One resolved v-table slot: which class declares the method currently
/// occupying the slot, and which of that class's `methods` it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VtableEntry {
    /// Index of the declaring class in the owning [`ClassRegistry`].
    pub class: usize,
    /// Index into that class's `methods`.
    pub method: usize,
}

impl ClassInfo {
    /// Compute `field_offsets` and `object_size` from `fields`, in
    /// declaration order, with no padding — mirrors the original C
    /// factory's linear layout.
    pub(crate) fn compute_layout(&mut self) {
        let mut offset = 0usize;
        self.field_offsets.clear();
        self.field_offsets.reserve(self.fields.len());
        for field in &self.fields {
            self.field_offsets.push(offset);
            offset += field.ty.size();
        }
        self.object_size = offset;
    }

    /// Find a declared field by name, returning its index into `fields`.
    pub fn find_field(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Find a declared method by name, returning its index into `methods`.
    pub fn find_method(&self, name: &str) -> Option<usize> {
        self.methods.iter().position(|m| m.name == name)
    }
}
