//! Heap: append-only object/array storage.
//!
//! The original C factory prefixes each raw allocation with a class
//! pointer and never frees anything reachable from the VM; this replaces
//! the pointer-prefixed blob with a tagged [`HeapEntry`] so the interpreter
//! never has to reconstruct a type from raw bytes. The append-only,
//! never-reused-index discipline is kept exactly: `Heap` has no `free`.

use crate::error::{BoundsKind, Fault};
use crate::opcode::FieldType;
use crate::value::Word;

/// A single heap allocation: either a class instance or a typed array.
#[derive(Debug, Clone)]
pub enum HeapEntry {
    /// An instance of a registered class.
    Object {
        /// Index of the instantiated class in the owning `ClassRegistry`.
        class: usize,
        /// Field storage, one [`Word`] per declared field (CHAR fields
        /// still occupy a full word on the heap; only their source/array
        /// encoding is byte-sized).
        fields: Vec<Word>,
    },
    /// A fixed-length typed array.
    Array {
        /// Element type, fixed at allocation time.
        elem_type: FieldType,
        /// Element storage, one [`Word`] per element.
        data: Vec<Word>,
    },
}

/// The VM heap: a monotonically growing table of [`HeapEntry`] values,
/// addressed by their index. Indices are never reused or invalidated —
/// there is no garbage collector and no `free` (spec.md §3 Non-goals).
#[derive(Debug, Clone, Default)]
pub struct Heap {
    entries: Vec<HeapEntry>,
}

impl Heap {
    /// An empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a zero-initialized instance of `class`, returning its
    /// heap index.
    pub fn allocate_object(&mut self, class: usize, field_count: usize) -> usize {
        let idx = self.entries.len();
        self.entries.push(HeapEntry::Object {
            class,
            fields: vec![0; field_count],
        });
        idx
    }

    /// Allocate a zero-initialized array of `len` elements of type
    /// `elem_type`, returning its heap index.
    pub fn allocate_array(&mut self, elem_type: FieldType, len: usize) -> usize {
        let idx = self.entries.len();
        self.entries.push(HeapEntry::Array {
            elem_type,
            data: vec![0; len],
        });
        idx
    }

    /// Number of entries ever allocated.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have ever been allocated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, index: usize) -> Result<&HeapEntry, Fault> {
        self.entries
            .get(index)
            .ok_or_else(|| Fault::bounds(BoundsKind::Heap, index, self.entries.len()))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut HeapEntry, Fault> {
        let len = self.entries.len();
        self.entries
            .get_mut(index)
            .ok_or(Fault::bounds(BoundsKind::Heap, index, len))
    }

    /// Resolve `index` as an object, returning its class index and a
    /// shared reference to its field storage.
    pub fn object(&self, index: usize) -> Result<(usize, &[Word]), Fault> {
        match self.get(index)? {
            HeapEntry::Object { class, fields } => Ok((*class, fields.as_slice())),
            HeapEntry::Array { .. } => {
                Err(Fault::bounds(BoundsKind::Heap, index, self.entries.len()))
            }
        }
    }

    /// Resolve `index` as an object, returning its class index and a
    /// mutable reference to its field storage.
    pub fn object_mut(&mut self, index: usize) -> Result<(usize, &mut [Word]), Fault> {
        let len = self.entries.len();
        match self.get_mut(index)? {
            HeapEntry::Object { class, fields } => Ok((*class, fields.as_mut_slice())),
            HeapEntry::Array { .. } => Err(Fault::bounds(BoundsKind::Heap, index, len)),
        }
    }

    /// Resolve `index` as an array, returning its element type and a
    /// shared reference to its element storage.
    pub fn array(&self, index: usize) -> Result<(FieldType, &[Word]), Fault> {
        match self.get(index)? {
            HeapEntry::Array { elem_type, data } => Ok((*elem_type, data.as_slice())),
            HeapEntry::Object { .. } => {
                Err(Fault::bounds(BoundsKind::Heap, index, self.entries.len()))
            }
        }
    }

    /// Resolve `index` as an array, returning its element type and a
    /// mutable reference to its element storage.
    pub fn array_mut(&mut self, index: usize) -> Result<(FieldType, &mut [Word]), Fault> {
        let len = self.entries.len();
        match self.get_mut(index)? {
            HeapEntry::Array { elem_type, data } => Ok((*elem_type, data.as_mut_slice())),
            HeapEntry::Object { .. } => Err(Fault::bounds(BoundsKind::Heap, index, len)),
        }
    }
}
