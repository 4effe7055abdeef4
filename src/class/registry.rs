use std::collections::HashMap;

use crate::error::LoaderError;

use super::{vtable, ClassInfo};

/// All classes known to a loaded binary, indexed both by position (as
/// referenced from bytecode operands) and by name (for loader-time
/// resolution of superclass references).
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassInfo>,
    by_name: HashMap<String, usize>,
}

impl ClassRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class, computing its field layout. The class's
    /// `superclass` field must already be resolved to an index into this
    /// registry (or `None`) by the caller — the loader resolves
    /// superclass-by-name before calling this.
    pub fn register(&mut self, mut class: ClassInfo) -> usize {
        class.compute_layout();
        let idx = self.classes.len();
        self.by_name.insert(class.name.clone(), idx);
        self.classes.push(class);
        idx
    }

    /// Look up a class index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Fetch a class by index.
    pub fn get(&self, index: usize) -> Option<&ClassInfo> {
        self.classes.get(index)
    }

    /// Number of registered classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no classes are registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Build the v-table for every registered class. Idempotent: a class
    /// whose v-table is already non-empty is skipped, matching the
    /// original factory's "build only if not yet built" guard — but
    /// cycles are detected explicitly here rather than left to recurse
    /// forever.
    pub fn build_vtables(&mut self) -> Result<(), LoaderError> {
        vtable::build_all(&mut self.classes)
    }

    /// Iterate over all registered classes with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ClassInfo)> {
        self.classes.iter().enumerate()
    }
}
