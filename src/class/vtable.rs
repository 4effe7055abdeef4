//! V-table construction.
//!
//! Mirrors `ObjectFactory_buildVTable`/`ObjectFactory_buildAllVTables`: a
//! class inherits its superclass's v-table, then each of its own virtual
//! methods either overrides an inherited slot of the same name or is
//! appended as a new slot. The original C recurses into the superclass
//! without cycle protection, so a malformed superclass chain loops
//! forever; this builds the same table with explicit three-color
//! (white/grey/black) cycle detection instead.

use crate::error::LoaderError;

use super::{ClassInfo, VtableEntry};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Grey,
    Black,
}

/// Build v-tables for every class in `classes`, resolving superclass
/// links depth-first. A class whose v-table is already non-empty (a
/// prior call already built it) is left untouched.
pub(super) fn build_all(classes: &mut [ClassInfo]) -> Result<(), LoaderError> {
    let mut marks = vec![Mark::White; classes.len()];
    for idx in 0..classes.len() {
        if marks[idx] == Mark::White {
            build_one(classes, &mut marks, idx)?;
        }
    }
    Ok(())
}

fn build_one(classes: &mut [ClassInfo], marks: &mut [Mark], idx: usize) -> Result<(), LoaderError> {
    match marks[idx] {
        Mark::Black => return Ok(()),
        Mark::Grey => {
            return Err(LoaderError::MalformedMetadata(
                "cycle detected in superclass chain",
            ))
        }
        Mark::White => {}
    }
    if !classes[idx].vtable.is_empty() {
        // Already built by an earlier `build_vtables` call — the original
        // factory's "build only if not yet built" guard.
        marks[idx] = Mark::Black;
        return Ok(());
    }
    marks[idx] = Mark::Grey;

    let mut vtable = if let Some(super_idx) = classes[idx].superclass {
        build_one(classes, marks, super_idx)?;
        classes[super_idx].vtable.clone()
    } else {
        Vec::new()
    };

    for (method_idx, method) in classes[idx].methods.iter().enumerate() {
        if !method.is_virtual {
            continue;
        }
        let overridden = vtable
            .iter_mut()
            .find(|slot| classes[slot.class].methods[slot.method].name == method.name);
        match overridden {
            Some(slot) => {
                slot.class = idx;
                slot.method = method_idx;
            }
            None => vtable.push(VtableEntry {
                class: idx,
                method: method_idx,
            }),
        }
    }

    classes[idx].vtable = vtable;
    marks[idx] = Mark::Black;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::MethodInfo;

    fn class(name: &str, superclass: Option<usize>, methods: Vec<MethodInfo>) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            superclass,
            fields: Vec::new(),
            methods,
            field_offsets: Vec::new(),
            object_size: 0,
            vtable: Vec::new(),
        }
    }

    fn method(name: &str, entry_point: u32, is_virtual: bool) -> MethodInfo {
        MethodInfo {
            name: name.to_string(),
            entry_point,
            is_virtual,
        }
    }

    #[test]
    fn override_replaces_inherited_slot() {
        let mut classes = vec![
            class("Base", None, vec![method("speak", 0x10, true)]),
            class("Derived", Some(0), vec![method("speak", 0x20, true)]),
        ];
        build_all(&mut classes).unwrap();
        assert_eq!(classes[0].vtable.len(), 1);
        assert_eq!(classes[1].vtable.len(), 1);
        let slot = classes[1].vtable[0];
        assert_eq!(slot.class, 1);
        assert_eq!(classes[slot.class].methods[slot.method].entry_point, 0x20);
    }

    #[test]
    fn new_virtual_method_appends() {
        let mut classes = vec![
            class("Base", None, vec![method("speak", 0x10, true)]),
            class("Derived", Some(0), vec![method("fly", 0x20, true)]),
        ];
        build_all(&mut classes).unwrap();
        assert_eq!(classes[1].vtable.len(), 2);
    }

    #[test]
    fn non_virtual_methods_are_never_slotted() {
        let mut classes = vec![class("Base", None, vec![method("helper", 0x10, false)])];
        build_all(&mut classes).unwrap();
        assert!(classes[0].vtable.is_empty());
    }

    #[test]
    fn cycle_is_rejected() {
        let mut classes = vec![
            class("A", Some(1), Vec::new()),
            class("B", Some(0), Vec::new()),
        ];
        assert!(build_all(&mut classes).is_err());
    }

    #[test]
    fn second_build_all_call_is_a_no_op() {
        let mut classes = vec![
            class("Base", None, vec![method("speak", 0x10, true)]),
            class("Derived", Some(0), vec![method("speak", 0x20, true)]),
        ];
        build_all(&mut classes).unwrap();
        let before = classes[1].vtable.clone();

        // A second call must leave already-built v-tables untouched rather
        // than silently redoing the walk.
        build_all(&mut classes).unwrap();
        assert_eq!(classes[1].vtable, before);
    }
}
