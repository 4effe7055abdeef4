//! Class-metadata table parsing (spec.md §4.1).
//!
//! Layout: `u32 classCount`, then per class: 1-byte name length, name
//! bytes, `i32` superclass index (-1 = none), `u32` field count, then per
//! field {1-byte name length, name bytes, 1-byte type}, then `u32` method
//! count, then per method {1-byte name length, name bytes, `u32` bytecode
//! offset}. The cursor must land exactly on the slice end.

use crate::class::{ClassInfo, ClassRegistry, FieldInfo, MethodInfo};
use crate::error::LoaderError;
use crate::opcode::FieldType;

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn u8(&mut self) -> Result<u8, LoaderError> {
        let byte = *self
            .buf
            .get(self.pos)
            .ok_or(LoaderError::MalformedMetadata("unexpected end of metadata"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn u32(&mut self) -> Result<u32, LoaderError> {
        if self.pos + 4 > self.buf.len() {
            return Err(LoaderError::MalformedMetadata("unexpected end of metadata"));
        }
        let bytes = [
            self.buf[self.pos],
            self.buf[self.pos + 1],
            self.buf[self.pos + 2],
            self.buf[self.pos + 3],
        ];
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    fn name(&mut self) -> Result<String, LoaderError> {
        let len = self.u8()? as usize;
        if self.pos + len > self.buf.len() {
            return Err(LoaderError::MalformedMetadata(
                "name exceeds metadata bounds",
            ));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| LoaderError::MalformedMetadata("class/field/method name is not ASCII"))
    }
}

/// Parse the class-metadata section into `registry`. Superclass indices
/// refer to position within this same table, so every class is first
/// parsed with a raw `i32` and only resolved to `Option<usize>` once all
/// classes are known (§4.2: indices address the binary's class table
/// directly, not a name lookup).
pub(super) fn parse_into(buf: &[u8], registry: &mut ClassRegistry) -> Result<(), LoaderError> {
    let mut cursor = Cursor::new(buf);
    let class_count = cursor.u32()?;

    let mut raw_classes = Vec::with_capacity(class_count as usize);
    for _ in 0..class_count {
        let name = cursor.name()?;
        let superclass_raw = cursor.u32()? as i32;

        let field_count = cursor.u32()?;
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            let field_name = cursor.name()?;
            let ty_byte = cursor.u8()?;
            let ty = FieldType::decode(ty_byte)
                .ok_or(LoaderError::MalformedMetadata("unknown field type tag"))?;
            fields.push(FieldInfo {
                name: field_name,
                ty,
            });
        }

        let method_count = cursor.u32()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            let method_name = cursor.name()?;
            let entry_point = cursor.u32()?;
            methods.push(MethodInfo {
                name: method_name,
                entry_point,
                is_virtual: true,
            });
        }

        raw_classes.push((name, superclass_raw, fields, methods));
    }

    if cursor.pos != buf.len() {
        return Err(LoaderError::MalformedMetadata(
            "cursor did not land on metadata end",
        ));
    }

    for (name, superclass_raw, fields, methods) in raw_classes {
        let superclass = if superclass_raw < 0 {
            None
        } else {
            let idx = superclass_raw as usize;
            if idx >= class_count as usize {
                return Err(LoaderError::MalformedMetadata(
                    "superclass index out of range",
                ));
            }
            Some(idx)
        };
        registry.register(ClassInfo {
            name,
            superclass,
            fields,
            methods,
            field_offsets: Vec::new(),
            object_size: 0,
            vtable: Vec::new(),
        });
    }

    Ok(())
}
