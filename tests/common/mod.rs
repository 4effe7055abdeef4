//! Shared test-binary assembler.
//!
//! Builds the little-endian binary format of spec.md §4.1 by hand — a
//! `CodeBuilder` for the instruction stream and a `class_metadata_bytes`
//! helper for the class table, both byte-exact with the format the loader
//! parses. No opcode symbolic assembler exists in the crate itself (the
//! binary format's producer is out of scope per spec.md §1), so tests
//! build binaries the same way the spec's own worked scenarios describe
//! them: by opcode and operand.

#![allow(dead_code)]

use stackvm::consts::{HEADER_SIZE, MAGIC};
use stackvm::loader::{self, LoadedImage};
use stackvm::opcode::FieldType;

/// Accumulates a code segment one instruction at a time.
#[derive(Default)]
pub struct CodeBuilder {
    pub bytes: Vec<u8>,
}

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn op(&mut self, byte: u8) -> &mut Self {
        self.bytes.push(byte);
        self
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.u32(v as u32)
    }

    pub fn push(&mut self, v: i32) -> &mut Self {
        self.op(0x10).i32(v)
    }

    pub fn fpush(&mut self, v: f32) -> &mut Self {
        self.op(0x14).u32(v.to_bits())
    }

    pub fn pad_to(&mut self, offset: usize) -> &mut Self {
        while self.bytes.len() < offset {
            self.bytes.push(0);
        }
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

/// One field/method declaration for [`class_metadata_bytes`].
pub struct ClassDecl<'a> {
    pub name: &'a str,
    pub superclass: i32,
    pub fields: Vec<(&'a str, FieldType)>,
    pub methods: Vec<(&'a str, u32)>,
}

/// Encode the class-metadata section described by spec.md §4.1.
pub fn class_metadata_bytes(classes: &[ClassDecl]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&(classes.len() as u32).to_le_bytes());
    for class in classes {
        buf.push(class.name.len() as u8);
        buf.extend_from_slice(class.name.as_bytes());
        buf.extend_from_slice(&(class.superclass as u32).to_le_bytes());
        buf.extend_from_slice(&(class.fields.len() as u32).to_le_bytes());
        for (name, ty) in &class.fields {
            buf.push(name.len() as u8);
            buf.extend_from_slice(name.as_bytes());
            buf.push(*ty as u8);
        }
        buf.extend_from_slice(&(class.methods.len() as u32).to_le_bytes());
        for (name, entry_point) in &class.methods {
            buf.push(name.len() as u8);
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(&entry_point.to_le_bytes());
        }
    }
    buf
}

/// Assemble a full binary image: header + code + (optional) class
/// metadata + (optional) globals, then load it.
pub struct ImageBuilder {
    entry_point: u32,
    code: Vec<u8>,
    classes: Vec<u8>,
    globals: Vec<u32>,
}

impl ImageBuilder {
    pub fn new(code: Vec<u8>) -> Self {
        Self {
            entry_point: 0,
            code,
            classes: Vec::new(),
            globals: Vec::new(),
        }
    }

    pub fn entry_point(mut self, offset: u32) -> Self {
        self.entry_point = offset;
        self
    }

    pub fn classes(mut self, classes: Vec<u8>) -> Self {
        self.classes = classes;
        self
    }

    pub fn globals(mut self, globals: Vec<u32>) -> Self {
        self.globals = globals;
        self
    }

    pub fn raw_bytes(&self) -> Vec<u8> {
        let globals_bytes: Vec<u8> = self.globals.iter().flat_map(|w| w.to_le_bytes()).collect();

        let code_offset = HEADER_SIZE;
        let globals_offset = code_offset + self.code.len();
        let class_offset = globals_offset + globals_bytes.len();

        let mut buf = vec![0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&1u32.to_le_bytes());
        buf[8..12].copy_from_slice(&self.entry_point.to_le_bytes());
        buf[12..16].copy_from_slice(&0u32.to_le_bytes()); // const pool offset
        buf[16..20].copy_from_slice(&0u32.to_le_bytes()); // const pool size
        buf[20..24].copy_from_slice(&(code_offset as u32).to_le_bytes());
        buf[24..28].copy_from_slice(&(self.code.len() as u32).to_le_bytes());
        buf[28..32].copy_from_slice(&(globals_offset as u32).to_le_bytes());
        buf[32..36].copy_from_slice(&(globals_bytes.len() as u32).to_le_bytes());
        buf[36..40].copy_from_slice(&(class_offset as u32).to_le_bytes());
        buf[40..44].copy_from_slice(&(self.classes.len() as u32).to_le_bytes());

        buf.extend_from_slice(&self.code);
        buf.extend_from_slice(&globals_bytes);
        buf.extend_from_slice(&self.classes);
        buf
    }

    pub fn load(&self) -> LoadedImage {
        loader::load(&self.raw_bytes()).expect("image should load")
    }
}
