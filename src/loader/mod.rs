//! Binary executable loader.
//!
//! Parses the 44-byte header, the constant pool, the globals section, the
//! code segment and the class-metadata table out of a flat byte buffer
//! (already read into memory by the caller — reading the file is out of
//! scope here, as it is for the host binary this is adapted from).

mod class_metadata;

use crate::class::ClassRegistry;
use crate::consts::{HEADER_SIZE, MAGIC, SUPPORTED_VERSION};
use crate::error::LoaderError;
use crate::value::Word;

/// Everything a loaded binary contributes to a fresh interpreter.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Entry point: byte offset into `code`.
    pub entry_point: u32,
    /// Constant pool, decoded to words.
    pub constant_pool: Vec<Word>,
    /// Globals, decoded to words — the initial contents of the locals
    /// region.
    pub globals: Vec<Word>,
    /// The immutable code segment.
    pub code: Vec<u8>,
    /// Registered classes with computed field layouts and built v-tables.
    pub classes: ClassRegistry,
}

struct Header {
    entry_point: u32,
    const_pool_offset: u32,
    const_pool_size: u32,
    code_offset: u32,
    code_size: u32,
    globals_offset: u32,
    globals_size: u32,
    class_metadata_offset: u32,
    class_metadata_size: u32,
}

fn read_u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

fn section_in_bounds(offset: u32, size: u32, file_len: usize) -> bool {
    (offset as usize)
        .checked_add(size as usize)
        .is_some_and(|end| end <= file_len)
}

fn parse_header(buf: &[u8]) -> Result<Header, LoaderError> {
    if buf.len() < HEADER_SIZE {
        return Err(LoaderError::InvalidBinary("file too small for header"));
    }
    if buf[0..4] != MAGIC {
        return Err(LoaderError::InvalidBinary("bad magic number"));
    }
    let version = read_u32_le(buf, 4);
    if version != SUPPORTED_VERSION {
        return Err(LoaderError::InvalidBinary("unsupported version"));
    }

    let header = Header {
        entry_point: read_u32_le(buf, 8),
        const_pool_offset: read_u32_le(buf, 12),
        const_pool_size: read_u32_le(buf, 16),
        code_offset: read_u32_le(buf, 20),
        code_size: read_u32_le(buf, 24),
        globals_offset: read_u32_le(buf, 28),
        globals_size: read_u32_le(buf, 32),
        class_metadata_offset: read_u32_le(buf, 36),
        class_metadata_size: read_u32_le(buf, 40),
    };

    if header.const_pool_size % 4 != 0 {
        return Err(LoaderError::InvalidBinary(
            "constant pool size not a multiple of 4",
        ));
    }
    if header.globals_size % 4 != 0 {
        return Err(LoaderError::InvalidBinary(
            "globals section size not a multiple of 4",
        ));
    }
    if !section_in_bounds(header.const_pool_offset, header.const_pool_size, buf.len()) {
        return Err(LoaderError::InvalidBinary(
            "constant pool section out of file bounds",
        ));
    }
    if !section_in_bounds(header.globals_offset, header.globals_size, buf.len()) {
        return Err(LoaderError::InvalidBinary(
            "globals section out of file bounds",
        ));
    }
    if !section_in_bounds(header.code_offset, header.code_size, buf.len()) {
        return Err(LoaderError::InvalidBinary(
            "code section out of file bounds",
        ));
    }
    if !section_in_bounds(
        header.class_metadata_offset,
        header.class_metadata_size,
        buf.len(),
    ) {
        return Err(LoaderError::InvalidBinary(
            "class metadata section out of file bounds",
        ));
    }
    if header.entry_point >= header.code_size {
        return Err(LoaderError::InvalidBinary(
            "entry point outside code segment",
        ));
    }

    Ok(header)
}

fn read_words(buf: &[u8], offset: u32, size: u32) -> Vec<Word> {
    (0..size / 4)
        .map(|i| read_u32_le(buf, (offset + i * 4) as usize))
        .collect()
}

/// Parse a complete binary image.
pub fn load(buf: &[u8]) -> Result<LoadedImage, LoaderError> {
    let header = parse_header(buf)?;

    let constant_pool = read_words(buf, header.const_pool_offset, header.const_pool_size);
    let globals = read_words(buf, header.globals_offset, header.globals_size);
    let code = buf[header.code_offset as usize..(header.code_offset + header.code_size) as usize]
        .to_vec();

    let mut classes = ClassRegistry::new();
    if header.class_metadata_size != 0 {
        let start = header.class_metadata_offset as usize;
        let end = start + header.class_metadata_size as usize;
        class_metadata::parse_into(&buf[start..end], &mut classes)?;
    }
    classes.build_vtables()?;

    Ok(LoadedImage {
        entry_point: header.entry_point,
        constant_pool,
        globals,
        code,
        classes,
    })
}
