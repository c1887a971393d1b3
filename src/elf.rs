//! ELF32 constants and little-endian field helpers.
//!
//! Only the subset of the format this tool touches is defined here: the
//! identification magic, the section/symbol type tags used to find undefined
//! externals, and the fixed on-disk record sizes. Table geometry always uses
//! these fixed sizes; the header's `e_*entsize` fields are not trusted.

pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// 32-bit ARM, the only machine this toolchain targets.
pub const EM_ARM: u16 = 40;

// ── Section header types ─────────────────────────────────────────────────────

pub const SHT_PROGBITS: u32 = 1;
pub const SHT_SYMTAB: u32 = 2;
pub const SHT_STRTAB: u32 = 3;

// ── Symbol classification ────────────────────────────────────────────────────

pub const STT_NOTYPE: u8 = 0;
pub const STT_FUNC: u8 = 2;

/// Section index marking a symbol as undefined in the current object.
pub const SHN_UNDEF: u16 = 0;

// ── Fixed record sizes ───────────────────────────────────────────────────────

/// Size of the ELF32 header in bytes.
pub const EHDR_SIZE: usize = 52;
/// Size of an ELF32 program header entry in bytes.
pub const PHDR_SIZE: usize = 32;
/// Size of an ELF32 section header entry in bytes.
pub const SHDR_SIZE: usize = 40;
/// Size of an ELF32 symbol table record in bytes.
pub const SYM_SIZE: usize = 16;

// ── Binary read helpers (little-endian) ──────────────────────────────────────

/// Read a little-endian u16 from `data` at `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Read a little-endian u32 from `data` at `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset], data[offset + 1], data[offset + 2], data[offset + 3],
    ])
}

/// Read a null-terminated string from a byte slice starting at `offset`.
/// Stops at the end of the slice if no terminator is found.
pub fn read_cstr(data: &[u8], offset: usize) -> String {
    if offset >= data.len() {
        return String::new();
    }
    let end = data[offset..].iter().position(|&b| b == 0).unwrap_or(data.len() - offset);
    String::from_utf8_lossy(&data[offset..offset + end]).into_owned()
}
