//! Validated in-memory view over a raw ELF32 buffer.
//!
//! The buffer is the single source of truth: structured reads decode fields
//! directly from it and mutations write directly into it, so saving the image
//! is a verbatim byte dump. Nothing parsed is ever re-serialized.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::elf::{
    read_cstr, read_u16, read_u32, EHDR_SIZE, ELF_MAGIC, PHDR_SIZE, SHDR_SIZE,
};
use crate::error::{Error, Result};

/// Decoded program header entry.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub p_type: u32,
    pub offset: u32,
    pub vaddr: u32,
    pub paddr: u32,
    pub filesz: u32,
    pub memsz: u32,
    pub flags: u32,
    pub align: u32,
}

/// Decoded section header entry.
#[derive(Clone, Copy, Debug)]
pub struct Section {
    pub name: u32,
    pub sh_type: u32,
    pub flags: u32,
    pub addr: u32,
    pub offset: u32,
    pub size: u32,
    pub link: u32,
    pub info: u32,
    pub addralign: u32,
    pub entsize: u32,
}

/// An ELF32 binary held fully in memory.
pub struct Image {
    buf: Vec<u8>,
    phoff: usize,
    phnum: usize,
    shoff: usize,
    shnum: usize,
    shstr_off: usize,
    shstr_size: usize,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("len", &self.buf.len())
            .field("segments", &self.phnum)
            .field("sections", &self.shnum)
            .finish()
    }
}

/// End offset of a table of `count` fixed-size records, or `None` on overflow.
fn table_end(offset: usize, count: usize, entsize: usize) -> Option<usize> {
    count.checked_mul(entsize)?.checked_add(offset)
}

impl Image {
    /// Take ownership of a byte buffer and validate its ELF32 structure.
    ///
    /// Checks run in a fixed order and fail fast on the first violation:
    /// header size, magic, program header table bounds, section header table
    /// bounds, section name string table index, string table bounds.
    pub fn from_bytes(buf: Vec<u8>) -> Result<Image> {
        if buf.len() < EHDR_SIZE {
            return Err(Error::format("cannot read ELF header"));
        }
        if buf[0..4] != ELF_MAGIC {
            return Err(Error::format("not an ELF file"));
        }

        let phoff = read_u32(&buf, 28) as usize;
        let shoff = read_u32(&buf, 32) as usize;
        let phnum = read_u16(&buf, 44) as usize;
        let shnum = read_u16(&buf, 48) as usize;
        let shstrndx = read_u16(&buf, 50) as usize;

        match table_end(phoff, phnum, PHDR_SIZE) {
            Some(end) if end <= buf.len() => {}
            _ => return Err(Error::format("cannot read program header table")),
        }
        match table_end(shoff, shnum, SHDR_SIZE) {
            Some(end) if end <= buf.len() => {}
            _ => return Err(Error::format("cannot read section header table")),
        }
        if shstrndx >= shnum {
            return Err(Error::format("invalid section name string table index"));
        }

        let shstr_hdr_off = shoff + shstrndx * SHDR_SIZE;
        let shstr_off = read_u32(&buf, shstr_hdr_off + 16) as usize;
        let shstr_size = read_u32(&buf, shstr_hdr_off + 20) as usize;
        match shstr_off.checked_add(shstr_size) {
            Some(end) if end <= buf.len() => {}
            _ => return Err(Error::format("cannot read section name string table")),
        }

        Ok(Image { buf, phoff, phnum, shoff, shnum, shstr_off, shstr_size })
    }

    /// Read a file fully into memory and validate it.
    pub fn open(path: &Path) -> Result<Image> {
        let buf = fs::read(path)?;
        Image::from_bytes(buf)
    }

    pub fn segment_count(&self) -> usize {
        self.phnum
    }

    pub fn section_count(&self) -> usize {
        self.shnum
    }

    /// Decode the program header entry at `index`.
    pub fn segment(&self, index: usize) -> Option<Segment> {
        if index >= self.phnum {
            return None;
        }
        let off = self.phoff + index * PHDR_SIZE;
        Some(Segment {
            p_type: read_u32(&self.buf, off),
            offset: read_u32(&self.buf, off + 4),
            vaddr: read_u32(&self.buf, off + 8),
            paddr: read_u32(&self.buf, off + 12),
            filesz: read_u32(&self.buf, off + 16),
            memsz: read_u32(&self.buf, off + 20),
            flags: read_u32(&self.buf, off + 24),
            align: read_u32(&self.buf, off + 28),
        })
    }

    /// Decode the section header entry at `index`.
    pub fn section(&self, index: usize) -> Option<Section> {
        if index >= self.shnum {
            return None;
        }
        let off = self.shoff + index * SHDR_SIZE;
        Some(Section {
            name: read_u32(&self.buf, off),
            sh_type: read_u32(&self.buf, off + 4),
            flags: read_u32(&self.buf, off + 8),
            addr: read_u32(&self.buf, off + 12),
            offset: read_u32(&self.buf, off + 16),
            size: read_u32(&self.buf, off + 20),
            link: read_u32(&self.buf, off + 24),
            info: read_u32(&self.buf, off + 28),
            addralign: read_u32(&self.buf, off + 32),
            entsize: read_u32(&self.buf, off + 36),
        })
    }

    /// Iterate all section header entries, including the null entry at index 0.
    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        (0..self.shnum).filter_map(move |i| self.section(i))
    }

    /// Resolve the name of the section at `index` through the section name
    /// string table. The name index is bounds-checked against the table.
    pub fn section_name(&self, index: usize) -> Result<String> {
        let section = self
            .section(index)
            .ok_or_else(|| Error::format(format!("section index {} out of range", index)))?;
        let name_idx = section.name as usize;
        if name_idx >= self.shstr_size {
            return Err(Error::format(format!("cannot read name for section {}", index)));
        }
        let table = &self.buf[self.shstr_off..self.shstr_off + self.shstr_size];
        Ok(read_cstr(table, name_idx))
    }

    /// Bounds-checked access to an arbitrary byte range of the buffer.
    pub fn bytes(&self, offset: u32, size: u32) -> Option<&[u8]> {
        let offset = offset as usize;
        let end = offset.checked_add(size as usize)?;
        if end > self.buf.len() {
            return None;
        }
        Some(&self.buf[offset..end])
    }

    /// Overwrite four bytes of the backing buffer with a little-endian u32.
    pub fn write_u32_at(&mut self, offset: usize, value: u32) -> Result<()> {
        let end = offset
            .checked_add(4)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| Error::format(format!("write out of bounds at offset {:#x}", offset)))?;
        self.buf[offset..end].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write the buffer back out verbatim, replacing the file's contents.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.buf)?;
        Ok(())
    }
}
