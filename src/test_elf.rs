//! Test-only helpers for crafting ELF32 fixture buffers.
//!
//! `ElfBuilder` lays out a header, optional PT_LOAD segments, user sections,
//! and a trailing `.shstrtab`, producing the same fixed-size little-endian
//! records the parser expects.

use crate::elf::{EHDR_SIZE, ELF_MAGIC, EM_ARM, PHDR_SIZE, SHDR_SIZE, SHT_STRTAB};

#[derive(Default)]
pub(crate) struct SectionSpec {
    pub name: &'static str,
    pub sh_type: u32,
    pub addr: u32,
    pub data: Vec<u8>,
    pub link: u32,
    pub entsize: u32,
}

pub(crate) struct ElfBuilder {
    segments: Vec<u32>,
    sections: Vec<SectionSpec>,
}

fn push_u16(buf: &mut Vec<u8>, val: u16) {
    buf.extend_from_slice(&val.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, val: u32) {
    buf.extend_from_slice(&val.to_le_bytes());
}

impl ElfBuilder {
    pub fn new() -> ElfBuilder {
        ElfBuilder { segments: Vec::new(), sections: Vec::new() }
    }

    /// Add a PT_LOAD segment with the given virtual address.
    pub fn segment(mut self, vaddr: u32) -> ElfBuilder {
        self.segments.push(vaddr);
        self
    }

    /// Add a section; sections get header indices 1.. in insertion order.
    pub fn section(mut self, spec: SectionSpec) -> ElfBuilder {
        self.sections.push(spec);
        self
    }

    pub fn build(self) -> Vec<u8> {
        // Section name string table: null section name first, users, .shstrtab.
        let mut shstr = vec![0u8];
        let mut name_offsets = Vec::new();
        for spec in &self.sections {
            name_offsets.push(shstr.len() as u32);
            shstr.extend_from_slice(spec.name.as_bytes());
            shstr.push(0);
        }
        let shstrtab_name = shstr.len() as u32;
        shstr.extend_from_slice(b".shstrtab\0");

        let phnum = self.segments.len();
        let shnum = self.sections.len() + 2; // null + users + .shstrtab
        let phoff = if phnum > 0 { EHDR_SIZE } else { 0 };

        // Section bodies follow the program header table.
        let mut body_off = EHDR_SIZE + phnum * PHDR_SIZE;
        let mut section_offsets = Vec::new();
        for spec in &self.sections {
            section_offsets.push(body_off as u32);
            body_off += spec.data.len();
        }
        let shstr_off = body_off as u32;
        body_off += shstr.len();
        let shoff = body_off;

        let mut buf = Vec::new();

        // ELF header
        buf.extend_from_slice(&ELF_MAGIC);
        buf.push(1); // ELFCLASS32
        buf.push(1); // ELFDATA2LSB
        buf.push(1); // EV_CURRENT
        buf.resize(16, 0);
        push_u16(&mut buf, 1); // ET_REL
        push_u16(&mut buf, EM_ARM);
        push_u32(&mut buf, 1); // e_version
        push_u32(&mut buf, 0); // e_entry
        push_u32(&mut buf, phoff as u32);
        push_u32(&mut buf, shoff as u32);
        push_u32(&mut buf, 0); // e_flags
        push_u16(&mut buf, EHDR_SIZE as u16);
        push_u16(&mut buf, PHDR_SIZE as u16);
        push_u16(&mut buf, phnum as u16);
        push_u16(&mut buf, SHDR_SIZE as u16);
        push_u16(&mut buf, shnum as u16);
        push_u16(&mut buf, (shnum - 1) as u16); // .shstrtab is last

        // Program headers
        for &vaddr in &self.segments {
            push_u32(&mut buf, 1); // PT_LOAD
            push_u32(&mut buf, 0); // p_offset
            push_u32(&mut buf, vaddr);
            push_u32(&mut buf, vaddr);
            push_u32(&mut buf, 0); // p_filesz
            push_u32(&mut buf, 0); // p_memsz
            push_u32(&mut buf, 5); // R+X
            push_u32(&mut buf, 0x1000);
        }

        // Section bodies, then the name table
        for spec in &self.sections {
            buf.extend_from_slice(&spec.data);
        }
        buf.extend_from_slice(&shstr);

        // Section headers: null entry first
        for _ in 0..10 {
            push_u32(&mut buf, 0);
        }
        for (i, spec) in self.sections.iter().enumerate() {
            push_u32(&mut buf, name_offsets[i]);
            push_u32(&mut buf, spec.sh_type);
            push_u32(&mut buf, 0); // flags
            push_u32(&mut buf, spec.addr);
            push_u32(&mut buf, section_offsets[i]);
            push_u32(&mut buf, spec.data.len() as u32);
            push_u32(&mut buf, spec.link);
            push_u32(&mut buf, 0); // info
            push_u32(&mut buf, 4); // addralign
            push_u32(&mut buf, spec.entsize);
        }
        push_u32(&mut buf, shstrtab_name);
        push_u32(&mut buf, SHT_STRTAB);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, shstr_off);
        push_u32(&mut buf, shstr.len() as u32);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 0);
        push_u32(&mut buf, 1);
        push_u32(&mut buf, 0);

        buf
    }
}

/// Build a string table body and the offset of each name within it.
pub(crate) fn strtab(names: &[&str]) -> (Vec<u8>, Vec<u32>) {
    let mut data = vec![0u8];
    let mut offsets = Vec::new();
    for name in names {
        offsets.push(data.len() as u32);
        data.extend_from_slice(name.as_bytes());
        data.push(0);
    }
    (data, offsets)
}

/// Shorthand for a symbol record: global binding, the given type and section.
pub(crate) fn sym(name: u32, sym_type: u8, shndx: u16) -> (u32, u8, u16) {
    (name, (1 << 4) | (sym_type & 0x0f), shndx)
}

/// Build a symbol table body with the conventional null record prepended.
pub(crate) fn symtab(records: &[(u32, u8, u16)]) -> Vec<u8> {
    let mut data = vec![0u8; 16];
    for &(name, info, shndx) in records {
        push_u32(&mut data, name);
        push_u32(&mut data, 0); // value
        push_u32(&mut data, 0); // size
        data.push(info);
        data.push(0); // other
        push_u16(&mut data, shndx);
    }
    data
}
