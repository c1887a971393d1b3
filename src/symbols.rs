//! Undefined-symbol extraction from relocatable objects.
//!
//! Walks the symbol table of an [`Image`] and collects the names of
//! undefined external references into a caller-supplied set. The set is
//! threaded through the batch by the driver; this module never mutates
//! the image.

use std::collections::HashSet;

use crate::elf::{read_u16, read_u32, read_cstr, SHN_UNDEF, SHT_SYMTAB, STT_NOTYPE, SYM_SIZE};
use crate::error::{Error, Result};
use crate::image::Image;

/// Collect the names of undefined external symbols into `output`.
///
/// A symbol qualifies when its type is `STT_NOTYPE` and its section index is
/// `SHN_UNDEF`: a name this object expects some other module to provide.
/// Set insertion collapses duplicates across objects.
pub fn collect_undefined(image: &Image, output: &mut HashSet<String>) -> Result<()> {
    // First symbol table wins; index 0 is the null section and never matches.
    let symtab = image
        .sections()
        .skip(1)
        .find(|section| section.sh_type == SHT_SYMTAB)
        .ok_or_else(|| Error::format("cannot find symbol table section"))?;

    let sym_data = image
        .bytes(symtab.offset, symtab.size)
        .ok_or_else(|| Error::format("cannot read symbol table section"))?;

    let strtab = image
        .section(symtab.link as usize)
        .ok_or_else(|| Error::format("cannot find string table for symbol table"))?;
    let str_data = image
        .bytes(strtab.offset, strtab.size)
        .ok_or_else(|| Error::format("cannot read string table for symbol table"))?;

    let entsize = if symtab.entsize != 0 { symtab.entsize as usize } else { SYM_SIZE };

    // Record 0 is the conventional null symbol; always skipped.
    let count = sym_data.len() / entsize;
    for i in 1..count {
        let off = i * entsize;
        if off + SYM_SIZE > sym_data.len() {
            break;
        }
        let name_idx = read_u32(sym_data, off) as usize;
        let info = sym_data[off + 12];
        let shndx = read_u16(sym_data, off + 14);

        // A name index past the string table marks a corrupt record. It is
        // skipped rather than rejected so one bad record does not sink the
        // whole object; the remaining records are still usable.
        if name_idx >= str_data.len() {
            continue;
        }

        if info & 0x0f == STT_NOTYPE && shndx == SHN_UNDEF {
            output.insert(read_cstr(str_data, name_idx));
        }
    }

    Ok(())
}
