//! In-place patching of the module-info record in a linked binary.
//!
//! After the final link the module-info record still carries the zeroed
//! export/import bounds the stub generator emitted. This pass locates the
//! export table, the import table, and the record itself by section name,
//! rebases their addresses against the first segment's virtual address, and
//! overwrites exactly the four bound fields in the backing buffer.

use crate::error::{Error, Result};
use crate::image::Image;

const ENT_SECTION: &str = ".sceLib.ent";
const STUB_SECTION: &str = ".sceLib.stub";
const MODULE_INFO_SECTION: &str = ".sceModuleInfo.rodata";

/// Size of the module-info record embedded in `.sceModuleInfo.rodata`.
pub const MODULE_INFO_SIZE: usize = 92;

// Byte offsets of the patched fields within the record.
pub const MI_ENT_TOP: usize = 36;
pub const MI_ENT_END: usize = 40;
pub const MI_STUB_TOP: usize = 44;
pub const MI_STUB_END: usize = 48;

/// Patch the export/import table bounds into the module-info record.
///
/// All validation happens before the first write, so a failed run leaves the
/// buffer untouched. Running twice over unchanged sections writes the same
/// four values again.
pub fn patch_module_info(image: &mut Image) -> Result<()> {
    let base = image
        .segment(0)
        .ok_or_else(|| Error::format("no segments defined"))?
        .vaddr;

    let mut ent_top = 0u32;
    let mut ent_end = 0u32;
    let mut stub_top = 0u32;
    let mut stub_end = 0u32;
    let mut module_info_idx = 0usize;

    for i in 1..image.section_count() {
        let name = image.section_name(i)?;
        let section = match image.section(i) {
            Some(section) => section,
            None => continue,
        };
        match name.as_str() {
            ENT_SECTION => {
                ent_top = section.addr.wrapping_sub(base);
                ent_end = ent_top.wrapping_add(section.size);
            }
            STUB_SECTION => {
                stub_top = section.addr.wrapping_sub(base);
                stub_end = stub_top.wrapping_add(section.size);
            }
            MODULE_INFO_SECTION => {
                module_info_idx = i;
            }
            _ => {}
        }
    }

    // A zero bound means the section was absent or degenerate; either way
    // there is nothing sensible to patch.
    if ent_top == 0 || ent_end == 0 || stub_top == 0 || stub_end == 0 || module_info_idx == 0 {
        return Err(Error::lookup("cannot fix up image: some sections are missing"));
    }

    let module_info = image
        .section(module_info_idx)
        .ok_or_else(|| Error::lookup("cannot fix up image: some sections are missing"))?;
    if image.bytes(module_info.offset, module_info.size).is_none()
        || (module_info.size as usize) < MODULE_INFO_SIZE
    {
        return Err(Error::format("cannot read module info record"));
    }

    let record = module_info.offset as usize;
    image.write_u32_at(record + MI_ENT_TOP, ent_top)?;
    image.write_u32_at(record + MI_ENT_END, ent_end)?;
    image.write_u32_at(record + MI_STUB_TOP, stub_top)?;
    image.write_u32_at(record + MI_STUB_END, stub_end)?;
    Ok(())
}
