//! Import table construction and stub artifact rendering.
//!
//! Matches the accumulated undefined-symbol set against the NID database and
//! renders `__stubs.S`: one placeholder thunk per imported function plus the
//! fixed-layout metadata sections the module loader walks at load time. The
//! thunk returns -1 without faulting, so the object links cleanly before the
//! loader resolves the real addresses.
//!
//! Emission iterates a `BTreeMap` keyed by module NID, so module order in the
//! artifact is ascending NID no matter how the database or the input objects
//! were ordered. Function order within a module follows database declaration
//! order. Identical inputs therefore produce byte-identical output.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use crate::nids::NidDatabase;

/// One function imported from a module.
#[derive(Debug, Clone)]
pub struct ImportedFunc {
    pub name: String,
    pub nid: u32,
}

/// All functions a binary imports from a single module.
#[derive(Debug, Clone)]
pub struct Import {
    pub name: String,
    pub nid: u32,
    pub functions: Vec<ImportedFunc>,
}

/// Imports keyed by module NID; map iteration order is the emission order.
pub type ImportMap = BTreeMap<u32, Import>;

/// Match database functions against the undefined set.
///
/// Walks the database in stored order. Each matching function lazily creates
/// the `Import` for its module and is appended to that module's list, so the
/// per-module function order is the database's declaration order filtered to
/// the undefined set.
pub fn build_imports(db: &NidDatabase, undefined: &HashSet<String>) -> ImportMap {
    let mut imports = ImportMap::new();
    for module in &db.modules {
        for func in &module.functions {
            if !undefined.contains(&func.name) {
                continue;
            }
            let import = imports.entry(module.nid).or_insert_with(|| Import {
                name: module.name.clone(),
                nid: module.nid,
                functions: Vec::new(),
            });
            import.functions.push(ImportedFunc { name: func.name.clone(), nid: func.nid });
        }
    }
    imports
}

/// Placeholder thunk: returns the all-ones sentinel and does not fault when
/// called before load-time resolution has patched the stub table.
const STUB_PREAMBLE: &str = "
.macro STUB name
.global \\name
\\name:
MOV R0, #0xFFFFFFFF
BX LR
NOP
.endm

.code 32
";

/// NID under which the synthesized export table declares `module_start`.
const MODULE_START_NID: u32 = 0x935cd196;

/// Fixed 26-character placeholder written into the module-info name field.
const MODULE_NAME_PLACEHOLDER: &str = "01234567890123456789012345";

/// Render the full stub artifact for the given import map.
///
/// An empty map still yields a complete artifact: the preamble, every data
/// region header, and the synthesized module-info/export records — just with
/// zero imports listed.
pub fn render_stubs(imports: &ImportMap) -> String {
    let mut out = String::new();
    out.push_str(STUB_PREAMBLE);
    out.push('\n');

    for import in imports.values() {
        for func in &import.functions {
            let _ = writeln!(out, "STUB {}", func.name);
        }
    }

    // Module name strings, referenced by the import descriptors.
    let _ = writeln!(out, "\n.section .sceImport.rodata, \"a\"");
    for import in imports.values() {
        let _ = writeln!(out, "{}_name: .string \"{}\"", import.name, import.name);
    }

    // Per-module function NID tables, in the per-import function order.
    let _ = writeln!(out, "\n.section .sceFNID.rodata, \"a\"");
    for import in imports.values() {
        let _ = write!(out, "{}_nids: ", import.name);
        for func in &import.functions {
            let _ = write!(out, ".word 0x{:x}; ", func.nid);
        }
        let _ = writeln!(out);
    }

    // Per-module stub address tables, same order as the NID tables.
    let _ = writeln!(out, "\n.section .sceFStub.rodata, \"a\"");
    for import in imports.values() {
        let _ = write!(out, "{}_funcs: ", import.name);
        for func in &import.functions {
            let _ = write!(out, ".word {}; ", func.name);
        }
        let _ = writeln!(out);
    }

    // One 0x34-byte import descriptor per module: size, version fields,
    // function count, module NID, then pointers into the three tables above.
    let _ = writeln!(out, "\n.section .sceLib.stub, \"a\"");
    for import in imports.values() {
        let _ = writeln!(
            out,
            ".hword 0x34; .hword 0; .hword 0; .hword {}; .hword 0; .hword 0; \
             .word 0; .word 0x{:x}; .word {}_name; \
             .word 0; .word {}_nids; .word {}_funcs; \
             .word 0; .word 0; .word 0; .word 0;",
            import.functions.len(),
            import.nid,
            import.name,
            import.name,
            import.name,
        );
    }

    // Module-info record with a placeholder name and a single module_start
    // entry point. The export/import bounds stay zero here; the fixup pass
    // fills them in after the final link.
    let _ = writeln!(out, "\n.section .sceModuleInfo.rodata, \"a\"");
    let _ = writeln!(
        out,
        ".hword 0x0; .hword 0x101; .string \"{}\"; .byte 0x6; .word 0; \
         .word 0; .word 0; .word 0; .word 0; .word 0; .word 0; .word 0; .word 0; \
         .word module_start; .word 0; .word 0; .word 0; .word 0; .word 0;",
        MODULE_NAME_PLACEHOLDER,
    );

    // Single-entry export table naming the start routine.
    let _ = writeln!(out, "\n.section .sceExport.rodata, \"a\"");
    let _ = writeln!(out, "export_nids: .word 0x{:X}", MODULE_START_NID);
    let _ = writeln!(out, "export_funcs: .word module_start");

    // 0x20-byte export descriptor referencing the table above.
    let _ = writeln!(out, "\n.section .sceLib.ent, \"a\"");
    let _ = writeln!(
        out,
        ".hword 0x20; .hword 0; .hword 0x8000; .hword 1; .word 0; .word 0; .word 0; \
         .word 0; .word export_nids; .word export_funcs;",
    );

    out
}
