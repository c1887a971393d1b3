//! Orchestration for the two invocation modes.
//!
//! Generate mode feeds each object through parse → undefined-symbol
//! extraction, accumulating one set for the whole batch, then matches the
//! set against the NID database and writes the stub artifact. A broken
//! object is reported and skipped — symbol discovery is best effort across
//! the file list — but a database failure aborts the run, since without it
//! no import can be resolved. Fixup mode patches a single linked binary in
//! place and rewrites it; every failure there is fatal.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::fixup;
use crate::image::Image;
use crate::nids::NidDatabase;
use crate::stubs;
use crate::symbols;

/// Fixed name of the generated stub artifact.
pub const STUBS_OUTPUT: &str = "__stubs.S";

/// Fixup mode: patch the module-info bounds of `path` in place.
pub fn run_fixup(path: &Path) -> Result<()> {
    let mut image =
        Image::open(path).with_context(|| format!("{}: cannot read image", path.display()))?;
    fixup::patch_module_info(&mut image)
        .with_context(|| format!("{}", path.display()))?;
    image
        .save(path)
        .with_context(|| format!("{}: cannot write image", path.display()))?;
    Ok(())
}

/// Generate mode: collect undefined symbols from `objects`, match them
/// against the database at `nids_path`, and write the stub artifact.
pub fn run_generate(nids_path: &Path, objects: &[PathBuf]) -> Result<()> {
    let mut undefined = HashSet::new();
    for path in objects {
        if let Err(err) = collect_object(path, &mut undefined) {
            eprintln!("{}: {}", path.display(), err);
        }
    }

    let db = NidDatabase::load(nids_path)
        .with_context(|| format!("{}: cannot load NID database", nids_path.display()))?;

    let imports = stubs::build_imports(&db, &undefined);
    let text = stubs::render_stubs(&imports);
    fs::write(STUBS_OUTPUT, text)
        .with_context(|| format!("{}: cannot write stub artifact", STUBS_OUTPUT))?;
    Ok(())
}

fn collect_object(path: &Path, undefined: &mut HashSet<String>) -> crate::error::Result<()> {
    let image = Image::open(path)?;
    symbols::collect_undefined(&image, undefined)
}
