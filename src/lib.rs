pub mod driver;
pub mod elf;
pub mod error;
pub mod fixup;
pub mod image;
pub mod nids;
pub mod stubs;
pub mod symbols;

#[cfg(test)]
pub(crate) mod test_elf;
