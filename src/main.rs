use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use vitalink::driver;

#[derive(Parser)]
#[command(name = "vitalink")]
#[command(version)]
#[command(about = "Static-linking helper for Vita homebrew ELF binaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate import stubs for undefined symbols found in object files
    Generate {
        /// NID database (XML)
        nids: PathBuf,
        /// Relocatable object files to scan
        #[arg(required = true)]
        objects: Vec<PathBuf>,
    },
    /// Patch the module-info table bounds of a linked binary, in place
    Fixup {
        /// Linked ELF to rewrite
        elf: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate { nids, objects } => driver::run_generate(&nids, &objects),
        Command::Fixup { elf } => driver::run_fixup(&elf),
    };
    if let Err(err) = result {
        eprintln!("vitalink: error: {:#}", err);
        process::exit(1);
    }
}
