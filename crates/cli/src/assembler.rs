//! MIPS-I assembler CLI.
//!
//! Assembles a two-section source file into a program image. With `-o` the
//! image is written to disk for the simulator; without it a human-readable
//! memory listing is printed to stdout.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use mipsim_core::sim::loader;

#[derive(Parser, Debug)]
#[command(
    name = "assembler",
    version,
    about = "MIPS-I two-pass assembler",
    long_about = "Assemble a .data/.text source file into a program image.\n\n\
                  Examples:\n  assembler -o sum.bin sum.s\n  assembler sum.s"
)]
struct Cli {
    /// Destination for the assembled program file.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// MIPS assembly source file.
    source: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.source).unwrap_or_else(|e| {
        eprintln!("error: could not read '{}': {e}", cli.source.display());
        process::exit(1);
    });

    let program = match mipsim_asm::assemble(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    match cli.output {
        Some(path) => {
            if let Err(e) = program.save(&path) {
                eprintln!("error: could not write '{}': {e}", path.display());
                process::exit(1);
            }
        }
        None => {
            println!("memory:");
            let entry = program.entry;
            let memory = program.into_memory();
            if let Err(e) = loader::dump_memory(&memory, std::io::stdout().lock()) {
                eprintln!("error: {e}");
                process::exit(1);
            }
            println!("main address: {entry}");
        }
    }
}
