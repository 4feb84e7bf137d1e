//! MIPS-I cycle-accurate simulator CLI.
//!
//! Loads an assembled program, runs the pipeline to termination, prints the
//! two return values and the statistics summary, and writes a memory dump
//! alongside. `RUST_LOG` controls pipeline tracing (e.g.
//! `RUST_LOG=mipsim_core=trace`).

use std::fs::File;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mipsim_core::sim::loader;
use mipsim_core::{Config, Program, Simulator};

/// Path of the post-run memory dump.
const MEMORY_DUMP: &str = "memory.out";

#[derive(Parser, Debug)]
#[command(
    name = "simulator",
    version,
    about = "Cycle-accurate out-of-order superscalar MIPS-I simulator",
    long_about = "Run an assembled program to termination.\n\n\
                  Examples:\n  simulator sum.bin\n  simulator --width 2 sum.bin"
)]
struct Cli {
    /// Assembled program file (from `assembler -o`).
    program: PathBuf,

    /// Superscalar width: instructions fetched, issued, and retired per cycle.
    #[arg(long, default_value_t = 4)]
    width: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let program = Program::load(&cli.program).unwrap_or_else(|e| {
        eprintln!("error: could not load '{}': {e}", cli.program.display());
        process::exit(1);
    });

    let config = Config::with_width(cli.width);
    let mut sim = Simulator::new(program, &config);
    if let Err(e) = sim.run() {
        eprintln!("fatal: {e}");
        process::exit(1);
    }

    let (v0, v1) = sim.return_values();
    println!("Execution complete.");
    println!("1st return value: {v0}");
    println!("2nd return value: {v1}");
    println!();
    sim.stats().print(sim.predictor().accuracy());

    match File::create(MEMORY_DUMP) {
        Ok(file) => {
            if let Err(e) = loader::dump_memory(sim.memory(), file) {
                eprintln!("error: could not write {MEMORY_DUMP}: {e}");
                process::exit(1);
            }
            println!("\nMemory dump written to ./{MEMORY_DUMP}");
        }
        Err(e) => {
            eprintln!("error: could not create {MEMORY_DUMP}: {e}");
            process::exit(1);
        }
    }
}
