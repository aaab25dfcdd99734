//! k128cp2 coprocessor simulator CLI.
//!
//! This binary drives the simulator library from the command line. It provides:
//! 1. **Run:** Load a program image into IRAM, start it with `RUNI` and clock it until it stops.
//! 2. **Disassemble:** Print the assembly of every word in a program image.
//!
//! Diagnostics go through `tracing`; set `RUST_LOG` (for example
//! `RUST_LOG=k128cp2::dump=info`) or pass `-v` for more detail.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use k128cp2_core::Config;
use k128cp2_core::common::SimResult;
use k128cp2_core::isa::Instruction;
use k128cp2_core::isa::disasm::disassemble;
use k128cp2_core::sim::{Simulator, loader};

#[derive(Parser, Debug)]
#[command(
    name = "k128cp2-sim",
    author,
    version,
    about = "k128cp2 VLIW coprocessor simulator",
    long_about = "Run or disassemble k128cp2 program images.\n\nA program image is a flat file of little-endian 64-bit instruction words loaded at IRAM address 0.\n\nExamples:\n  k128cp2-sim run fft.bin --config fft.json\n  k128cp2-sim run fft.bin --max-cycles 20000 --snapshot final.json -v\n  k128cp2-sim disasm fft.bin"
)]
struct Cli {
    /// Raise the log level to debug (twice: trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program image until it stops.
    Run {
        /// Program image.
        program: PathBuf,

        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Clock limit (overrides the configuration).
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Start address (overrides the configuration).
        #[arg(long, value_parser = parse_addr)]
        start_pc: Option<u32>,

        /// Write the final machine state to this JSON file.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },

    /// Disassemble a program image.
    Disasm {
        /// Program image.
        program: PathBuf,
    },
}

/// Parses a decimal or `0x`-prefixed hexadecimal address.
fn parse_addr(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address `{s}`: {e}"))
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            program,
            config,
            max_cycles,
            start_pc,
            snapshot,
        } => cmd_run(&program, config.as_deref(), max_cycles, start_pc, snapshot.as_deref()),
        Commands::Disasm { program } => cmd_disasm(&program),
    };

    if let Err(e) = result {
        error!("{e}");
        process::exit(1);
    }
}

/// Loads, runs and reports a program.
///
/// Snapshots captured on `RUN`/`STOP` are written as `<prefix>_<n>.json`;
/// a cycle-limit exit returns status 2.
fn cmd_run(
    program: &Path,
    config_path: Option<&Path>,
    max_cycles: Option<u64>,
    start_pc: Option<u32>,
    snapshot: Option<&Path>,
) -> SimResult<()> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(n) = max_cycles {
        config.run.max_cycles = n;
    }
    if let Some(pc) = start_pc {
        config.run.start_pc = pc;
    }
    let prefix = config.snapshot.file_prefix.clone();

    let words = loader::load_program(program)?;
    let mut sim = Simulator::new(config);
    sim.load(&words)?;
    let outcome = sim.run()?;

    for (n, snap) in sim.drain_snapshots().iter().enumerate() {
        snap.write_file(format!("{prefix}_{n}.json"))?;
    }
    if let Some(path) = snapshot {
        sim.machine.snapshot().write_file(path)?;
    }

    println!("stop code: {:#x}", outcome.stop_code);
    println!("cycles:    {}", outcome.cycles);
    if !outcome.stopped {
        eprintln!("cycle limit reached before the program stopped");
        process::exit(2);
    }
    Ok(())
}

/// Prints `address: hi lo  assembly` for every word.
fn cmd_disasm(program: &Path) -> SimResult<()> {
    for (addr, word) in loader::load_program(program)?.into_iter().enumerate() {
        println!(
            "{addr:04x}: {:08x} {:08x}  {}",
            word >> 32,
            word & 0xffff_ffff,
            disassemble(Instruction(word))
        );
    }
    Ok(())
}
