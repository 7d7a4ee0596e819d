//! Hack simulator CLI: load a `.hack` or `.asm` program, run it, and dump
//! the machine state.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use hack_sim::{Halt, Machine};
use hack_toolchain::asm;

/// Run a Hack program and print the resulting machine state.
#[derive(Parser)]
#[command(name = "hack-sim", version)]
struct Cli {
    /// A `.hack` binary or a `.asm` source (assembled before running).
    program: PathBuf,

    /// Maximum number of instructions to execute.
    #[arg(long, default_value_t = 1_000_000)]
    steps: usize,

    /// RAM addresses to print after the run.
    #[arg(long = "ram", value_name = "ADDR")]
    ram: Vec<u16>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprint!("{err}");
            return ExitCode::FAILURE;
        }
    };
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.program)
        .with_context(|| format!("failed to read {}", cli.program.display()))?;

    let is_asm = cli.program.extension().and_then(|e| e.to_str()) == Some("asm");
    let mut machine = if is_asm {
        let result = asm::assemble(&text);
        if !result.errors.is_empty() {
            for err in &result.errors {
                eprintln!("{}: {err}", cli.program.display());
            }
            bail!("{}: {} error(s)", cli.program.display(), result.errors.len());
        }
        Machine::new(result.words)
    } else {
        Machine::from_hack_text(&text)?
    };

    info!("loaded {} instructions", machine.rom_len());
    let halt = machine.run(cli.steps);

    match halt {
        Halt::Halted => println!("halted in end loop"),
        Halt::OutOfRom => println!("ran past end of ROM"),
        Halt::StepLimit => println!("step limit ({}) reached", cli.steps),
    }
    println!("PC = {}", machine.pc);
    println!("A  = {}", machine.a);
    println!("D  = {}", machine.d);
    println!("SP = {}", machine.ram_at(0));
    for &addr in &cli.ram {
        println!("RAM[{addr}] = {}", machine.ram_at(addr));
    }
    Ok(())
}
