//! Hack assembler CLI: `.asm` in, `.hack` out.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::{asm, driver};

/// Assemble Hack assembly into `.hack` machine code.
#[derive(Parser)]
#[command(name = "hack-assembler", version)]
struct Cli {
    /// An `.asm` file, or a directory whose `.asm` files are each assembled.
    path: PathBuf,
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
    match run(&cli.path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<()> {
    let inputs = driver::collect_inputs(path, "asm")
        .with_context(|| format!("cannot read {}", path.display()))?;

    let mut failed = 0;
    for input in &inputs {
        if let Err(err) = assemble_file(input) {
            eprintln!("{err:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed", inputs.len());
    }
    Ok(())
}

fn assemble_file(input: &Path) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let result = asm::assemble(&source);
    if !result.errors.is_empty() {
        for err in &result.errors {
            eprintln!("{}: {err}", input.display());
        }
        bail!("{}: {} error(s)", input.display(), result.errors.len());
    }

    let output = driver::output_path(input, "hack");
    driver::write_atomic(&output, &asm::to_hack_text(&result.words))
        .with_context(|| format!("failed to write {}", output.display()))
}
