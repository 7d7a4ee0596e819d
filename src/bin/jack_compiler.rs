//! Jack compiler CLI: `.jack` in, `.vm` out.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::{driver, jack};

/// Compile Jack classes into VM code.
#[derive(Parser)]
#[command(name = "jack-compiler", version)]
struct Cli {
    /// A `.jack` file, or a directory whose `.jack` files are each compiled.
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
    let inputs = driver::collect_inputs(path, "jack")
        .with_context(|| format!("cannot read {}", path.display()))?;

    let mut failed = 0;
    for input in &inputs {
        if let Err(err) = compile_file(input) {
            eprintln!("{err:#}");
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} of {} file(s) failed", inputs.len());
    }
    Ok(())
}

fn compile_file(input: &Path) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let vm_code = match jack::compile(&source) {
        Ok(vm_code) => vm_code,
        Err(err) => {
            eprintln!("{}: {err}", input.display());
            bail!("{}: compilation failed", input.display());
        }
    };

    let output = driver::output_path(input, "vm");
    driver::write_atomic(&output, &vm_code)
        .with_context(|| format!("failed to write {}", output.display()))
}
