//! VM translator CLI: one or more `.vm` files in, a single `.asm` out.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use hack_toolchain::vm::{self, SourceUnit};
use hack_toolchain::driver;

/// Translate VM code into Hack assembly.
///
/// A directory is translated as one program: every `.vm` file inside it,
/// prefixed with the bootstrap, written to `<dir>/<dir>.asm`. A single file
/// is translated without bootstrap to `<file>.asm`.
#[derive(Parser)]
#[command(name = "vm-translator", version)]
struct Cli {
    /// A `.vm` file or a directory of `.vm` files.
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
    let is_dir = path.is_dir();
    let inputs = driver::collect_inputs(path, "vm")
        .with_context(|| format!("cannot read {}", path.display()))?;
    if inputs.is_empty() {
        bail!("no .vm files in {}", path.display());
    }

    let mut units = Vec::with_capacity(inputs.len());
    for input in &inputs {
        let source = fs::read_to_string(input)
            .with_context(|| format!("failed to read {}", input.display()))?;
        units.push(SourceUnit::new(driver::file_stem(input), source));
    }

    let result = vm::translate(&units, is_dir);
    if !result.errors.is_empty() {
        for unit in &result.errors {
            for err in &unit.errors {
                eprintln!("{}.vm: {err}", unit.unit);
            }
        }
        // The output is a single concatenated program; with a unit missing
        // it would not link, so nothing is written.
        bail!(
            "{} unit(s) failed, no output written",
            result.errors.len()
        );
    }

    let output = if is_dir {
        driver::directory_output_path(path, "asm")
    } else {
        driver::output_path(&inputs[0], "asm")
    };
    driver::write_atomic(&output, &result.asm)
        .with_context(|| format!("failed to write {}", output.display()))
}
