//! # VM Translator
//!
//! Lowers the stack-based VM language into Hack assembly. Each input file
//! is parsed independently; the emitted output is a single concatenated
//! assembly stream in input order. Translating a directory prepends the
//! bootstrap (`SP = 256; call Sys.init 0`).

pub mod parser;
pub mod writer;

#[cfg(test)]
mod tests;

use log::debug;

use crate::error::VmError;

use writer::CodeWriter;

/// One VM compilation unit: the file stem (which scopes `static` symbols
/// and generated labels) plus its source text.
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Errors of one failed unit; the unit's output is omitted but translation
/// continues with the remaining units.
pub struct UnitErrors {
    pub unit: String,
    pub errors: Vec<VmError>,
}

pub struct TranslateResult {
    pub asm: String,
    pub errors: Vec<UnitErrors>,
}

/// Translate a set of VM units into one assembly stream.
///
/// `bootstrap` should be set when translating a directory, per the standard
/// VM mapping; single-file translations are expected to be self-contained
/// test programs and get no preamble.
#[must_use]
pub fn translate(units: &[SourceUnit], bootstrap: bool) -> TranslateResult {
    let mut writer = CodeWriter::new();
    let mut errors = Vec::new();

    if bootstrap {
        writer.write_bootstrap();
    }

    for unit in units {
        let parsed = parser::parse(&unit.source);
        if !parsed.errors.is_empty() {
            errors.push(UnitErrors {
                unit: unit.name.clone(),
                errors: parsed.errors,
            });
            continue;
        }
        debug!("translating {} ({} commands)", unit.name, parsed.commands.len());
        writer.set_file(&unit.name);
        for line in &parsed.commands {
            writer.write(&line.command);
        }
    }

    TranslateResult {
        asm: writer.finish(),
        errors,
    }
}
