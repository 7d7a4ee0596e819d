//! # Hack Assembler
//!
//! Translates symbolic Hack assembly into 16-bit machine words using the
//! classic two-pass scheme:
//!
//! 1. **Pass 1** walks the cleaned commands, keeping a running instruction
//!    index that advances on A- and C-commands but not on `(LABEL)`
//!    pseudo-commands, and binds each label to the index of the *next*
//!    real instruction.
//! 2. **Pass 2** encodes every instruction, allocating RAM addresses
//!    (from 16 upward) for symbols that are still unbound.
//!
//! Errors are accumulated with their line numbers; a file that produced any
//! error yields no output.

pub mod encoder;
pub mod parser;
pub mod symbols;


use log::debug;

use crate::error::{AsmError, AsmErrorKind};

use encoder::{encode_a, encode_c};
use parser::{AddressExpr, Command};
use symbols::SymbolTable;

pub struct AssembleResult {
    /// Encoded instructions, one word per A-/C-command.
    pub words: Vec<u16>,
    pub errors: Vec<AsmError>,
}

/// Assemble a complete `.asm` source into machine words.
#[must_use]
pub fn assemble(source: &str) -> AssembleResult {
    let parsed = parser::parse(source);
    let mut errors = parsed.errors;
    let mut table = SymbolTable::new();

    // Pass 1: bind labels to the address of the next real instruction.
    let mut index: u16 = 0;
    for line in &parsed.commands {
        match &line.command {
            Command::Label(name) => {
                if let Err(existing) = table.bind_label(name, index) {
                    errors.push(AsmError::new(
                        AsmErrorKind::DuplicateLabel(name.clone(), existing),
                        line.span,
                    ));
                }
            }
            _ => index += 1,
        }
    }

    // Pass 2: encode, allocating variables on first reference.
    let mut words = Vec::with_capacity(index as usize);
    for line in &parsed.commands {
        match &line.command {
            Command::A(AddressExpr::Literal(value)) => words.push(encode_a(*value)),
            Command::A(AddressExpr::Symbol(name)) => {
                words.push(encode_a(table.resolve_or_alloc(name)));
            }
            Command::C { dest, comp, jump } => words.push(encode_c(*dest, *comp, *jump)),
            Command::Label(_) => {}
        }
    }

    debug!(
        "assembled {} instructions ({} errors)",
        words.len(),
        errors.len()
    );
    AssembleResult { words, errors }
}

/// Render machine words in the `.hack` text format: one 16-character
/// binary line per instruction, `\n`-terminated.
#[must_use]
pub fn to_hack_text(words: &[u16]) -> String {
    let mut out = String::with_capacity(words.len() * 17);
    for word in words {
        out.push_str(&format!("{word:016b}\n"));
    }
    out
}
