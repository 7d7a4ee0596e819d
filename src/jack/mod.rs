//! # Jack Compiler Front-End
//!
//! Compiles a single Jack class into VM code: a pull-driven tokenizer, a
//! recursive-descent parser with one-token lookahead, a two-scope symbol
//! table and a VM writer. The parser drives the writer inline; no AST is
//! built.

pub mod parser;
pub mod symbols;
pub mod token;
pub mod tokenizer;
pub mod writer;


use log::debug;

use crate::error::JackError;

/// Compile one `.jack` source (a single class) into VM text.
pub fn compile(source: &str) -> Result<String, JackError> {
    let vm = parser::Parser::new(source).run()?;
    debug!("compiled class ({} VM lines)", vm.lines().count());
    Ok(vm)
}
