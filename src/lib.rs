//! # Hack Toolchain
//!
//! The lower three stages of the toolchain for the Hack educational
//! computer: `Jack -> VM -> Asm -> binary`.
//!
//! ## Pipeline
//!
//! 1. **[`jack`]** compiles the object-oriented Jack language to
//!    stack-machine VM code (tokenizer, recursive-descent parser, two-scope
//!    symbol table, VM writer).
//! 2. **[`vm`]** lowers VM code to Hack assembly (stateful emitter with
//!    per-file static naming, function/return frame protocol and
//!    overflow-safe signed comparison).
//! 3. **[`asm`]** assembles Hack assembly to 16-bit machine words
//!    (two-pass symbol resolution, typed instruction encoder).
//!
//! Each stage consumes and produces plain text; no stage reads its own
//! output. The binaries (`jack-compiler`, `vm-translator`,
//! `hack-assembler`) are thin wrappers over [`driver`].
//!
//! ## Example
//!
//! ```
//! use hack_toolchain::{asm, jack, vm};
//!
//! let vm_code = jack::compile("class Main { function void main() { return; } }").unwrap();
//! let unit = vm::SourceUnit::new("Main", vm_code);
//! let translated = vm::translate(&[unit], false);
//! assert!(translated.errors.is_empty());
//!
//! let assembled = asm::assemble(&translated.asm);
//! assert!(assembled.errors.is_empty());
//! let binary = asm::to_hack_text(&assembled.words);
//! assert!(binary.lines().all(|l| l.len() == 16));
//! ```

pub mod asm;
pub mod driver;
pub mod error;
pub mod jack;
pub mod vm;
