//! # VM Writer
//!
//! Emits VM commands as text. Stateless with respect to the grammar; owns
//! the per-class label counter used by `if`/`while` lowering. Segments and
//! operations are the same types the VM translator parses, so the
//! front-end's output is exactly the translator's input language.

use crate::vm::parser::{ArithOp, Segment};

pub struct VmWriter {
    out: String,
    label_idx: usize,
}

impl Default for VmWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl VmWriter {
    pub fn new() -> Self {
        VmWriter {
            out: String::new(),
            label_idx: 0,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    /// Allocate the next `<Class>_L_<k>` label.
    pub fn fresh_label(&mut self, class_name: &str) -> String {
        let label = format!("{}_L_{}", class_name, self.label_idx);
        self.label_idx += 1;
        label
    }

    pub fn push(&mut self, segment: Segment, index: u16) {
        self.out.push_str(&format!("push {segment} {index}\n"));
    }

    pub fn pop(&mut self, segment: Segment, index: u16) {
        self.out.push_str(&format!("pop {segment} {index}\n"));
    }

    pub fn arithmetic(&mut self, op: ArithOp) {
        self.out.push_str(&format!("{op}\n"));
    }

    pub fn label(&mut self, label: &str) {
        self.out.push_str(&format!("label {label}\n"));
    }

    pub fn goto(&mut self, label: &str) {
        self.out.push_str(&format!("goto {label}\n"));
    }

    pub fn if_goto(&mut self, label: &str) {
        self.out.push_str(&format!("if-goto {label}\n"));
    }

    pub fn call(&mut self, name: &str, n_args: u16) {
        self.out.push_str(&format!("call {name} {n_args}\n"));
    }

    pub fn function(&mut self, name: &str, n_locals: u16) {
        self.out.push_str(&format!("function {name} {n_locals}\n"));
    }

    pub fn ret(&mut self) {
        self.out.push_str("return\n");
    }
}
