//! # Assembly Emitter
//!
//! Translates [`VmCommand`]s into Hack assembly. The writer owns all the
//! translation state the VM calling convention needs:
//!
//! - the current file name, which scopes `static` symbols and comparison
//!   labels;
//! - the current function name, which scopes `label`/`goto`/`if-goto`;
//! - a monotonic return-site index, so every `call` gets a unique return
//!   label;
//! - a monotonic comparison index, so every `eq`/`gt`/`lt` expansion gets
//!   unique branch labels.
//!
//! `SP` always points at the next free slot above the stack top. Scratch
//! registers: `R13` carries a pop target address, `R14` the return frame
//! cursor, `R15` the saved return address.

use super::parser::{ArithOp, Segment, VmCommand};

/// Stack pointer start value installed by the bootstrap.
const STACK_BASE: u16 = 256;
/// Base RAM address of the `temp` segment.
const TEMP_BASE: u16 = 5;
/// Base RAM address of the `pointer` segment (THIS/THAT).
const POINTER_BASE: u16 = 3;
/// File tag used for the bootstrap's `call Sys.init 0` return label.
const BOOTSTRAP_TAG: &str = "Bootstrap";

pub struct CodeWriter {
    out: String,
    file: String,
    function: String,
    return_idx: usize,
    compare_idx: usize,
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeWriter {
    pub fn new() -> Self {
        CodeWriter {
            out: String::new(),
            file: String::new(),
            function: String::new(),
            return_idx: 0,
            compare_idx: 0,
        }
    }

    /// Start translating a new VM file; resets the function scope.
    pub fn set_file(&mut self, name: &str) {
        self.file = name.to_string();
        self.function.clear();
    }

    /// Consume the writer, yielding the emitted assembly.
    pub fn finish(self) -> String {
        self.out
    }

    /// Emit the VM bootstrap: `SP = 256`, then `call Sys.init 0`.
    pub fn write_bootstrap(&mut self) {
        self.comment("bootstrap");
        self.a_const(STACK_BASE);
        self.c("D=A");
        self.a_sym("SP");
        self.c("M=D");
        self.file = BOOTSTRAP_TAG.to_string();
        self.write(&VmCommand::Call {
            name: "Sys.init".to_string(),
            n_args: 0,
        });
    }

    /// Translate one command, preceded by its source text as a comment.
    pub fn write(&mut self, command: &VmCommand) {
        self.comment(&command.to_string());
        match command {
            VmCommand::Arithmetic(op) => self.arithmetic(*op),
            VmCommand::Push { segment, index } => self.push(*segment, *index),
            VmCommand::Pop { segment, index } => self.pop(*segment, *index),
            VmCommand::Label(name) => {
                let label = self.scoped_label(name);
                self.label(&label);
            }
            VmCommand::Goto(name) => {
                let label = self.scoped_label(name);
                self.a_sym(&label);
                self.c("0;JMP");
            }
            VmCommand::IfGoto(name) => {
                let label = self.scoped_label(name);
                self.pop_to_d();
                self.a_sym(&label);
                self.c("D;JNE");
            }
            VmCommand::Function { name, n_locals } => self.function(name, *n_locals),
            VmCommand::Call { name, n_args } => self.call(name, *n_args),
            VmCommand::Return => self.write_return(),
        }
    }

    // ----- arithmetic -----

    fn arithmetic(&mut self, op: ArithOp) {
        match op {
            ArithOp::Add => self.binary("D=M+D"),
            ArithOp::Sub => self.binary("D=M-D"),
            ArithOp::And => self.binary("D=D&M"),
            ArithOp::Or => self.binary("D=D|M"),
            ArithOp::Neg => self.unary("M=-M"),
            ArithOp::Not => self.unary("M=!M"),
            ArithOp::ShiftLeft => self.unary("M=M<<"),
            ArithOp::ShiftRight => self.unary("M=M>>"),
            ArithOp::Eq => self.compare("EQ", "D;JEQ"),
            ArithOp::Gt => self.compare("GT", "D;JGT"),
            ArithOp::Lt => self.compare("LT", "D;JLT"),
        }
    }

    /// Fold the top slot into the one below it: `x (op) y` where `y` is the
    /// popped top and `x` the new top.
    fn binary(&mut self, fold: &str) {
        self.pop_to_d();
        self.c("A=A-1");
        self.c(fold);
        self.c("M=D");
    }

    /// Rewrite the stack top in place.
    fn unary(&mut self, rewrite: &str) {
        self.a_sym("SP");
        self.c("A=M-1");
        self.c(rewrite);
    }

    /// Two's-complement safe comparison.
    ///
    /// `x - y` overflows when the operands have different signs, so the
    /// result is decided by sign alone in that case (negative < positive)
    /// and by the sign of the difference only when the signs agree.
    fn compare(&mut self, op: &str, judge: &str) {
        let p = format!("{}.{}.{}", self.file, op, self.compare_idx);
        self.compare_idx += 1;

        // D = y (popped top); branch on its sign.
        self.pop_to_d();
        self.a_sym(&format!("{p}$Y_NEG"));
        self.c("D;JLT");
        // y >= 0: if x < 0 the signs differ and x < y.
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("D=M");
        self.a_sym(&format!("{p}$X_NEG"));
        self.c("D;JLT");
        self.a_sym(&format!("{p}$SAME_SIGN"));
        self.c("0;JMP");
        // y < 0: if x < 0 the signs agree, otherwise x > y.
        self.label(&format!("{p}$Y_NEG"));
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("D=M");
        self.a_sym(&format!("{p}$SAME_SIGN"));
        self.c("D;JLT");
        self.c("D=1");
        self.a_sym(&format!("{p}$JUDGE"));
        self.c("0;JMP");
        self.label(&format!("{p}$X_NEG"));
        self.c("D=-1");
        self.a_sym(&format!("{p}$JUDGE"));
        self.c("0;JMP");
        // Same sign: the difference cannot overflow.
        self.label(&format!("{p}$SAME_SIGN"));
        self.a_sym("SP");
        self.c("A=M");
        self.c("D=M");
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("D=M-D");
        // D now encodes x - y (or a +-1 sign proxy); apply the condition.
        self.label(&format!("{p}$JUDGE"));
        self.a_sym(&format!("{p}$TRUE"));
        self.c(judge);
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("M=0");
        self.a_sym(&format!("{p}$END"));
        self.c("0;JMP");
        self.label(&format!("{p}$TRUE"));
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("M=-1");
        self.label(&format!("{p}$END"));
    }

    // ----- memory access -----

    fn push(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Constant => {
                self.a_const(index);
                self.c("D=A");
            }
            Segment::Static => {
                let symbol = self.static_symbol(index);
                self.a_sym(&symbol);
                self.c("D=M");
            }
            _ => {
                self.addr_to_a(segment, index);
                self.c("D=M");
            }
        }
        self.push_d();
    }

    fn pop(&mut self, segment: Segment, index: u16) {
        match segment {
            Segment::Static => {
                self.pop_to_d();
                let symbol = self.static_symbol(index);
                self.a_sym(&symbol);
                self.c("M=D");
            }
            Segment::Constant => unreachable!("`pop constant` is rejected by the parser"),
            _ => {
                // Target address into R13, then pop into it.
                self.segment_base_to_d(segment);
                self.a_const(index);
                self.c("D=D+A");
                self.a_sym("R13");
                self.c("M=D");
                self.pop_to_d();
                self.a_sym("R13");
                self.c("A=M");
                self.c("M=D");
            }
        }
    }

    /// Leave the effective address of `segment[index]` in `A`.
    fn addr_to_a(&mut self, segment: Segment, index: u16) {
        self.segment_base_to_d(segment);
        self.a_const(index);
        self.c("A=D+A");
    }

    /// Leave the segment base in `D`: dereferenced for the pointer-backed
    /// segments, the constant base itself for `temp`/`pointer`.
    fn segment_base_to_d(&mut self, segment: Segment) {
        match segment {
            Segment::Local => {
                self.a_sym("LCL");
                self.c("D=M");
            }
            Segment::Argument => {
                self.a_sym("ARG");
                self.c("D=M");
            }
            Segment::This => {
                self.a_sym("THIS");
                self.c("D=M");
            }
            Segment::That => {
                self.a_sym("THAT");
                self.c("D=M");
            }
            Segment::Temp => {
                self.a_const(TEMP_BASE);
                self.c("D=A");
            }
            Segment::Pointer => {
                self.a_const(POINTER_BASE);
                self.c("D=A");
            }
            Segment::Static | Segment::Constant => {
                unreachable!("{segment} has no base pointer")
            }
        }
    }

    fn static_symbol(&self, index: u16) -> String {
        format!("{}.{}", self.file, index)
    }

    // ----- functions -----

    fn function(&mut self, name: &str, n_locals: u16) {
        self.function = name.to_string();
        self.label(name);
        for _ in 0..n_locals {
            self.a_sym("SP");
            self.c("A=M");
            self.c("M=0");
            self.a_sym("SP");
            self.c("M=M+1");
        }
    }

    fn call(&mut self, name: &str, n_args: u16) {
        let return_label = format!("{}.{}$ret.{}", self.file, name, self.return_idx);
        self.return_idx += 1;

        // Save the caller frame: return address, then LCL/ARG/THIS/THAT.
        self.a_sym(&return_label);
        self.c("D=A");
        self.push_d();
        for saved in ["LCL", "ARG", "THIS", "THAT"] {
            self.a_sym(saved);
            self.c("D=M");
            self.push_d();
        }
        // ARG = SP - 5 - nArgs
        self.a_const(n_args);
        self.c("D=A");
        self.a_const(5);
        self.c("D=D+A");
        self.a_sym("SP");
        self.c("D=M-D");
        self.a_sym("ARG");
        self.c("M=D");
        // LCL = SP
        self.a_sym("SP");
        self.c("D=M");
        self.a_sym("LCL");
        self.c("M=D");
        self.a_sym(name);
        self.c("0;JMP");
        self.label(&return_label);
    }

    fn write_return(&mut self) {
        // frame = LCL (cursor in R14)
        self.a_sym("LCL");
        self.c("D=M");
        self.a_sym("R14");
        self.c("M=D");
        // Return address out first: *ARG below may overwrite it when the
        // callee took zero arguments.
        self.a_const(5);
        self.c("A=D-A");
        self.c("D=M");
        self.a_sym("R15");
        self.c("M=D");
        // *ARG = pop(); SP = ARG + 1
        self.a_sym("SP");
        self.c("A=M-1");
        self.c("D=M");
        self.a_sym("ARG");
        self.c("A=M");
        self.c("M=D");
        self.a_sym("ARG");
        self.c("D=M");
        self.a_sym("SP");
        self.c("M=D+1");
        // Walk the cursor down through the saved caller frame.
        for restored in ["THAT", "THIS", "ARG", "LCL"] {
            self.a_sym("R14");
            self.c("M=M-1");
            self.c("A=M");
            self.c("D=M");
            self.a_sym(restored);
            self.c("M=D");
        }
        self.a_sym("R15");
        self.c("A=M");
        self.c("0;JMP");
    }

    // ----- emit primitives -----

    fn scoped_label(&self, name: &str) -> String {
        format!("{}.{}${}", self.file, self.function, name)
    }

    /// Push `D` onto the stack.
    fn push_d(&mut self) {
        self.a_sym("SP");
        self.c("A=M");
        self.c("M=D");
        self.a_sym("SP");
        self.c("M=M+1");
    }

    /// Pop the stack top into `D`, leaving `A` at the popped slot.
    fn pop_to_d(&mut self) {
        self.a_sym("SP");
        self.c("M=M-1");
        self.c("A=M");
        self.c("D=M");
    }

    fn a_sym(&mut self, symbol: &str) {
        self.out.push('@');
        self.out.push_str(symbol);
        self.out.push('\n');
    }

    fn a_const(&mut self, value: u16) {
        self.out.push_str(&format!("@{value}\n"));
    }

    fn c(&mut self, instruction: &str) {
        self.out.push_str(instruction);
        self.out.push('\n');
    }

    fn label(&mut self, label: &str) {
        self.out.push_str(&format!("({label})\n"));
    }

    fn comment(&mut self, text: &str) {
        self.out.push_str("// ");
        self.out.push_str(text);
        self.out.push('\n');
    }
}
