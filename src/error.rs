//! Source locations and the error types shared by the three tools.
//!
//! Every stage reports errors tagged with a [`Span`] so the driver can print
//! `ERROR (line L:C): message` for the offending input line. The assembler
//! and VM translator accumulate errors and keep scanning; the Jack parser
//! fails fast because recursive descent cannot meaningfully resync without
//! a recovery grammar.

use std::fmt;

use thiserror::Error;

/// A half-open byte range in the source, with the line/column of its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// 1-indexed line number.
    pub line: usize,
    /// 1-indexed column number.
    pub col: usize,
}

impl Span {
    /// Span covering a whole source line, when byte offsets are not tracked.
    pub fn line(line: usize) -> Self {
        Span {
            start: 0,
            end: 0,
            line,
            col: 1,
        }
    }
}

/// An error from the assembler, tagged with the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    pub kind: AsmErrorKind,
    pub span: Span,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, span: Span) -> Self {
        AsmError { kind, span }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR (line {}:{}): {}",
            self.span.line, self.span.col, self.kind
        )
    }
}

impl std::error::Error for AsmError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmErrorKind {
    #[error("address `{0}` is out of range (0-32767)")]
    AddressOutOfRange(u32),
    #[error("`@` must be followed by a symbol or a decimal address")]
    EmptyAddress,
    #[error("malformed label pseudo-command")]
    MalformedLabel,
    #[error("label `{0}` is already bound to address {1}")]
    DuplicateLabel(String, u16),
    #[error("unknown comp mnemonic `{0}`")]
    UnknownComp(String),
    #[error("unknown dest mnemonic `{0}`")]
    UnknownDest(String),
    #[error("unknown jump mnemonic `{0}`")]
    UnknownJump(String),
    #[error("instruction has no comp field")]
    MissingComp,
}

/// An error from the VM translator, tagged with the offending line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmError {
    pub kind: VmErrorKind,
    pub span: Span,
}

impl VmError {
    pub fn new(kind: VmErrorKind, span: Span) -> Self {
        VmError { kind, span }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR (line {}:{}): {}",
            self.span.line, self.span.col, self.kind
        )
    }
}

impl std::error::Error for VmError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmErrorKind {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("unknown segment `{0}`")]
    UnknownSegment(String),
    #[error("`pop constant` is not a valid command")]
    PopConstant,
    #[error("`{0}` expects {1} arguments")]
    WrongArity(String, usize),
    #[error("`{0}` is not a valid index")]
    BadIndex(String),
}

/// An error from the Jack front-end, tagged with the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JackError {
    pub kind: JackErrorKind,
    pub span: Span,
}

impl JackError {
    pub fn new(kind: JackErrorKind, span: Span) -> Self {
        JackError { kind, span }
    }
}

impl fmt::Display for JackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR (line {}:{}): {}",
            self.span.line, self.span.col, self.kind
        )
    }
}

impl std::error::Error for JackError {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JackErrorKind {
    #[error("unexpected character `{0}`")]
    UnexpectedCharacter(char),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("integer constant `{0}` is out of range (0-32767)")]
    IntOutOfRange(String),
    #[error("expected {expected}, found `{found}`")]
    Expected { expected: String, found: String },
    #[error("unexpected end of input, expected {0}")]
    UnexpectedEof(String),
    #[error("`{0}` is not a variable in scope")]
    UnknownVariable(String),
}
