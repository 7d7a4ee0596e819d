//! # VM Command Scanner
//!
//! Parses `.vm` text into typed [`VmCommand`]s. One command per line,
//! whitespace-separated tokens, `//` comments tolerated anywhere.

use std::fmt;

use crate::error::{Span, VmError, VmErrorKind};

/// A VM memory segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Argument,
    Local,
    Static,
    Constant,
    This,
    That,
    Pointer,
    Temp,
}

impl Segment {
    pub fn parse(name: &str) -> Option<Segment> {
        let segment = match name {
            "argument" => Segment::Argument,
            "local" => Segment::Local,
            "static" => Segment::Static,
            "constant" => Segment::Constant,
            "this" => Segment::This,
            "that" => Segment::That,
            "pointer" => Segment::Pointer,
            "temp" => Segment::Temp,
            _ => return None,
        };
        Some(segment)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Segment::Argument => "argument",
            Segment::Local => "local",
            Segment::Static => "static",
            Segment::Constant => "constant",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        };
        f.write_str(name)
    }
}

/// A stack arithmetic/logic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
    ShiftLeft,
    ShiftRight,
}

impl ArithOp {
    pub fn parse(name: &str) -> Option<ArithOp> {
        let op = match name {
            "add" => ArithOp::Add,
            "sub" => ArithOp::Sub,
            "neg" => ArithOp::Neg,
            "eq" => ArithOp::Eq,
            "gt" => ArithOp::Gt,
            "lt" => ArithOp::Lt,
            "and" => ArithOp::And,
            "or" => ArithOp::Or,
            "not" => ArithOp::Not,
            "shiftleft" => ArithOp::ShiftLeft,
            "shiftright" => ArithOp::ShiftRight,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Neg => "neg",
            ArithOp::Eq => "eq",
            ArithOp::Gt => "gt",
            ArithOp::Lt => "lt",
            ArithOp::And => "and",
            ArithOp::Or => "or",
            ArithOp::Not => "not",
            ArithOp::ShiftLeft => "shiftleft",
            ArithOp::ShiftRight => "shiftright",
        };
        f.write_str(name)
    }
}

/// One parsed VM command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VmCommand {
    Arithmetic(ArithOp),
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, n_locals: u16 },
    Call { name: String, n_args: u16 },
    Return,
}

impl fmt::Display for VmCommand {
    /// Renders the command in its source syntax; used for the
    /// `// <original command>` comments in the emitted assembly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmCommand::Arithmetic(op) => write!(f, "{op}"),
            VmCommand::Push { segment, index } => write!(f, "push {segment} {index}"),
            VmCommand::Pop { segment, index } => write!(f, "pop {segment} {index}"),
            VmCommand::Label(name) => write!(f, "label {name}"),
            VmCommand::Goto(name) => write!(f, "goto {name}"),
            VmCommand::IfGoto(name) => write!(f, "if-goto {name}"),
            VmCommand::Function { name, n_locals } => write!(f, "function {name} {n_locals}"),
            VmCommand::Call { name, n_args } => write!(f, "call {name} {n_args}"),
            VmCommand::Return => f.write_str("return"),
        }
    }
}

/// A command together with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub command: VmCommand,
    pub span: Span,
}

pub struct ParseResult {
    pub commands: Vec<SourceCommand>,
    pub errors: Vec<VmError>,
}

/// Scan a whole `.vm` source, accumulating per-line errors.
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    let mut commands = Vec::new();
    let mut errors = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let span = Span::line(idx + 1);
        let code = match raw.find("//") {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let tokens: Vec<&str> = code.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        match parse_tokens(&tokens, span) {
            Ok(command) => commands.push(SourceCommand { command, span }),
            Err(err) => errors.push(err),
        }
    }

    ParseResult { commands, errors }
}

fn parse_tokens(tokens: &[&str], span: Span) -> Result<VmCommand, VmError> {
    let keyword = tokens[0];

    if let Some(op) = ArithOp::parse(keyword) {
        expect_arity(tokens, 1, span)?;
        return Ok(VmCommand::Arithmetic(op));
    }

    match keyword {
        "push" | "pop" => {
            expect_arity(tokens, 3, span)?;
            let segment = Segment::parse(tokens[1]).ok_or_else(|| {
                VmError::new(VmErrorKind::UnknownSegment(tokens[1].to_string()), span)
            })?;
            let index = parse_index(tokens[2], span)?;
            if keyword == "push" {
                Ok(VmCommand::Push { segment, index })
            } else if segment == Segment::Constant {
                Err(VmError::new(VmErrorKind::PopConstant, span))
            } else {
                Ok(VmCommand::Pop { segment, index })
            }
        }
        "label" => {
            expect_arity(tokens, 2, span)?;
            Ok(VmCommand::Label(tokens[1].to_string()))
        }
        "goto" => {
            expect_arity(tokens, 2, span)?;
            Ok(VmCommand::Goto(tokens[1].to_string()))
        }
        "if-goto" => {
            expect_arity(tokens, 2, span)?;
            Ok(VmCommand::IfGoto(tokens[1].to_string()))
        }
        "function" => {
            expect_arity(tokens, 3, span)?;
            Ok(VmCommand::Function {
                name: tokens[1].to_string(),
                n_locals: parse_index(tokens[2], span)?,
            })
        }
        "call" => {
            expect_arity(tokens, 3, span)?;
            Ok(VmCommand::Call {
                name: tokens[1].to_string(),
                n_args: parse_index(tokens[2], span)?,
            })
        }
        "return" => {
            expect_arity(tokens, 1, span)?;
            Ok(VmCommand::Return)
        }
        other => Err(VmError::new(
            VmErrorKind::UnknownCommand(other.to_string()),
            span,
        )),
    }
}

fn expect_arity(tokens: &[&str], expected: usize, span: Span) -> Result<(), VmError> {
    if tokens.len() == expected {
        Ok(())
    } else {
        Err(VmError::new(
            VmErrorKind::WrongArity(tokens[0].to_string(), expected - 1),
            span,
        ))
    }
}

fn parse_index(token: &str, span: Span) -> Result<u16, VmError> {
    token
        .parse::<u16>()
        .map_err(|_| VmError::new(VmErrorKind::BadIndex(token.to_string()), span))
}
