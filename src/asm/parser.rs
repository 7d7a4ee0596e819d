//! # Assembly Line Scanner
//!
//! Cleans raw `.asm` text and classifies each remaining line into a typed
//! [`Command`].
//!
//! ## Lexical Cleaning
//!
//! Per line: strip `//` comments (line or inline), drop *all* whitespace
//! (the language allows `D = M ; JMP`), skip anything left empty. The first
//! remaining byte classifies the command: `@` is an A-command, `(` is a
//! label pseudo-command, anything else must parse as `dest=comp;jump`.

use crate::error::{AsmError, AsmErrorKind, Span};

use super::encoder::{Comp, Dest, Jump};

/// Highest address expressible in an A-instruction's 15 payload bits.
pub const MAX_ADDRESS: u32 = 0x7FFF;

/// The operand of an A-command: a decimal literal or a symbol to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressExpr {
    Literal(u16),
    Symbol(String),
}

/// One cleaned assembly command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `@value`: load an address into `A`.
    A(AddressExpr),
    /// `dest=comp;jump` with either side optional.
    C { dest: Dest, comp: Comp, jump: Jump },
    /// `(NAME)`: bind `NAME` to the next instruction's address.
    Label(String),
}

/// A command together with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCommand {
    pub command: Command,
    pub span: Span,
}

pub struct ParseResult {
    pub commands: Vec<SourceCommand>,
    pub errors: Vec<AsmError>,
}

/// Scan a whole source file into commands, accumulating per-line errors.
#[must_use]
pub fn parse(source: &str) -> ParseResult {
    let mut commands = Vec::new();
    let mut errors = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let span = Span::line(idx + 1);
        let Some(cleaned) = clean_line(raw) else {
            continue;
        };
        match parse_command(&cleaned, span) {
            Ok(command) => commands.push(SourceCommand { command, span }),
            Err(err) => errors.push(err),
        }
    }

    ParseResult { commands, errors }
}

/// Strip comments and all whitespace; `None` if nothing is left.
fn clean_line(raw: &str) -> Option<String> {
    let code = match raw.find("//") {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    let cleaned: String = code.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn parse_command(line: &str, span: Span) -> Result<Command, AsmError> {
    match line.as_bytes()[0] {
        b'@' => parse_a_command(&line[1..], span),
        b'(' => parse_label(line, span),
        _ => parse_c_command(line, span),
    }
}

fn parse_a_command(operand: &str, span: Span) -> Result<Command, AsmError> {
    if operand.is_empty() {
        return Err(AsmError::new(AsmErrorKind::EmptyAddress, span));
    }
    if operand.bytes().all(|b| b.is_ascii_digit()) {
        let value: u32 = operand
            .parse()
            .map_err(|_| AsmError::new(AsmErrorKind::AddressOutOfRange(u32::MAX), span))?;
        if value > MAX_ADDRESS {
            return Err(AsmError::new(AsmErrorKind::AddressOutOfRange(value), span));
        }
        Ok(Command::A(AddressExpr::Literal(value as u16)))
    } else {
        Ok(Command::A(AddressExpr::Symbol(operand.to_string())))
    }
}

fn parse_label(line: &str, span: Span) -> Result<Command, AsmError> {
    let name = line
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AsmError::new(AsmErrorKind::MalformedLabel, span))?;
    Ok(Command::Label(name.to_string()))
}

fn parse_c_command(line: &str, span: Span) -> Result<Command, AsmError> {
    // dest=comp;jump, with missing fields defaulting to null.
    let (dest_part, rest) = match line.find('=') {
        Some(pos) => (&line[..pos], &line[pos + 1..]),
        None => ("", line),
    };
    let (comp_part, jump_part) = match rest.find(';') {
        Some(pos) => (&rest[..pos], &rest[pos + 1..]),
        None => (rest, ""),
    };

    if comp_part.is_empty() {
        return Err(AsmError::new(AsmErrorKind::MissingComp, span));
    }
    let dest = Dest::parse(dest_part)
        .ok_or_else(|| AsmError::new(AsmErrorKind::UnknownDest(dest_part.to_string()), span))?;
    let comp = Comp::parse(comp_part)
        .ok_or_else(|| AsmError::new(AsmErrorKind::UnknownComp(comp_part.to_string()), span))?;
    let jump = Jump::parse(jump_part)
        .ok_or_else(|| AsmError::new(AsmErrorKind::UnknownJump(jump_part.to_string()), span))?;

    Ok(Command::C { dest, comp, jump })
}
