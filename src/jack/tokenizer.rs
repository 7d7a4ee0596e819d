//! # Jack Tokenizer
//!
//! Pull-driven lexer over a byte cursor. The parser asks for one token at a
//! time (`peek`/`advance`), and the tokenizer moves past whitespace and
//! comments on demand.
//!
//! ## Comments vs. Strings
//!
//! `// ...`, `/* ... */` and `/** ... */` are comments, but only outside
//! string literals. Scanning character by character makes that structural:
//! a `"` is consumed as a string before any comment marker inside it can be
//! inspected, so `let s = "http://x";` lexes correctly with no look-behind.
//!
//! Jack sources are ASCII, so the cursor operates on a byte slice and byte
//! position doubles as character index.

use crate::error::{JackError, JackErrorKind, Span};

use super::token::{is_symbol, Keyword, Token, TokenKind};

/// Largest value an integer constant may hold.
const MAX_INT: u32 = 32767;

pub struct Tokenizer<'a> {
    bytes: &'a [u8],
    pos: usize,
    /// 1-indexed line of `pos`.
    line: usize,
    /// 1-indexed column of `pos`.
    col: usize,
    /// One-token lookahead slot.
    peeked: Option<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            peeked: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>, JackError> {
        if self.peeked.is_none() {
            self.peeked = self.lex_token()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Consume and return the next token; `None` at end of input.
    pub fn advance(&mut self) -> Result<Option<Token>, JackError> {
        if let Some(token) = self.peeked.take() {
            return Ok(Some(token));
        }
        self.lex_token()
    }

    /// Span of the current position, for end-of-input diagnostics.
    pub fn here(&self) -> Span {
        Span {
            start: self.pos,
            end: self.pos,
            line: self.line,
            col: self.col,
        }
    }

    // ----- cursor primitives -----

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.bytes.get(self.pos).copied()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(b)
    }

    fn make_span(&self, start: usize, line: usize, col: usize) -> Span {
        Span {
            start,
            end: self.pos,
            line,
            col,
        }
    }

    // ----- lexing -----

    fn lex_token(&mut self) -> Result<Option<Token>, JackError> {
        self.skip_trivia()?;

        let (start, line, col) = (self.pos, self.line, self.col);
        let Some(b) = self.peek_byte() else {
            return Ok(None);
        };

        let kind = match b {
            b'"' => self.lex_string()?,
            b'0'..=b'9' => self.lex_int()?,
            _ if is_symbol(b as char) => {
                self.bump();
                TokenKind::Symbol(b as char)
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => self.lex_word(),
            _ => {
                self.bump();
                return Err(JackError::new(
                    JackErrorKind::UnexpectedCharacter(b as char),
                    self.make_span(start, line, col),
                ));
            }
        };

        Ok(Some(Token {
            kind,
            span: self.make_span(start, line, col),
        }))
    }

    /// Skip whitespace and all three comment forms. `/**` is just a `/*`
    /// whose body starts with `*`.
    fn skip_trivia(&mut self) -> Result<(), JackError> {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some(b'/') if self.peek_byte_at(1) == Some(b'*') => {
                    let (start, line, col) = (self.pos, self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek_byte() {
                            Some(b'*') if self.peek_byte_at(1) == Some(b'/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                            None => {
                                return Err(JackError::new(
                                    JackErrorKind::UnterminatedComment,
                                    self.make_span(start, line, col),
                                ));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_string(&mut self) -> Result<TokenKind, JackError> {
        let (start, line, col) = (self.pos, self.line, self.col);
        self.bump(); // opening quote
        let mut value = String::new();
        loop {
            match self.peek_byte() {
                Some(b'"') => {
                    self.bump();
                    return Ok(TokenKind::StringConst(value));
                }
                Some(b'\n') | None => {
                    return Err(JackError::new(
                        JackErrorKind::UnterminatedString,
                        self.make_span(start, line, col),
                    ));
                }
                Some(b) => {
                    self.bump();
                    value.push(b as char);
                }
            }
        }
    }

    fn lex_int(&mut self) -> Result<TokenKind, JackError> {
        let (start, line, col) = (self.pos, self.line, self.col);
        let mut digits = String::new();
        while let Some(b @ b'0'..=b'9') = self.peek_byte() {
            self.bump();
            digits.push(b as char);
        }
        match digits.parse::<u32>() {
            Ok(value) if value <= MAX_INT => Ok(TokenKind::IntConst(value as u16)),
            _ => Err(JackError::new(
                JackErrorKind::IntOutOfRange(digits),
                self.make_span(start, line, col),
            )),
        }
    }

    fn lex_word(&mut self) -> TokenKind {
        let mut word = String::new();
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.bump();
                word.push(b as char);
            } else {
                break;
            }
        }
        match Keyword::parse(&word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier(word),
        }
    }
}
