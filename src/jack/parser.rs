//! # Jack Parser
//!
//! Recursive descent over the token stream with one-token lookahead,
//! driving the [`VmWriter`] inline; there is no intermediate AST. The
//! grammar rules map one-to-one onto `compile_*` methods; each consumes
//! exactly the tokens of its production and emits the corresponding VM
//! code.
//!
//! Expressions are folded strictly left to right. The language has no
//! operator precedence and none is added here.

use crate::error::{JackError, JackErrorKind, Span};
use crate::vm::parser::{ArithOp, Segment};

use super::symbols::{SymbolTable, VarKind};
use super::token::{Keyword, Token, TokenKind};
use super::tokenizer::Tokenizer;
use super::writer::VmWriter;

/// The three subroutine flavors; the flavor picks the prologue and the
/// meaning of a bare `return;`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubroutineKind {
    Constructor,
    Function,
    Method,
}

pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    table: SymbolTable,
    writer: VmWriter,
    class_name: String,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            tokens: Tokenizer::new(source),
            table: SymbolTable::new(),
            writer: VmWriter::new(),
            class_name: String::new(),
        }
    }

    /// Compile the single class this source file must contain.
    pub fn run(mut self) -> Result<String, JackError> {
        self.compile_class()?;
        Ok(self.writer.finish())
    }

    // ----- program structure -----

    fn compile_class(&mut self) -> Result<(), JackError> {
        self.expect_keyword(Keyword::Class)?;
        self.class_name = self.expect_identifier()?;
        self.expect_symbol('{')?;

        while let Some(kind) = self.peek_class_var_kind()? {
            self.compile_class_var_dec(kind)?;
        }
        while let Some(kind) = self.peek_subroutine_kind()? {
            self.compile_subroutine(kind)?;
        }

        self.expect_symbol('}')?;
        Ok(())
    }

    fn peek_class_var_kind(&mut self) -> Result<Option<VarKind>, JackError> {
        Ok(match self.tokens.peek()?.map(|t| &t.kind) {
            Some(TokenKind::Keyword(Keyword::Static)) => Some(VarKind::Static),
            Some(TokenKind::Keyword(Keyword::Field)) => Some(VarKind::Field),
            _ => None,
        })
    }

    fn peek_subroutine_kind(&mut self) -> Result<Option<SubroutineKind>, JackError> {
        Ok(match self.tokens.peek()?.map(|t| &t.kind) {
            Some(TokenKind::Keyword(Keyword::Constructor)) => Some(SubroutineKind::Constructor),
            Some(TokenKind::Keyword(Keyword::Function)) => Some(SubroutineKind::Function),
            Some(TokenKind::Keyword(Keyword::Method)) => Some(SubroutineKind::Method),
            _ => None,
        })
    }

    /// `('static' | 'field') type varName (',' varName)* ';'`
    fn compile_class_var_dec(&mut self, kind: VarKind) -> Result<(), JackError> {
        self.advance_required("a declaration keyword")?;
        let ty = self.expect_type()?;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, kind);
            if !self.eat_symbol(',')? {
                break;
            }
        }
        self.expect_symbol(';')?;
        Ok(())
    }

    /// `('constructor' | 'function' | 'method') ('void' | type) name
    /// '(' parameterList ')' subroutineBody`
    fn compile_subroutine(&mut self, kind: SubroutineKind) -> Result<(), JackError> {
        self.advance_required("a subroutine keyword")?;
        // Return type: `void` or a type; only its presence matters here.
        self.expect_return_type()?;
        let name = self.expect_identifier()?;

        self.table.start_subroutine();
        if kind == SubroutineKind::Method {
            // Slot ARG 0 is the receiver.
            let class_name = self.class_name.clone();
            self.table.define("this", &class_name, VarKind::Arg);
        }

        self.expect_symbol('(')?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        // Body: local declarations first, then the prologue, then code.
        self.expect_symbol('{')?;
        let mut n_locals = 0;
        while self.at_keyword(Keyword::Var)? {
            n_locals += self.compile_var_dec()?;
        }

        let full_name = format!("{}.{}", self.class_name, name);
        self.writer.function(&full_name, n_locals);
        match kind {
            SubroutineKind::Constructor => {
                let n_fields = self.table.count(VarKind::Field);
                self.writer.push(Segment::Constant, n_fields);
                self.writer.call("Memory.alloc", 1);
                self.writer.pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.writer.push(Segment::Argument, 0);
                self.writer.pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements(kind)?;
        self.expect_symbol('}')?;
        Ok(())
    }

    /// `((type varName) (',' type varName)*)?`
    fn compile_parameter_list(&mut self) -> Result<(), JackError> {
        if self.at_symbol(')')? {
            return Ok(());
        }
        loop {
            let ty = self.expect_type()?;
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, VarKind::Arg);
            if !self.eat_symbol(',')? {
                break;
            }
        }
        Ok(())
    }

    /// `'var' type varName (',' varName)* ';'`; returns the declared count.
    fn compile_var_dec(&mut self) -> Result<u16, JackError> {
        self.expect_keyword(Keyword::Var)?;
        let ty = self.expect_type()?;
        let mut count = 0;
        loop {
            let name = self.expect_identifier()?;
            self.table.define(&name, &ty, VarKind::Var);
            count += 1;
            if !self.eat_symbol(',')? {
                break;
            }
        }
        self.expect_symbol(';')?;
        Ok(count)
    }

    // ----- statements -----

    fn compile_statements(&mut self, kind: SubroutineKind) -> Result<(), JackError> {
        loop {
            match self.tokens.peek()?.map(|t| &t.kind) {
                Some(TokenKind::Keyword(Keyword::Let)) => self.compile_let()?,
                Some(TokenKind::Keyword(Keyword::If)) => self.compile_if(kind)?,
                Some(TokenKind::Keyword(Keyword::While)) => self.compile_while(kind)?,
                Some(TokenKind::Keyword(Keyword::Do)) => self.compile_do()?,
                Some(TokenKind::Keyword(Keyword::Return)) => self.compile_return(kind)?,
                _ => return Ok(()),
            }
        }
    }

    /// `'let' varName ('[' expression ']')? '=' expression ';'`
    fn compile_let(&mut self) -> Result<(), JackError> {
        self.expect_keyword(Keyword::Let)?;
        let (name, span) = self.expect_identifier_spanned()?;
        let (segment, index) = self.resolve_variable(&name, span)?;

        if self.eat_symbol('[')? {
            // Array target: leave base + offset on the stack, then the
            // value, and route it through temp 0: evaluating the
            // right-hand side could itself rebind `pointer 1`.
            self.writer.push(segment, index);
            self.compile_expression()?;
            self.expect_symbol(']')?;
            self.writer.arithmetic(ArithOp::Add);
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.pop(Segment::Temp, 0);
            self.writer.pop(Segment::Pointer, 1);
            self.writer.push(Segment::Temp, 0);
            self.writer.pop(Segment::That, 0);
        } else {
            self.expect_symbol('=')?;
            self.compile_expression()?;
            self.expect_symbol(';')?;
            self.writer.pop(segment, index);
        }
        Ok(())
    }

    /// `'if' '(' expression ')' '{' statements '}' ('else' '{' statements '}')?`
    fn compile_if(&mut self, kind: SubroutineKind) -> Result<(), JackError> {
        self.expect_keyword(Keyword::If)?;
        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.arithmetic(ArithOp::Not);
        let else_label = self.writer.fresh_label(&self.class_name);
        self.writer.if_goto(&else_label);

        self.expect_symbol('{')?;
        self.compile_statements(kind)?;
        self.expect_symbol('}')?;

        let end_label = self.writer.fresh_label(&self.class_name);
        self.writer.goto(&end_label);
        self.writer.label(&else_label);

        if self.at_keyword(Keyword::Else)? {
            self.expect_keyword(Keyword::Else)?;
            self.expect_symbol('{')?;
            self.compile_statements(kind)?;
            self.expect_symbol('}')?;
        }
        self.writer.label(&end_label);
        Ok(())
    }

    /// `'while' '(' expression ')' '{' statements '}'`
    fn compile_while(&mut self, kind: SubroutineKind) -> Result<(), JackError> {
        self.expect_keyword(Keyword::While)?;

        let loop_label = self.writer.fresh_label(&self.class_name);
        self.writer.label(&loop_label);

        self.expect_symbol('(')?;
        self.compile_expression()?;
        self.expect_symbol(')')?;

        self.writer.arithmetic(ArithOp::Not);
        let exit_label = self.writer.fresh_label(&self.class_name);
        self.writer.if_goto(&exit_label);

        self.expect_symbol('{')?;
        self.compile_statements(kind)?;
        self.expect_symbol('}')?;

        self.writer.goto(&loop_label);
        self.writer.label(&exit_label);
        Ok(())
    }

    /// `'do' subroutineCall ';'`; the result is discarded.
    fn compile_do(&mut self) -> Result<(), JackError> {
        self.expect_keyword(Keyword::Do)?;
        let name = self.expect_identifier()?;
        self.compile_subroutine_call(&name)?;
        self.expect_symbol(';')?;
        self.writer.pop(Segment::Temp, 0);
        Ok(())
    }

    /// `'return' expression? ';'`
    fn compile_return(&mut self, kind: SubroutineKind) -> Result<(), JackError> {
        self.expect_keyword(Keyword::Return)?;
        if self.at_symbol(';')? {
            // Void subroutines return 0; a bare return in a constructor
            // returns the allocated object, per the Jack convention.
            if kind == SubroutineKind::Constructor {
                self.writer.push(Segment::Pointer, 0);
            } else {
                self.writer.push(Segment::Constant, 0);
            }
        } else {
            self.compile_expression()?;
        }
        self.expect_symbol(';')?;
        self.writer.ret();
        Ok(())
    }

    // ----- expressions -----

    /// `term (op term)*`, folded left to right.
    fn compile_expression(&mut self) -> Result<(), JackError> {
        self.compile_term()?;
        while let Some(op) = self.peek_infix_op()? {
            self.advance_required("an operator")?;
            self.compile_term()?;
            self.emit_infix_op(op);
        }
        Ok(())
    }

    fn peek_infix_op(&mut self) -> Result<Option<char>, JackError> {
        Ok(match self.tokens.peek()?.map(|t| &t.kind) {
            Some(TokenKind::Symbol(c)) if "+-*/&|<>=".contains(*c) => Some(*c),
            _ => None,
        })
    }

    fn emit_infix_op(&mut self, op: char) {
        match op {
            '+' => self.writer.arithmetic(ArithOp::Add),
            '-' => self.writer.arithmetic(ArithOp::Sub),
            '&' => self.writer.arithmetic(ArithOp::And),
            '|' => self.writer.arithmetic(ArithOp::Or),
            '<' => self.writer.arithmetic(ArithOp::Lt),
            '>' => self.writer.arithmetic(ArithOp::Gt),
            '=' => self.writer.arithmetic(ArithOp::Eq),
            '*' => self.writer.call("Math.multiply", 2),
            '/' => self.writer.call("Math.divide", 2),
            _ => unreachable!("not an infix operator: {op}"),
        }
    }

    fn compile_term(&mut self) -> Result<(), JackError> {
        let token = self.advance_required("a term")?;
        match token.kind {
            TokenKind::IntConst(value) => {
                self.writer.push(Segment::Constant, value);
            }
            TokenKind::StringConst(value) => self.compile_string(&value),
            TokenKind::Keyword(Keyword::True) => {
                self.writer.push(Segment::Constant, 0);
                self.writer.arithmetic(ArithOp::Not);
            }
            TokenKind::Keyword(Keyword::False) | TokenKind::Keyword(Keyword::Null) => {
                self.writer.push(Segment::Constant, 0);
            }
            TokenKind::Keyword(Keyword::This) => {
                self.writer.push(Segment::Pointer, 0);
            }
            TokenKind::Symbol('-') => {
                self.compile_term()?;
                self.writer.arithmetic(ArithOp::Neg);
            }
            TokenKind::Symbol('~') => {
                self.compile_term()?;
                self.writer.arithmetic(ArithOp::Not);
            }
            TokenKind::Symbol('^') => {
                self.compile_term()?;
                self.writer.arithmetic(ArithOp::ShiftLeft);
            }
            TokenKind::Symbol('#') => {
                self.compile_term()?;
                self.writer.arithmetic(ArithOp::ShiftRight);
            }
            TokenKind::Symbol('(') => {
                self.compile_expression()?;
                self.expect_symbol(')')?;
            }
            TokenKind::Identifier(ref name) => {
                // Variable, array entry or subroutine call, decided by
                // one character of lookahead.
                if self.at_symbol('[')? {
                    let (segment, index) = self.resolve_variable(name, token.span)?;
                    self.writer.push(segment, index);
                    self.expect_symbol('[')?;
                    self.compile_expression()?;
                    self.expect_symbol(']')?;
                    self.writer.arithmetic(ArithOp::Add);
                    self.writer.pop(Segment::Pointer, 1);
                    self.writer.push(Segment::That, 0);
                } else if self.at_symbol('(')? || self.at_symbol('.')? {
                    self.compile_subroutine_call(name)?;
                } else {
                    let (segment, index) = self.resolve_variable(name, token.span)?;
                    self.writer.push(segment, index);
                }
            }
            other => {
                return Err(JackError::new(
                    JackErrorKind::Expected {
                        expected: "a term".to_string(),
                        found: other.to_string(),
                    },
                    token.span,
                ));
            }
        }
        Ok(())
    }

    /// `name '(' ... ')'` or `qual '.' name '(' ... ')'`, with the
    /// receiver resolution rules:
    ///
    /// - bare `name(...)` is a method call on the current object;
    /// - `qual.name(...)` where `qual` is a variable in scope is a method
    ///   call on that object, dispatched on its declared type;
    /// - otherwise `qual` is a class name and this is a function or
    ///   constructor call.
    fn compile_subroutine_call(&mut self, first: &str) -> Result<(), JackError> {
        let callee;
        let mut receiver_args = 0;

        if self.eat_symbol('.')? {
            let method = self.expect_identifier()?;
            if let Some(info) = self.table.resolve(first) {
                let (segment, index, ty) = (info.kind.segment(), info.index, info.ty.clone());
                self.writer.push(segment, index);
                receiver_args = 1;
                callee = format!("{}.{}", ty, method);
            } else {
                callee = format!("{}.{}", first, method);
            }
        } else {
            self.writer.push(Segment::Pointer, 0);
            receiver_args = 1;
            callee = format!("{}.{}", self.class_name, first);
        }

        self.expect_symbol('(')?;
        let n_args = self.compile_expression_list()?;
        self.expect_symbol(')')?;
        self.writer.call(&callee, n_args + receiver_args);
        Ok(())
    }

    /// `(expression (',' expression)*)?`; returns the argument count.
    fn compile_expression_list(&mut self) -> Result<u16, JackError> {
        let mut count = 0;
        if self.at_symbol(')')? {
            return Ok(count);
        }
        loop {
            self.compile_expression()?;
            count += 1;
            if !self.eat_symbol(',')? {
                break;
            }
        }
        Ok(count)
    }

    /// `push constant len; call String.new 1`, then append each character.
    fn compile_string(&mut self, value: &str) {
        self.writer.push(Segment::Constant, value.len() as u16);
        self.writer.call("String.new", 1);
        for byte in value.bytes() {
            self.writer.push(Segment::Constant, byte as u16);
            self.writer.call("String.appendChar", 2);
        }
    }

    // ----- token helpers -----

    fn advance_required(&mut self, expected: &str) -> Result<Token, JackError> {
        self.tokens.advance()?.ok_or_else(|| {
            JackError::new(
                JackErrorKind::UnexpectedEof(expected.to_string()),
                self.tokens.here(),
            )
        })
    }

    fn expect_symbol(&mut self, symbol: char) -> Result<(), JackError> {
        let token = self.advance_required(&format!("`{symbol}`"))?;
        match token.kind {
            TokenKind::Symbol(c) if c == symbol => Ok(()),
            other => Err(JackError::new(
                JackErrorKind::Expected {
                    expected: format!("`{symbol}`"),
                    found: other.to_string(),
                },
                token.span,
            )),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), JackError> {
        let token = self.advance_required(&format!("`{keyword}`"))?;
        match token.kind {
            TokenKind::Keyword(kw) if kw == keyword => Ok(()),
            other => Err(JackError::new(
                JackErrorKind::Expected {
                    expected: format!("`{keyword}`"),
                    found: other.to_string(),
                },
                token.span,
            )),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, JackError> {
        self.expect_identifier_spanned().map(|(name, _)| name)
    }

    fn expect_identifier_spanned(&mut self) -> Result<(String, Span), JackError> {
        let token = self.advance_required("an identifier")?;
        match token.kind {
            TokenKind::Identifier(name) => Ok((name, token.span)),
            other => Err(JackError::new(
                JackErrorKind::Expected {
                    expected: "an identifier".to_string(),
                    found: other.to_string(),
                },
                token.span,
            )),
        }
    }

    /// `'int' | 'char' | 'boolean' | className`
    fn expect_type(&mut self) -> Result<String, JackError> {
        let token = self.advance_required("a type")?;
        match token.kind {
            TokenKind::Keyword(Keyword::Int) => Ok("int".to_string()),
            TokenKind::Keyword(Keyword::Char) => Ok("char".to_string()),
            TokenKind::Keyword(Keyword::Boolean) => Ok("boolean".to_string()),
            TokenKind::Identifier(name) => Ok(name),
            other => Err(JackError::new(
                JackErrorKind::Expected {
                    expected: "a type".to_string(),
                    found: other.to_string(),
                },
                token.span,
            )),
        }
    }

    fn expect_return_type(&mut self) -> Result<(), JackError> {
        let token = self.advance_required("a return type")?;
        match token.kind {
            TokenKind::Keyword(
                Keyword::Void | Keyword::Int | Keyword::Char | Keyword::Boolean,
            )
            | TokenKind::Identifier(_) => Ok(()),
            other => Err(JackError::new(
                JackErrorKind::Expected {
                    expected: "a return type".to_string(),
                    found: other.to_string(),
                },
                token.span,
            )),
        }
    }

    fn at_symbol(&mut self, symbol: char) -> Result<bool, JackError> {
        Ok(matches!(
            self.tokens.peek()?.map(|t| &t.kind),
            Some(TokenKind::Symbol(c)) if *c == symbol
        ))
    }

    /// Consume `symbol` if it is next; report whether it was.
    fn eat_symbol(&mut self, symbol: char) -> Result<bool, JackError> {
        if self.at_symbol(symbol)? {
            self.tokens.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn at_keyword(&mut self, keyword: Keyword) -> Result<bool, JackError> {
        Ok(matches!(
            self.tokens.peek()?.map(|t| &t.kind),
            Some(TokenKind::Keyword(kw)) if *kw == keyword
        ))
    }

    fn resolve_variable(&self, name: &str, span: Span) -> Result<(Segment, u16), JackError> {
        match self.table.resolve(name) {
            Some(info) => Ok((info.kind.segment(), info.index)),
            None => Err(JackError::new(
                JackErrorKind::UnknownVariable(name.to_string()),
                span,
            )),
        }
    }
}
