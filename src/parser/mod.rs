// Parser module - recursive descent over the token stream
mod error;
mod expressions;
mod helpers;
mod items;
mod statements;

pub use error::ParseError;

use crate::ast::{Expr, Program};
use crate::diagnostics::{Diagnostics, Stage};
use crate::lexer::{Token, TokenKind};
use crate::limits::AnalyzerLimits;

// Parser structure
pub struct Parser<'a> {
    tokens: &'a [Token],
    current: usize,
    diagnostics: Diagnostics,
    limits: &'a AnalyzerLimits,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], limits: &'a AnalyzerLimits) -> Self {
        Self {
            tokens,
            current: 0,
            diagnostics: Diagnostics::new(),
            limits,
        }
    }

    /// Parse a whole program.
    ///
    /// Error policy: on a malformed top-level declaration, record a Syntax
    /// diagnostic and resume at the next top-level declaration boundary
    /// (a `using`, `class`, or access modifier followed by `class`), so one
    /// bad class does not hide errors in the rest of the input.
    pub fn parse_program(mut self) -> (Program, Diagnostics) {
        let mut program = Program::default();

        while !self.at_end() {
            let result = if self.peek_kind_is(TokenKind::Using) {
                self.parse_using().map(|u| program.usings.push(u))
            } else {
                self.parse_class().map(|c| program.classes.push(c))
            };

            if let Err(e) = result {
                self.record_error(e);
                self.synchronize_top_level();
            }
        }

        // The grammar requires at least one class
        if program.classes.is_empty() && self.diagnostics.is_empty() {
            let line = self.current_line();
            self.diagnostics.error(
                Stage::Syntax,
                line,
                "Expected at least one class declaration".to_string(),
            );
        }

        (program, self.diagnostics)
    }

    pub(super) fn record_error(&mut self, error: ParseError) {
        self.diagnostics
            .error(Stage::Syntax, error.line, error.message);
    }

    /// Skip forward to the next top-level declaration boundary
    fn synchronize_top_level(&mut self) {
        while let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Using | TokenKind::Class => return,
                kind if kind.is_access_modifier()
                    && self.peek_next_kind_is(TokenKind::Class) =>
                {
                    return;
                }
                _ => self.advance(),
            }
        }
    }
}

// Public API

/// Parse a token stream into a program plus syntax diagnostics. An empty
/// diagnostic set means the program is fully valid.
pub fn parse(tokens: &[Token], limits: &AnalyzerLimits) -> (Program, Diagnostics) {
    Parser::new(tokens, limits).parse_program()
}

/// Parse a token slice as a single expression. Used by the semantic checker
/// to classify compound initializer and assignment right-hand sides.
pub(crate) fn parse_expression_slice(
    tokens: &[Token],
    limits: &AnalyzerLimits,
) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(tokens, limits);
    let expr = parser.parse_expression(0, 1)?;
    if let Some(extra) = parser.peek() {
        return Err(ParseError::unexpected_token("end of expression", extra));
    }
    Ok(expr)
}
