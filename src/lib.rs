//! Analyzer front end for a restricted C#-like language: a tokenizer, a
//! recursive-descent parser, a line-oriented structural checker, and a
//! token-stream semantic checker, all reporting through one diagnostic
//! collection grouped by stage.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod limits;
pub mod parser;
pub mod report;
pub mod semantic;
pub mod structure;

pub use diagnostics::{Diagnostic, Diagnostics, Severity, Stage};
pub use lexer::{tokenize, Token, TokenKind};
pub use limits::AnalyzerLimits;
pub use semantic::{check_semantics, SymbolTable, SymbolTableEntry, TypeDescriptor};
pub use structure::check_basic_structure;

use ast::Program;

/// Tokenize and parse the input, returning the program and all Lexical and
/// Syntax diagnostics.
pub fn parse_program(source: &str, limits: &AnalyzerLimits) -> (Program, Diagnostics) {
    let (tokens, mut diagnostics) = tokenize(source, limits);
    let (program, syntax_diagnostics) = parser::parse(&tokens, limits);
    diagnostics.extend(syntax_diagnostics);
    (program, diagnostics)
}

/// Parse the input and return only the diagnostics. Empty means the program
/// is lexically and grammatically valid.
pub fn parse_syntax(source: &str, limits: &AnalyzerLimits) -> Diagnostics {
    let (_, diagnostics) = parse_program(source, limits);
    diagnostics
}
