use crate::lexer::Token;

// Parse error
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
}

impl ParseError {
    pub(super) fn new(message: String, line: usize) -> Self {
        Self { message, line }
    }

    pub(super) fn unexpected_token(expected: &str, token: &Token) -> Self {
        Self {
            message: format!("Expected {}, found '{}'", expected, token.text),
            line: token.line,
        }
    }

    pub(super) fn unexpected_eof(expected: &str, line: usize) -> Self {
        Self {
            message: format!("Unexpected end of file: expected {}", expected),
            line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
