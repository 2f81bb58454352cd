use std::iter::Peekable;
use std::str::CharIndices;

use crate::diagnostics::{Diagnostics, Stage};
use crate::limits::AnalyzerLimits;

// Token kinds

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Type keywords
    Int,
    Double,
    Float,
    Bool,
    StringType,
    Char,
    Var,
    List,

    // Declaration and control keywords
    For,
    If,
    Else,
    Class,
    Public,
    Private,
    Protected,
    Static,
    Return,
    Void,
    Using,
    New,
    True,
    False,

    // Library names the grammar consumes directly
    Console,
    WriteLine,
    ReadLine,
    Parse,
    Add,

    // Any other word from the reserved keyword table
    Reserved,

    // Identifiers and literals
    Identifier,
    IntConst(i64),
    FloatConst(f64),
    StringConst,

    // Multi-character operators
    Increment,   // ++
    Decrement,   // --
    AndAnd,      // &&
    OrOr,        // ||
    Le,          // <=
    Ge,          // >=
    EqEq,        // ==
    NotEq,       // !=
    PlusAssign,  // +=
    MinusAssign, // -=
    Arrow,       // ->

    // Single-character operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    Not,
    Lt,
    Gt,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
}

impl TokenKind {
    /// True for the type keywords that can open a variable declaration
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Int
                | TokenKind::Double
                | TokenKind::Float
                | TokenKind::Bool
                | TokenKind::StringType
                | TokenKind::Char
                | TokenKind::Var
                | TokenKind::List
        )
    }

    pub fn is_access_modifier(&self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Private | TokenKind::Protected | TokenKind::Static
        )
    }
}

/// Smallest classified lexical unit: a kind, its source text, and a 1-based
/// line number. String constants carry their content without the quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

// Keyword table: grammar keywords map to their own kinds, the rest of the
// C#-style reserved words map to Reserved so they can never become plain
// identifiers.
fn keyword_kind(text: &str) -> Option<TokenKind> {
    let kind = match text {
        "int" => TokenKind::Int,
        "double" => TokenKind::Double,
        "float" => TokenKind::Float,
        "bool" => TokenKind::Bool,
        "string" => TokenKind::StringType,
        "char" => TokenKind::Char,
        "var" => TokenKind::Var,
        "List" => TokenKind::List,
        "for" => TokenKind::For,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "class" => TokenKind::Class,
        "public" => TokenKind::Public,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "static" => TokenKind::Static,
        "return" => TokenKind::Return,
        "void" => TokenKind::Void,
        "using" => TokenKind::Using,
        "new" => TokenKind::New,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "Console" => TokenKind::Console,
        "WriteLine" => TokenKind::WriteLine,
        "ReadLine" => TokenKind::ReadLine,
        "Parse" => TokenKind::Parse,
        "Add" => TokenKind::Add,
        "abstract" | "as" | "base" | "break" | "byte" | "case" | "catch" | "const"
        | "continue" | "decimal" | "default" | "delegate" | "do" | "enum" | "event"
        | "extern" | "finally" | "foreach" | "goto" | "in" | "interface" | "internal"
        | "is" | "lock" | "long" | "namespace" | "null" | "object" | "out" | "override"
        | "params" | "readonly" | "ref" | "sealed" | "short" | "struct" | "switch"
        | "this" | "throw" | "try" | "typeof" | "uint" | "ulong" | "while" => {
            TokenKind::Reserved
        }
        _ => return None,
    };
    Some(kind)
}

// Tokenizer
//
// One instance per input: line numbers and byte offsets are absolute for
// the whole source, and error recovery never re-feeds a substring.
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
    line: usize,
    limits: &'a AnalyzerLimits,
    token_count: usize,
    stopped: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, limits: &'a AnalyzerLimits) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            pos: 0,
            line: 1,
            limits,
            token_count: 0,
            stopped: false,
        }
    }

    // Character navigation

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn peek_char2(&mut self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.peek().map(|(_, c)| *c)
    }

    fn consume_char(&mut self) -> Option<char> {
        if let Some((pos, ch)) = self.chars.next() {
            self.pos = pos + ch.len_utf8();
            if ch == '\n' {
                self.line += 1;
            }
            Some(ch)
        } else {
            None
        }
    }

    fn consume_while<F>(&mut self, predicate: F)
    where
        F: Fn(char) -> bool,
    {
        while let Some(c) = self.peek_char() {
            if predicate(c) {
                self.consume_char();
            } else {
                break;
            }
        }
    }

    /// Produce the next token, or None at end of input. Malformed input is
    /// reported into `diagnostics` and skipped; this never fails.
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        if self.stopped {
            return None;
        }

        loop {
            if self.token_count >= self.limits.max_token_count {
                diagnostics.error(
                    Stage::Lexical,
                    self.line,
                    format!(
                        "Token limit exceeded: {} tokens (max: {})",
                        self.token_count, self.limits.max_token_count
                    ),
                );
                self.stopped = true;
                return None;
            }

            let c = self.peek_char()?;
            let start_line = self.line;

            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.consume_char();
                    continue;
                }
                '/' => {
                    match self.peek_char2() {
                        Some('/') => {
                            self.skip_line_comment(diagnostics);
                            continue;
                        }
                        Some('*') => {
                            self.skip_block_comment(diagnostics);
                            continue;
                        }
                        _ => {
                            self.consume_char();
                            return self.token(TokenKind::Slash, "/", start_line);
                        }
                    }
                }
                '"' => {
                    return self.lex_string(diagnostics);
                }
                c if c.is_ascii_digit() => {
                    match self.lex_number(diagnostics) {
                        Some(token) => return Some(token),
                        None => continue, // malformed literal was reported and skipped
                    }
                }
                c if is_ident_start(c) => {
                    return self.lex_ident_or_keyword(diagnostics);
                }
                c if !c.is_ascii() => {
                    // The original dropped these bytes silently; report instead
                    self.consume_char();
                    diagnostics.error(
                        Stage::Lexical,
                        start_line,
                        format!("Non-ASCII character '{}' is not allowed", c),
                    );
                    continue;
                }
                _ => {
                    match self.lex_operator(c, start_line) {
                        Some(token) => return Some(token),
                        None => {
                            self.consume_char();
                            diagnostics.error(
                                Stage::Lexical,
                                start_line,
                                format!("Character '{}' is not defined", c),
                            );
                            continue;
                        }
                    }
                }
            }
        }
    }

    fn token(&mut self, kind: TokenKind, text: impl Into<String>, line: usize) -> Option<Token> {
        self.token_count += 1;
        Some(Token::new(kind, text, line))
    }

    // Operators, longest match first

    fn lex_operator(&mut self, c: char, line: usize) -> Option<Token> {
        let next = self.peek_char2();

        let (kind, text, chars) = match (c, next) {
            ('+', Some('+')) => (TokenKind::Increment, "++", 2),
            ('+', Some('=')) => (TokenKind::PlusAssign, "+=", 2),
            ('+', _) => (TokenKind::Plus, "+", 1),
            ('-', Some('-')) => (TokenKind::Decrement, "--", 2),
            ('-', Some('=')) => (TokenKind::MinusAssign, "-=", 2),
            ('-', Some('>')) => (TokenKind::Arrow, "->", 2),
            ('-', _) => (TokenKind::Minus, "-", 1),
            ('&', Some('&')) => (TokenKind::AndAnd, "&&", 2),
            ('|', Some('|')) => (TokenKind::OrOr, "||", 2),
            ('<', Some('=')) => (TokenKind::Le, "<=", 2),
            ('<', _) => (TokenKind::Lt, "<", 1),
            ('>', Some('=')) => (TokenKind::Ge, ">=", 2),
            ('>', _) => (TokenKind::Gt, ">", 1),
            ('=', Some('=')) => (TokenKind::EqEq, "==", 2),
            ('=', _) => (TokenKind::Assign, "=", 1),
            ('!', Some('=')) => (TokenKind::NotEq, "!=", 2),
            ('!', _) => (TokenKind::Not, "!", 1),
            ('*', _) => (TokenKind::Star, "*", 1),
            ('%', _) => (TokenKind::Percent, "%", 1),
            ('(', _) => (TokenKind::LParen, "(", 1),
            (')', _) => (TokenKind::RParen, ")", 1),
            ('{', _) => (TokenKind::LBrace, "{", 1),
            ('}', _) => (TokenKind::RBrace, "}", 1),
            ('[', _) => (TokenKind::LBracket, "[", 1),
            (']', _) => (TokenKind::RBracket, "]", 1),
            (';', _) => (TokenKind::Semicolon, ";", 1),
            (',', _) => (TokenKind::Comma, ",", 1),
            ('.', _) => (TokenKind::Dot, ".", 1),
            (':', _) => (TokenKind::Colon, ":", 1),
            _ => return None,
        };

        for _ in 0..chars {
            self.consume_char();
        }
        self.token(kind, text, line)
    }

    // Identifiers and keywords

    fn lex_ident_or_keyword(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.pos;
        let start_line = self.line;

        self.consume_char();
        self.consume_while(is_ident_continue);

        let text = &self.source[start..self.pos];

        if text.len() > self.limits.max_identifier_length {
            diagnostics.error(
                Stage::Lexical,
                start_line,
                format!(
                    "Identifier too long: {} bytes (max: {} bytes)",
                    text.len(),
                    self.limits.max_identifier_length
                ),
            );
            self.stopped = true;
            return None;
        }

        let kind = keyword_kind(text).unwrap_or(TokenKind::Identifier);
        self.token(kind, text.to_string(), start_line)
    }

    // Numeric literals

    fn lex_number(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start = self.pos;
        let start_line = self.line;

        self.consume_while(|c| c.is_ascii_digit());

        // A digit run followed by '.' and more digits is a float constant
        if self.peek_char() == Some('.')
            && self.peek_char2().map_or(false, |c| c.is_ascii_digit())
        {
            self.consume_char(); // '.'
            self.consume_while(|c| c.is_ascii_digit());

            let text = self.source[start..self.pos].to_string();

            // A trailing f/F suffix is consumed but stripped from the value
            if matches!(self.peek_char(), Some('f') | Some('F')) {
                self.consume_char();
            }

            return match text.parse::<f64>() {
                Ok(value) => self.token(TokenKind::FloatConst(value), text, start_line),
                Err(_) => {
                    diagnostics.error(
                        Stage::Lexical,
                        start_line,
                        format!("Invalid float literal '{}'", text),
                    );
                    None
                }
            };
        }

        let text = self.source[start..self.pos].to_string();
        match text.parse::<i64>() {
            Ok(value) => self.token(TokenKind::IntConst(value), text, start_line),
            Err(_) => {
                diagnostics.error(
                    Stage::Lexical,
                    start_line,
                    format!("Integer literal '{}' is too large", text),
                );
                None
            }
        }
    }

    // String literals: no escape processing; an unterminated string runs to
    // end of line and is accepted. Value excludes the quotes.

    fn lex_string(&mut self, diagnostics: &mut Diagnostics) -> Option<Token> {
        let start_line = self.line;
        self.consume_char(); // opening quote
        let content_start = self.pos;

        loop {
            match self.peek_char() {
                Some('"') => {
                    let content = self.source[content_start..self.pos].to_string();
                    self.consume_char(); // closing quote
                    return self.check_string_length(content, start_line, diagnostics);
                }
                Some('\n') | None => {
                    let content = self.source[content_start..self.pos].to_string();
                    return self.check_string_length(content, start_line, diagnostics);
                }
                Some(_) => {
                    self.consume_char();
                }
            }
        }
    }

    fn check_string_length(
        &mut self,
        content: String,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) -> Option<Token> {
        if content.len() > self.limits.max_string_length {
            diagnostics.error(
                Stage::Lexical,
                line,
                format!(
                    "String literal too long: {} bytes (max: {} bytes)",
                    content.len(),
                    self.limits.max_string_length
                ),
            );
            self.stopped = true;
            return None;
        }
        self.token(TokenKind::StringConst, content, line)
    }

    // Comments: fully discarded, but line accounting must stay correct

    fn skip_line_comment(&mut self, diagnostics: &mut Diagnostics) {
        let start = self.pos;
        let start_line = self.line;

        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.consume_char();
            if self.pos - start > self.limits.max_comment_length {
                diagnostics.error(
                    Stage::Lexical,
                    start_line,
                    format!(
                        "Comment too long (max: {} bytes)",
                        self.limits.max_comment_length
                    ),
                );
                self.stopped = true;
                return;
            }
        }
    }

    fn skip_block_comment(&mut self, diagnostics: &mut Diagnostics) {
        let start = self.pos;
        let start_line = self.line;

        self.consume_char(); // '/'
        self.consume_char(); // '*'

        loop {
            match self.peek_char() {
                None => {
                    diagnostics.error(
                        Stage::Lexical,
                        start_line,
                        "Unterminated block comment".to_string(),
                    );
                    return;
                }
                Some('*') if self.peek_char2() == Some('/') => {
                    self.consume_char();
                    self.consume_char();
                    return;
                }
                Some(_) => {
                    self.consume_char();
                    if self.pos - start > self.limits.max_comment_length {
                        diagnostics.error(
                            Stage::Lexical,
                            start_line,
                            format!(
                                "Comment too long (max: {} bytes)",
                                self.limits.max_comment_length
                            ),
                        );
                        self.stopped = true;
                        return;
                    }
                }
            }
        }
    }
}

// Helper functions

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Public API

/// Converts source text into an ordered token sequence plus the lexical
/// diagnostics discovered along the way. Never fails: unrecognized input is
/// reported and skipped.
pub fn tokenize(source: &str, limits: &AnalyzerLimits) -> (Vec<Token>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();

    if source.len() > limits.max_input_size {
        diagnostics.error(
            Stage::Lexical,
            1,
            format!(
                "Input too large: {} bytes (max: {} bytes)",
                source.len(),
                limits.max_input_size
            ),
        );
        return (Vec::new(), diagnostics);
    }

    let mut lexer = Lexer::new(source, limits);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token(&mut diagnostics) {
        tokens.push(token);
    }

    (tokens, diagnostics)
}

// Tests
