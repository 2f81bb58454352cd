use super::error::ParseError;
use crate::ast::BinOp;
use crate::lexer::{Token, TokenKind};

// Operator precedence levels, lowest binding first. Unary operators bind
// tighter than any binary operator and are handled in parse_unary.
pub(super) fn binary_op(token_kind: &TokenKind) -> Option<(u8, BinOp)> {
    let entry = match token_kind {
        TokenKind::OrOr => (1, BinOp::Or),
        TokenKind::AndAnd => (2, BinOp::And),
        TokenKind::Gt => (3, BinOp::Gt),
        TokenKind::Lt => (3, BinOp::Lt),
        TokenKind::Ge => (3, BinOp::Ge),
        TokenKind::Le => (3, BinOp::Le),
        TokenKind::EqEq => (3, BinOp::Eq),
        TokenKind::NotEq => (3, BinOp::Ne),
        TokenKind::Plus => (4, BinOp::Add),
        TokenKind::Minus => (4, BinOp::Sub),
        TokenKind::Star => (5, BinOp::Mul),
        TokenKind::Slash => (5, BinOp::Div),
        TokenKind::Percent => (5, BinOp::Mod),
        _ => return None,
    };
    Some(entry)
}

// Parser helper methods
impl<'a> super::Parser<'a> {
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    pub(super) fn peek_next(&self) -> Option<&Token> {
        self.tokens.get(self.current + 1)
    }

    pub(super) fn peek_kind_is(&self, kind: TokenKind) -> bool {
        self.peek().map_or(false, |t| t.kind == kind)
    }

    pub(super) fn peek_next_kind_is(&self, kind: TokenKind) -> bool {
        self.peek_next().map_or(false, |t| t.kind == kind)
    }

    pub(super) fn at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub(super) fn advance(&mut self) {
        self.current = (self.current + 1).min(self.tokens.len());
    }

    /// Line of the current token, or of the last token at end of input
    pub(super) fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    /// Consume a token of the given kind or fail with what was expected
    pub(super) fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.advance();
                Ok(token)
            }
            Some(token) => Err(ParseError::unexpected_token(expected, token)),
            None => Err(ParseError::unexpected_eof(expected, self.current_line())),
        }
    }

    /// Consume the current token if it matches, without failing
    pub(super) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind_is(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // Check expression recursion depth limit
    pub(super) fn check_depth(&self, depth: usize) -> Result<(), ParseError> {
        if depth >= self.limits.max_expr_depth {
            return Err(ParseError::new(
                format!(
                    "Expression nesting too deep: {} levels (max {})",
                    depth, self.limits.max_expr_depth
                ),
                self.current_line(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_levels() {
        assert_eq!(binary_op(&TokenKind::OrOr), Some((1, BinOp::Or)));
        assert_eq!(binary_op(&TokenKind::AndAnd), Some((2, BinOp::And)));
        assert_eq!(binary_op(&TokenKind::EqEq), Some((3, BinOp::Eq)));
        assert_eq!(binary_op(&TokenKind::Plus), Some((4, BinOp::Add)));
        assert_eq!(binary_op(&TokenKind::Percent), Some((5, BinOp::Mod)));
        assert_eq!(binary_op(&TokenKind::Assign), None);
        assert_eq!(binary_op(&TokenKind::Identifier), None);
    }

    #[test]
    fn test_relational_below_additive() {
        let (rel, _) = binary_op(&TokenKind::Lt).unwrap();
        let (add, _) = binary_op(&TokenKind::Plus).unwrap();
        let (mul, _) = binary_op(&TokenKind::Star).unwrap();
        assert!(rel < add);
        assert!(add < mul);
    }
}
