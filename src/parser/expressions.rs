use super::helpers::binary_op;
use super::{ParseError, Parser};
use crate::ast::{Expr, TypeName, UnaryOp};
use crate::lexer::TokenKind;

// Recursive expression parsing with precedence climbing
impl<'a> Parser<'a> {
    /// Parse an expression at the given minimum precedence.
    /// All binary operators are left-associative.
    pub(crate) fn parse_expression(
        &mut self,
        depth: usize,
        min_precedence: u8,
    ) -> Result<Expr, ParseError> {
        self.check_depth(depth)?;

        let mut left = self.parse_unary(depth)?;

        loop {
            let Some(token) = self.peek() else { break };

            let (precedence, op) = match binary_op(&token.kind) {
                Some((p, op)) if p >= min_precedence => (p, op),
                _ => break,
            };

            self.advance();

            // Left-associativity: the right side must bind strictly tighter
            let right = self.parse_expression(depth + 1, precedence + 1)?;

            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Unary operators bind tighter than any binary operator
    fn parse_unary(&mut self, depth: usize) -> Result<Expr, ParseError> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(TokenKind::Not) => {
                self.advance();
                let operand = self.parse_unary(depth + 1)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            Some(TokenKind::Minus) => {
                self.advance();
                let operand = self.parse_unary(depth + 1)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            _ => self.parse_primary(depth),
        }
    }

    fn parse_primary(&mut self, depth: usize) -> Result<Expr, ParseError> {
        self.check_depth(depth)?;

        let Some(token) = self.peek() else {
            return Err(ParseError::unexpected_eof(
                "an expression",
                self.current_line(),
            ));
        };

        match token.kind.clone() {
            TokenKind::IntConst(value) => {
                self.advance();
                Ok(Expr::IntLit(value))
            }
            TokenKind::FloatConst(value) => {
                self.advance();
                Ok(Expr::FloatLit(value))
            }
            TokenKind::StringConst => {
                let text = token.text.clone();
                self.advance();
                Ok(Expr::StringLit(text))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::BoolLit(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::BoolLit(false))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression(depth + 1, 1)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::New => self.parse_new_list(depth),
            TokenKind::Console => {
                self.advance();
                self.expect(TokenKind::Dot, "'.'")?;
                self.expect(TokenKind::ReadLine, "'ReadLine'")?;
                self.expect(TokenKind::LParen, "'('")?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::ReadLine)
            }
            // Type keyword followed by .Parse, e.g. int.Parse(Console.ReadLine())
            kind if kind.is_type_keyword() && self.peek_next_kind_is(TokenKind::Dot) => {
                let target = self.parse_type(depth)?;
                self.expect(TokenKind::Dot, "'.'")?;
                self.expect(TokenKind::Parse, "'Parse'")?;
                self.expect(TokenKind::LParen, "'('")?;
                let arg = self.parse_expression(depth + 1, 1)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(Expr::Parse {
                    target,
                    arg: Box::new(arg),
                })
            }
            TokenKind::Identifier => {
                let name = token.text.clone();
                self.advance();

                if self.peek_kind_is(TokenKind::LParen) {
                    let args = self.parse_args(depth)?;
                    Ok(Expr::Call { name, args })
                } else if self.eat(TokenKind::LBracket) {
                    let index = self.parse_expression(depth + 1, 1)?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    Ok(Expr::Index {
                        name,
                        index: Box::new(index),
                    })
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            _ => Err(ParseError::unexpected_token("an expression", token)),
        }
    }

    /// new List<T>() or new List<T>{ elem, ... }
    fn parse_new_list(&mut self, depth: usize) -> Result<Expr, ParseError> {
        self.expect(TokenKind::New, "'new'")?;
        self.expect(TokenKind::List, "'List'")?;
        self.expect(TokenKind::Lt, "'<'")?;
        let elem = self.parse_type(depth + 1)?;
        self.expect(TokenKind::Gt, "'>'")?;

        let mut elems = Vec::new();

        if self.eat(TokenKind::LParen) {
            self.expect(TokenKind::RParen, "')'")?;
        } else if self.eat(TokenKind::LBrace) {
            if !self.peek_kind_is(TokenKind::RBrace) {
                loop {
                    elems.push(self.parse_expression(depth + 1, 1)?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RBrace, "'}'")?;
        } else {
            return Err(match self.peek() {
                Some(t) => ParseError::unexpected_token("'(' or '{'", t),
                None => ParseError::unexpected_eof("'(' or '{'", self.current_line()),
            });
        }

        Ok(Expr::NewList { elem, elems })
    }

    /// Comma-separated argument list, parentheses included
    pub(super) fn parse_args(&mut self, depth: usize) -> Result<Vec<Expr>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;

        let mut args = Vec::new();
        if !self.peek_kind_is(TokenKind::RParen) {
            loop {
                args.push(self.parse_expression(depth + 1, 1)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    /// Parse a type: a primitive keyword, `var`, or `List<T>`.
    /// Arbitrary nesting is accepted here; the semantic checker rejects
    /// lists of lists.
    pub(super) fn parse_type(&mut self, depth: usize) -> Result<TypeName, ParseError> {
        self.check_depth(depth)?;

        let Some(token) = self.peek() else {
            return Err(ParseError::unexpected_eof("a type", self.current_line()));
        };

        let ty = match token.kind {
            TokenKind::Int => TypeName::Int,
            TokenKind::Float => TypeName::Float,
            TokenKind::Double => TypeName::Double,
            TokenKind::Bool => TypeName::Bool,
            TokenKind::StringType => TypeName::String,
            TokenKind::Char => TypeName::Char,
            TokenKind::Var => TypeName::Var,
            TokenKind::List => {
                self.advance();
                self.expect(TokenKind::Lt, "'<'")?;
                let inner = self.parse_type(depth + 1)?;
                self.expect(TokenKind::Gt, "'>'")?;
                return Ok(TypeName::List(Box::new(inner)));
            }
            _ => return Err(ParseError::unexpected_token("a type", token)),
        };

        self.advance();
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinOp, Expr, TypeName, UnaryOp};
    use crate::lexer::tokenize;
    use crate::limits::AnalyzerLimits;
    use crate::parser::parse_expression_slice;

    fn parse_expr(source: &str) -> Expr {
        let limits = AnalyzerLimits::default();
        let (tokens, diagnostics) = tokenize(source, &limits);
        assert!(diagnostics.is_empty());
        parse_expression_slice(&tokens, &limits).unwrap()
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse_expr("42"), Expr::IntLit(42));
        assert_eq!(parse_expr("3.5"), Expr::FloatLit(3.5));
        assert_eq!(parse_expr("\"hi\""), Expr::StringLit("hi".to_string()));
        assert_eq!(parse_expr("true"), Expr::BoolLit(true));
        assert_eq!(parse_expr("x"), Expr::Ident("x".to_string()));
    }

    #[test]
    fn test_left_associativity() {
        // 1 - 2 - 3 parses as (1 - 2) - 3
        let expr = parse_expr("1 - 2 - 3");
        match expr {
            Expr::Binary { op: BinOp::Sub, lhs, rhs } => {
                assert_eq!(*rhs, Expr::IntLit(3));
                match *lhs {
                    Expr::Binary { op: BinOp::Sub, lhs, rhs } => {
                        assert_eq!(*lhs, Expr::IntLit(1));
                        assert_eq!(*rhs, Expr::IntLit(2));
                    }
                    other => panic!("expected nested subtraction, got {:?}", other),
                }
            }
            other => panic!("expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_multiplicative_binds_tighter() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        let expr = parse_expr("1 + 2 * 3");
        match expr {
            Expr::Binary { op: BinOp::Add, lhs, rhs } => {
                assert_eq!(*lhs, Expr::IntLit(1));
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. }));
            }
            other => panic!("expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_is_lowest() {
        // a < b && c > d parses as (a < b) && (c > d)
        let expr = parse_expr("a < b && c > d");
        match expr {
            Expr::Binary { op: BinOp::And, lhs, rhs } => {
                assert!(matches!(*lhs, Expr::Binary { op: BinOp::Lt, .. }));
                assert!(matches!(*rhs, Expr::Binary { op: BinOp::Gt, .. }));
            }
            other => panic!("expected && at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus_binds_tighter_than_binary() {
        // -1 + 2 parses as (-1) + 2
        let expr = parse_expr("-1 + 2");
        match expr {
            Expr::Binary { op: BinOp::Add, lhs, .. } => {
                assert!(matches!(
                    *lhs,
                    Expr::Unary { op: UnaryOp::Neg, .. }
                ));
            }
            other => panic!("expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        // (1 + 2) * 3 has * at the root
        let expr = parse_expr("(1 + 2) * 3");
        assert!(matches!(expr, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_function_call_and_index() {
        assert_eq!(
            parse_expr("f(1, 2)"),
            Expr::Call {
                name: "f".to_string(),
                args: vec![Expr::IntLit(1), Expr::IntLit(2)],
            }
        );
        assert_eq!(
            parse_expr("xs[0]"),
            Expr::Index {
                name: "xs".to_string(),
                index: Box::new(Expr::IntLit(0)),
            }
        );
    }

    #[test]
    fn test_new_list_forms() {
        assert_eq!(
            parse_expr("new List<int>()"),
            Expr::NewList {
                elem: TypeName::Int,
                elems: vec![],
            }
        );
        assert_eq!(
            parse_expr("new List<int>{ 1, 2, 3 }"),
            Expr::NewList {
                elem: TypeName::Int,
                elems: vec![Expr::IntLit(1), Expr::IntLit(2), Expr::IntLit(3)],
            }
        );
    }

    #[test]
    fn test_console_readline_and_parse() {
        assert_eq!(parse_expr("Console.ReadLine()"), Expr::ReadLine);
        assert_eq!(
            parse_expr("int.Parse(Console.ReadLine())"),
            Expr::Parse {
                target: TypeName::Int,
                arg: Box::new(Expr::ReadLine),
            }
        );
    }

    #[test]
    fn test_depth_limit_is_a_diagnostic_not_a_crash() {
        let mut limits = AnalyzerLimits::default();
        limits.max_expr_depth = 16;
        let source = format!("{}1{}", "(".repeat(64), ")".repeat(64));
        let (tokens, _) = tokenize(&source, &limits);
        let result = crate::parser::parse_expression_slice(&tokens, &limits);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("too deep"));
    }
}
