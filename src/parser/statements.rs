use super::{ParseError, Parser};
use crate::ast::{ElsePart, Expr, Stmt};
use crate::lexer::TokenKind;

// Statement parsing
impl<'a> Parser<'a> {
    /// '{' stmt* '}' with statement-level recovery: a bad statement is
    /// recorded and skipped, the rest of the block still parses.
    pub(super) fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut stmts = Vec::new();
        while !self.at_end() && !self.peek_kind_is(TokenKind::RBrace) {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.record_error(e);
                    self.synchronize_in_braces();
                }
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        let Some(token) = self.peek() else {
            return Err(ParseError::unexpected_eof(
                "a statement",
                self.current_line(),
            ));
        };
        let line = token.line;

        match token.kind.clone() {
            // A type keyword followed by '.' is an expression like
            // int.Parse(...), not a declaration.
            kind if kind.is_type_keyword() && !self.peek_next_kind_is(TokenKind::Dot) => {
                let stmt = self.parse_var_decl_core(line)?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(stmt)
            }
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => {
                self.advance();
                let value = if self.peek_kind_is(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression(0, 1)?)
                };
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Return { value, line })
            }
            TokenKind::Console => self.parse_console_stmt(line),
            TokenKind::Identifier => self.parse_identifier_stmt(line),
            _ => {
                let expr = self.parse_expression(0, 1)?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Stmt::Expr { expr, line })
            }
        }
    }

    /// type ID ('=' expr)? — the terminator is the caller's business, so
    /// for-loop initializers can reuse this.
    fn parse_var_decl_core(&mut self, line: usize) -> Result<Stmt, ParseError> {
        let ty = self.parse_type(0)?;
        let name = self.expect(TokenKind::Identifier, "a variable name")?.text;
        let init = if self.eat(TokenKind::Assign) {
            Some(self.parse_expression(0, 1)?)
        } else {
            None
        };
        Ok(Stmt::VarDecl {
            ty,
            name,
            init,
            line,
        })
    }

    /// 'if' '(' expr ')' block ('else' block | 'else' ifStmt)?
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        self.expect(TokenKind::If, "'if'")?;
        self.expect(TokenKind::LParen, "'('")?;
        let cond = self.parse_expression(0, 1)?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_body = self.parse_block()?;

        let else_part = if self.eat(TokenKind::Else) {
            if self.peek_kind_is(TokenKind::If) {
                Some(ElsePart::ElseIf(Box::new(self.parse_if()?)))
            } else {
                Some(ElsePart::Else(self.parse_block()?))
            }
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_body,
            else_part,
            line,
        })
    }

    /// 'for' '(' forInit? ';' expr? ';' forIter? ')' block
    ///
    /// forInit: a declaration with initializer, an assignment, or a bare
    /// expression. forIter: an assignment or a bare expression.
    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let line = self.current_line();
        self.expect(TokenKind::For, "'for'")?;
        self.expect(TokenKind::LParen, "'('")?;

        let init = if self.peek_kind_is(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_for_clause(line)?))
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let cond = if self.peek_kind_is(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(0, 1)?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let iter = if self.peek_kind_is(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_for_clause(line)?))
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = self.parse_block()?;
        Ok(Stmt::For {
            init,
            cond,
            iter,
            body,
            line,
        })
    }

    fn parse_for_clause(&mut self, line: usize) -> Result<Stmt, ParseError> {
        match self.peek().map(|t| t.kind.clone()) {
            Some(kind) if kind.is_type_keyword() => self.parse_var_decl_core(line),
            Some(TokenKind::Identifier) if self.peek_next_kind_is(TokenKind::Assign) => {
                let target = self.expect(TokenKind::Identifier, "a variable name")?.text;
                self.expect(TokenKind::Assign, "'='")?;
                let value = self.parse_expression(0, 1)?;
                Ok(Stmt::Assign {
                    target,
                    value,
                    line,
                })
            }
            _ => {
                let expr = self.parse_expression(0, 1)?;
                Ok(Stmt::Expr { expr, line })
            }
        }
    }

    /// Console.WriteLine(expr); or Console.ReadLine(); as a statement
    fn parse_console_stmt(&mut self, line: usize) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::Console, "'Console'")?;
        self.expect(TokenKind::Dot, "'.'")?;

        if self.eat(TokenKind::WriteLine) {
            self.expect(TokenKind::LParen, "'('")?;
            let value = self.parse_expression(0, 1)?;
            self.expect(TokenKind::RParen, "')'")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(Stmt::Print { value, line });
        }

        self.expect(TokenKind::ReadLine, "'WriteLine' or 'ReadLine'")?;
        self.expect(TokenKind::LParen, "'('")?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Expr {
            expr: Expr::ReadLine,
            line,
        })
    }

    /// Statements that open with an identifier: assignment, list element
    /// assignment, list.Add, or a bare expression statement.
    fn parse_identifier_stmt(&mut self, line: usize) -> Result<Stmt, ParseError> {
        if self.peek_next_kind_is(TokenKind::Assign) {
            let target = self.expect(TokenKind::Identifier, "a variable name")?.text;
            self.expect(TokenKind::Assign, "'='")?;
            let value = self.parse_expression(0, 1)?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(Stmt::Assign {
                target,
                value,
                line,
            });
        }

        if self.peek_next_kind_is(TokenKind::LBracket) {
            let target = self.expect(TokenKind::Identifier, "a list name")?.text;
            self.expect(TokenKind::LBracket, "'['")?;
            let index = self.parse_expression(0, 1)?;
            self.expect(TokenKind::RBracket, "']'")?;
            self.expect(TokenKind::Assign, "'='")?;
            let value = self.parse_expression(0, 1)?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(Stmt::ListAssign {
                target,
                index,
                value,
                line,
            });
        }

        if self.peek_next_kind_is(TokenKind::Dot) {
            let target = self.expect(TokenKind::Identifier, "a list name")?.text;
            self.expect(TokenKind::Dot, "'.'")?;
            self.expect(TokenKind::Add, "'Add'")?;
            self.expect(TokenKind::LParen, "'('")?;
            let value = self.parse_expression(0, 1)?;
            self.expect(TokenKind::RParen, "')'")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            return Ok(Stmt::ListAdd {
                target,
                value,
                line,
            });
        }

        let expr = self.parse_expression(0, 1)?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(Stmt::Expr { expr, line })
    }
}
