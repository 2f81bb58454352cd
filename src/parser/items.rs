use super::{ParseError, Parser};
use crate::ast::{
    ClassDecl, ConstructorDecl, FieldDecl, Member, MethodDecl, Modifiers, Param, ReturnType,
    UsingDecl,
};
use crate::lexer::TokenKind;

// Top-level declarations: using directives, classes, and class members
impl<'a> Parser<'a> {
    /// using ID ('.' ID)* ';'
    pub(super) fn parse_using(&mut self) -> Result<UsingDecl, ParseError> {
        let using = self.expect(TokenKind::Using, "'using'")?;
        let mut name = self.expect(TokenKind::Identifier, "a namespace name")?.text;
        while self.eat(TokenKind::Dot) {
            let part = self.expect(TokenKind::Identifier, "a namespace name")?;
            name.push('.');
            name.push_str(&part.text);
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(UsingDecl {
            name,
            line: using.line,
        })
    }

    /// accessModifier* 'class' ID '{' member* '}'
    pub(super) fn parse_class(&mut self) -> Result<ClassDecl, ParseError> {
        let line = self.current_line();
        let modifiers = self.parse_modifiers();
        self.expect(TokenKind::Class, "'class'")?;
        let name = self.expect(TokenKind::Identifier, "a class name")?.text;
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut members = Vec::new();
        while !self.at_end() && !self.peek_kind_is(TokenKind::RBrace) {
            match self.parse_member() {
                Ok(member) => members.push(member),
                Err(e) => {
                    self.record_error(e);
                    self.synchronize_in_braces();
                }
            }
        }

        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(ClassDecl {
            modifiers,
            name,
            members,
            line,
        })
    }

    /// field, method, or constructor, distinguished by what follows the
    /// modifier run: 'void' or a type keyword starts a method or field,
    /// a bare identifier starts a constructor.
    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let line = self.current_line();
        let modifiers = self.parse_modifiers();

        let Some(token) = self.peek() else {
            return Err(ParseError::unexpected_eof("a class member", line));
        };

        match token.kind.clone() {
            TokenKind::Void => {
                self.advance();
                let name = self.expect(TokenKind::Identifier, "a method name")?.text;
                let params = self.parse_params()?;
                let body = self.parse_block()?;
                Ok(Member::Method(MethodDecl {
                    modifiers,
                    return_type: ReturnType::Void,
                    name,
                    params,
                    body,
                    line,
                }))
            }
            kind if kind.is_type_keyword() => {
                let ty = self.parse_type(0)?;
                let name = self.expect(TokenKind::Identifier, "a member name")?.text;

                match self.peek().cloned() {
                    Some(t) if t.kind == TokenKind::LParen => {
                        let params = self.parse_params()?;
                        let body = self.parse_block()?;
                        Ok(Member::Method(MethodDecl {
                            modifiers,
                            return_type: ReturnType::Type(ty),
                            name,
                            params,
                            body,
                            line,
                        }))
                    }
                    Some(t) if t.kind == TokenKind::Assign => {
                        self.advance();
                        let init = self.parse_expression(0, 1)?;
                        self.expect(TokenKind::Semicolon, "';'")?;
                        Ok(Member::Field(FieldDecl {
                            modifiers,
                            ty,
                            name,
                            init: Some(init),
                            line,
                        }))
                    }
                    Some(t) if t.kind == TokenKind::Semicolon => {
                        self.advance();
                        Ok(Member::Field(FieldDecl {
                            modifiers,
                            ty,
                            name,
                            init: None,
                            line,
                        }))
                    }
                    Some(t) => Err(ParseError::unexpected_token("'(', '=', or ';'", &t)),
                    None => Err(ParseError::unexpected_eof(
                        "'(', '=', or ';'",
                        self.current_line(),
                    )),
                }
            }
            TokenKind::Identifier => {
                let name = token.text.clone();
                self.advance();
                let params = self.parse_params()?;
                let body = self.parse_block()?;
                Ok(Member::Constructor(ConstructorDecl {
                    modifiers,
                    name,
                    params,
                    body,
                    line,
                }))
            }
            _ => Err(ParseError::unexpected_token("a class member", token)),
        }
    }

    pub(super) fn parse_modifiers(&mut self) -> Modifiers {
        let mut modifiers = Modifiers::default();
        while let Some(token) = self.peek() {
            let flag = match token.kind {
                TokenKind::Public => Modifiers::PUBLIC,
                TokenKind::Private => Modifiers::PRIVATE,
                TokenKind::Protected => Modifiers::PROTECTED,
                TokenKind::Static => Modifiers::STATIC,
                _ => break,
            };
            modifiers |= flag;
            self.advance();
        }
        modifiers
    }

    /// '(' (type ID (',' type ID)*)? ')'
    fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;

        let mut params = Vec::new();
        if !self.peek_kind_is(TokenKind::RParen) {
            loop {
                let ty = self.parse_type(0)?;
                let name = self.expect(TokenKind::Identifier, "a parameter name")?.text;
                params.push(Param { ty, name });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::RParen, "')'")?;
        Ok(params)
    }

    /// Skip past the next ';' at the current brace depth, or stop just
    /// before the enclosing '}'. Used after a bad member or statement so
    /// the rest of the surrounding block still gets checked.
    pub(super) fn synchronize_in_braces(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::LBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenKind::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    self.advance();
                }
                _ => self.advance(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Member, Modifiers, ReturnType, TypeName};
    use crate::lexer::tokenize;
    use crate::limits::AnalyzerLimits;
    use crate::parser::parse;

    fn parse_class_source(source: &str) -> crate::ast::ClassDecl {
        let limits = AnalyzerLimits::default();
        let (tokens, _) = tokenize(source, &limits);
        let (mut program, diagnostics) = parse(&tokens, &limits);
        assert!(
            !diagnostics.has_errors(),
            "{:?}",
            diagnostics.iter().collect::<Vec<_>>()
        );
        program.classes.remove(0)
    }

    #[test]
    fn test_class_modifiers() {
        let class = parse_class_source("public static class Util { }");
        assert!(class.modifiers.contains(Modifiers::PUBLIC));
        assert!(class.modifiers.contains(Modifiers::STATIC));
        assert_eq!(class.name, "Util");
    }

    #[test]
    fn test_field_forms() {
        let class = parse_class_source("class A { int x; private float y = 1.5; }");
        assert_eq!(class.members.len(), 2);
        match &class.members[0] {
            Member::Field(f) => {
                assert_eq!(f.name, "x");
                assert_eq!(f.ty, TypeName::Int);
                assert!(f.init.is_none());
            }
            other => panic!("expected a field, got {:?}", other),
        }
        match &class.members[1] {
            Member::Field(f) => {
                assert!(f.modifiers.contains(Modifiers::PRIVATE));
                assert!(f.init.is_some());
            }
            other => panic!("expected a field, got {:?}", other),
        }
    }

    #[test]
    fn test_method_with_params_and_return_type() {
        let class =
            parse_class_source("class A { public int Sum(int a, int b) { return a + b; } }");
        match &class.members[0] {
            Member::Method(m) => {
                assert_eq!(m.name, "Sum");
                assert!(matches!(m.return_type, ReturnType::Type(TypeName::Int)));
                assert_eq!(m.params.len(), 2);
                assert_eq!(m.params[1].name, "b");
                assert_eq!(m.body.len(), 1);
            }
            other => panic!("expected a method, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor() {
        let class = parse_class_source("class Point { public Point(int x) { } }");
        match &class.members[0] {
            Member::Constructor(c) => {
                assert_eq!(c.name, "Point");
                assert_eq!(c.params.len(), 1);
            }
            other => panic!("expected a constructor, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_member_does_not_hide_the_next_one() {
        let limits = AnalyzerLimits::default();
        let (tokens, _) = tokenize("class A { int = 5; int ok; }", &limits);
        let (program, diagnostics) = parse(&tokens, &limits);
        assert!(diagnostics.has_errors());
        let class = &program.classes[0];
        assert!(class
            .members
            .iter()
            .any(|m| matches!(m, Member::Field(f) if f.name == "ok")));
    }

    #[test]
    fn test_list_typed_field() {
        let class = parse_class_source("class A { List<int> xs; }");
        match &class.members[0] {
            Member::Field(f) => {
                assert_eq!(f.ty, TypeName::List(Box::new(TypeName::Int)));
            }
            other => panic!("expected a field, got {:?}", other),
        }
    }
}
