//! Semantic checker.
//!
//! A single forward pass over the flat token stream, independent of the
//! grammar, tracking declarations and assignments in a symbol table owned
//! by the caller. Right-hand sides that are more than one token are parsed
//! with the expression parser and classified by type inference.

mod inference;

pub use inference::infer_type;

use std::collections::HashMap;
use std::fmt;

use crate::ast::TypeName;
use crate::diagnostics::{Diagnostics, Stage};
use crate::lexer::{tokenize, Token, TokenKind};
use crate::limits::AnalyzerLimits;
use crate::parser::parse_expression_slice;

/// Resolved type of a symbol or expression
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Int,
    Float,
    Double,
    Bool,
    String,
    Char,
    /// Declared `var`, type not yet fixed
    Var,
    List(Box<TypeDescriptor>),
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeDescriptor::Int => write!(f, "int"),
            TypeDescriptor::Float => write!(f, "float"),
            TypeDescriptor::Double => write!(f, "double"),
            TypeDescriptor::Bool => write!(f, "bool"),
            TypeDescriptor::String => write!(f, "string"),
            TypeDescriptor::Char => write!(f, "char"),
            TypeDescriptor::Var => write!(f, "var"),
            TypeDescriptor::List(inner) => write!(f, "List<{}>", inner),
        }
    }
}

impl From<&TypeName> for TypeDescriptor {
    fn from(ty: &TypeName) -> Self {
        match ty {
            TypeName::Int => TypeDescriptor::Int,
            TypeName::Float => TypeDescriptor::Float,
            TypeName::Double => TypeDescriptor::Double,
            TypeName::Bool => TypeDescriptor::Bool,
            TypeName::String => TypeDescriptor::String,
            TypeName::Char => TypeDescriptor::Char,
            TypeName::Var => TypeDescriptor::Var,
            TypeName::List(inner) => TypeDescriptor::List(Box::new(Self::from(inner.as_ref()))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SymbolTableEntry {
    pub name: String,
    pub declared_type: TypeDescriptor,
    pub initialized: bool,
    /// A `var` declared without an initializer; fixed on first assignment
    pub pending_inference: bool,
}

/// Flat variable namespace for one analysis run. A fresh table is created
/// per `check_semantics` call and returned to the caller.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: HashMap<String, SymbolTableEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn declare(&mut self, entry: SymbolTableEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolTableEntry> {
        self.entries.get(name)
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut SymbolTableEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolTableEntry> {
        self.entries.values()
    }
}

/// Run the semantic pass over the whole input. Lexical problems are not
/// re-reported here; whatever tokens the lexer produced are scanned.
pub fn check_semantics(source: &str, limits: &AnalyzerLimits) -> (SymbolTable, Diagnostics) {
    let (tokens, _) = tokenize(source, limits);
    let mut checker = Checker {
        tokens: &tokens,
        table: SymbolTable::new(),
        diagnostics: Diagnostics::new(),
        limits,
    };
    checker.run();
    (checker.table, checker.diagnostics)
}

struct Checker<'a> {
    tokens: &'a [Token],
    table: SymbolTable,
    diagnostics: Diagnostics,
    limits: &'a AnalyzerLimits,
}

enum RhsError {
    Undeclared(String),
    Inference(String),
}

impl<'a> Checker<'a> {
    fn run(&mut self) {
        let mut i = 0;
        while i < self.tokens.len() {
            let token = &self.tokens[i];

            // A type keyword opens a declaration unless it is the target of
            // a .Parse expression.
            if token.kind.is_type_keyword() && !self.kind_at(i + 1, TokenKind::Dot) {
                if let Some((ty, after)) = self.read_type(i) {
                    if let Some(name) = self.tokens.get(after) {
                        if name.kind == TokenKind::Identifier {
                            self.check_declaration(ty, &name.clone(), after);
                            i = after + 1;
                            continue;
                        }
                    }
                    i = after;
                    continue;
                }
                i += 1;
                continue;
            }

            // Assignment outside declaration mode
            if token.kind == TokenKind::Identifier && self.kind_at(i + 1, TokenKind::Assign) {
                self.check_assignment(&token.clone(), i);
            }

            i += 1;
        }
    }

    fn kind_at(&self, i: usize, kind: TokenKind) -> bool {
        self.tokens.get(i).map_or(false, |t| t.kind == kind)
    }

    /// Read a declared type starting at `start`; `List` consumes its angle
    /// brackets and element type. Returns the type and the next index.
    fn read_type(&self, start: usize) -> Option<(TypeDescriptor, usize)> {
        let token = self.tokens.get(start)?;
        let ty = match token.kind {
            TokenKind::Int => TypeDescriptor::Int,
            TokenKind::Float => TypeDescriptor::Float,
            TokenKind::Double => TypeDescriptor::Double,
            TokenKind::Bool => TypeDescriptor::Bool,
            TokenKind::StringType => TypeDescriptor::String,
            TokenKind::Char => TypeDescriptor::Char,
            TokenKind::Var => TypeDescriptor::Var,
            TokenKind::List => {
                if !self.kind_at(start + 1, TokenKind::Lt) {
                    return None;
                }
                let (inner, next) = self.read_type(start + 2)?;
                if !self.kind_at(next, TokenKind::Gt) {
                    return None;
                }
                return Some((TypeDescriptor::List(Box::new(inner)), next + 1));
            }
            _ => return None,
        };
        Some((ty, start + 1))
    }

    /// Initializer tokens between '=' and the end of the statement, scanning
    /// forward without consuming. The scan stops at the terminating ';' or at
    /// an unmatched ')', so a for-header iterator clause ends at the header's
    /// closing parenthesis instead of swallowing the loop body.
    fn rhs_slice(&self, from: usize) -> &'a [Token] {
        let mut assign_at = None;
        let mut depth = 0usize;
        let mut j = from;
        while j < self.tokens.len() {
            match self.tokens[j].kind {
                TokenKind::Semicolon => break,
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                TokenKind::Assign if assign_at.is_none() => assign_at = Some(j),
                _ => {}
            }
            j += 1;
        }
        match assign_at {
            Some(a) => &self.tokens[a + 1..j],
            None => &[],
        }
    }

    fn classify_rhs(&self, rhs: &[Token]) -> Result<Option<TypeDescriptor>, RhsError> {
        if rhs.is_empty() {
            return Ok(None);
        }
        if rhs.len() == 1 {
            match &rhs[0].kind {
                TokenKind::IntConst(_) => return Ok(Some(TypeDescriptor::Int)),
                TokenKind::FloatConst(_) => return Ok(Some(TypeDescriptor::Float)),
                TokenKind::StringConst => return Ok(Some(TypeDescriptor::String)),
                TokenKind::True | TokenKind::False => return Ok(Some(TypeDescriptor::Bool)),
                TokenKind::Identifier => {
                    return match self.table.lookup(&rhs[0].text) {
                        Some(entry) => Ok(Some(entry.declared_type.clone())),
                        None => Err(RhsError::Undeclared(rhs[0].text.clone())),
                    };
                }
                _ => {}
            }
        }

        // Compound right-hand side: parse it and infer over the typed tree.
        // A malformed slice is the parser's report, not a semantic error.
        match parse_expression_slice(rhs, self.limits) {
            Ok(expr) => match infer_type(&expr, &self.table) {
                Ok(ty) => Ok(Some(ty)),
                Err(msg) => Err(RhsError::Inference(msg)),
            },
            Err(_) => Ok(None),
        }
    }

    fn error(&mut self, line: usize, message: String) {
        self.diagnostics.error(Stage::Semantic, line, message);
    }

    fn note(&mut self, line: usize, message: String) {
        self.diagnostics.note(Stage::Semantic, line, message);
    }

    fn check_declaration(&mut self, ty: TypeDescriptor, name: &Token, name_idx: usize) {
        let line = name.line;
        let var_name = name.text.clone();

        if let TypeDescriptor::List(inner) = &ty {
            if matches!(inner.as_ref(), TypeDescriptor::List(_)) {
                self.error(
                    line,
                    format!("lists of lists are not allowed for variable '{}'", var_name),
                );
                return;
            }
        }

        if self.table.contains(&var_name) {
            self.error(
                line,
                format!(
                    "variable '{}' is already declared; redeclaration is not allowed",
                    var_name
                ),
            );
            return;
        }

        let rhs = self.rhs_slice(name_idx + 1);
        let rhs_type = match self.classify_rhs(rhs) {
            Ok(ty) => ty,
            Err(RhsError::Undeclared(other)) => {
                self.error(
                    line,
                    format!(
                        "variable '{}' used in the initialization of '{}' is not declared",
                        other, var_name
                    ),
                );
                return;
            }
            Err(RhsError::Inference(msg)) => {
                self.error(line, msg);
                return;
            }
        };

        match rhs_type {
            None => {
                if ty == TypeDescriptor::Var {
                    self.note(
                        line,
                        format!(
                            "variable '{}' declared as var without initialization; the type \
                             will be inferred on the first assignment",
                            var_name
                        ),
                    );
                    self.table.declare(SymbolTableEntry {
                        name: var_name,
                        declared_type: TypeDescriptor::Var,
                        initialized: false,
                        pending_inference: true,
                    });
                } else {
                    self.table.declare(SymbolTableEntry {
                        name: var_name,
                        declared_type: ty,
                        initialized: false,
                        pending_inference: false,
                    });
                }
            }
            Some(rhs_ty) => {
                if ty == TypeDescriptor::Var {
                    self.note(
                        line,
                        format!("type of '{}' inferred as {}", var_name, rhs_ty),
                    );
                    self.table.declare(SymbolTableEntry {
                        name: var_name,
                        declared_type: rhs_ty,
                        initialized: true,
                        pending_inference: false,
                    });
                    return;
                }

                if let TypeDescriptor::List(elem) = &ty {
                    match &rhs_ty {
                        TypeDescriptor::List(rhs_elem) if rhs_elem == elem => {}
                        TypeDescriptor::List(_) => {
                            self.error(
                                line,
                                format!(
                                    "cannot assign a value of type {} to variable {} '{}'",
                                    rhs_ty, ty, var_name
                                ),
                            );
                            return;
                        }
                        _ => {
                            self.error(
                                line,
                                format!(
                                    "cannot assign a value of type {} to variable {} '{}'; \
                                     only lists with a matching element type are allowed",
                                    rhs_ty, ty, var_name
                                ),
                            );
                            return;
                        }
                    }
                } else if Self::widens_to(&rhs_ty, &ty) {
                    self.note(
                        line,
                        format!(
                            "implicit cast: variable '{}' of type {} initialized with an int value",
                            var_name, ty
                        ),
                    );
                } else if rhs_ty != ty {
                    self.error(
                        line,
                        format!(
                            "cannot assign a value of type {} to variable {} '{}'",
                            rhs_ty, ty, var_name
                        ),
                    );
                    return;
                }

                self.table.declare(SymbolTableEntry {
                    name: var_name,
                    declared_type: ty,
                    initialized: true,
                    pending_inference: false,
                });
            }
        }
    }

    fn check_assignment(&mut self, name: &Token, name_idx: usize) {
        let line = name.line;
        let var_name = name.text.clone();

        if !self.table.contains(&var_name) {
            self.error(
                line,
                format!("variable '{}' is not declared before assignment", var_name),
            );
            return;
        }

        let rhs = self.rhs_slice(name_idx + 1);
        let rhs_ty = match self.classify_rhs(rhs) {
            Ok(Some(ty)) => ty,
            Ok(None) => return,
            Err(RhsError::Undeclared(other)) => {
                self.error(line, format!("variable '{}' is not declared", other));
                return;
            }
            Err(RhsError::Inference(msg)) => {
                self.error(line, msg);
                return;
            }
        };

        let declared = match self.table.lookup(&var_name) {
            Some(entry) => entry.declared_type.clone(),
            None => return,
        };
        let pending = self
            .table
            .lookup(&var_name)
            .map_or(false, |e| e.pending_inference);

        if pending {
            self.note(
                line,
                format!(
                    "type of '{}' inferred as {} on its first assignment",
                    var_name, rhs_ty
                ),
            );
            if let Some(entry) = self.table.lookup_mut(&var_name) {
                entry.declared_type = rhs_ty;
                entry.pending_inference = false;
                entry.initialized = true;
            }
            return;
        }

        if Self::widens_to(&rhs_ty, &declared) {
            self.note(
                line,
                format!(
                    "implicit cast: variable '{}' of type {} assigned an int value",
                    var_name, declared
                ),
            );
        } else if rhs_ty != declared {
            self.error(
                line,
                format!(
                    "cannot assign a value of type {} to variable {} '{}'",
                    rhs_ty, declared, var_name
                ),
            );
            return;
        }

        if let Some(entry) = self.table.lookup_mut(&var_name) {
            entry.initialized = true;
        }
    }

    /// int widens implicitly into float and double targets
    fn widens_to(rhs: &TypeDescriptor, target: &TypeDescriptor) -> bool {
        *rhs == TypeDescriptor::Int
            && matches!(target, TypeDescriptor::Float | TypeDescriptor::Double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    fn check(source: &str) -> (SymbolTable, Diagnostics) {
        check_semantics(source, &AnalyzerLimits::default())
    }

    #[test]
    fn test_clean_declaration() {
        let (table, diags) = check("int x = 5;");
        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        let entry = table.lookup("x").unwrap();
        assert_eq!(entry.declared_type, TypeDescriptor::Int);
        assert!(entry.initialized);
    }

    #[test]
    fn test_redeclaration_is_one_error() {
        let (_, diags) = check("int x = 5; int x = 6;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("already declared"));
    }

    #[test]
    fn test_for_iterator_assignment_is_type_checked() {
        let (_, diags) = check("for (int i = 0; i < 10; i = i + 1) { }");
        assert_eq!(
            diags.error_count(),
            0,
            "{:?}",
            diags.iter().collect::<Vec<_>>()
        );

        // The iterator clause ends at the header's ')', so its right-hand
        // side is parsed and checked like any other assignment.
        let (_, diags) = check("for (int i = 0; i < 10; i = 2.5) { }");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("cannot assign a value of type float"));
    }

    #[test]
    fn test_implicit_widening_is_a_note() {
        let (table, diags) = check("float f = 3;");
        assert_eq!(diags.error_count(), 0);
        let notes: Vec<_> = diags
            .iter()
            .filter(|d| d.severity == Severity::Note)
            .collect();
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message.contains("implicit cast"));
        assert_eq!(
            table.lookup("f").unwrap().declared_type,
            TypeDescriptor::Float
        );
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let (table, diags) = check("string s = 5;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("cannot assign a value of type int to variable string 's'"));
        assert!(!table.contains("s"));
    }

    #[test]
    fn test_var_inference_note_then_error() {
        let (table, diags) = check("var v = 5; v = \"hi\";");
        let notes = diags
            .iter()
            .filter(|d| d.severity == Severity::Note)
            .count();
        assert_eq!(notes, 1);
        assert_eq!(diags.error_count(), 1);
        assert_eq!(
            table.lookup("v").unwrap().declared_type,
            TypeDescriptor::Int
        );
    }

    #[test]
    fn test_var_pending_inference_fixed_on_first_assignment() {
        let (table, diags) = check("var v; v = 2.5; v = 1.5; v = 2;");
        // Adoption fixes v to float; the later int assignment only widens
        assert_eq!(diags.error_count(), 0);
        assert_eq!(
            table.lookup("v").unwrap().declared_type,
            TypeDescriptor::Float
        );
    }

    #[test]
    fn test_undeclared_assignment() {
        let (_, diags) = check("y = 3;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("not declared"));
    }

    #[test]
    fn test_undeclared_initializer_identifier() {
        let (_, diags) = check("int x = zz;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("used in the initialization of 'x'"));
    }

    #[test]
    fn test_compound_rhs_is_parsed_and_inferred() {
        let (table, diags) = check("int a = 1; float b = a + 2.5;");
        assert_eq!(diags.error_count(), 0);
        assert_eq!(
            table.lookup("b").unwrap().declared_type,
            TypeDescriptor::Float
        );
    }

    #[test]
    fn test_compound_rhs_mismatch() {
        let (_, diags) = check("bool ok = 1 + 2;");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_list_declaration_rules() {
        let (table, diags) = check("List<int> xs = new List<int>();");
        assert!(diags.is_empty(), "{:?}", diags.iter().collect::<Vec<_>>());
        assert_eq!(
            table.lookup("xs").unwrap().declared_type,
            TypeDescriptor::List(Box::new(TypeDescriptor::Int))
        );

        let (_, diags) = check("List<int> xs = 5;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("matching element type"));

        let (_, diags) = check("List<int> xs = new List<float>();");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_list_of_lists_rejected() {
        let (table, diags) = check("List<List<int>> xs;");
        assert_eq!(diags.error_count(), 1);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .message
            .contains("lists of lists"));
        assert!(!table.contains("xs"));
    }

    #[test]
    fn test_int_parse_yields_target_type() {
        let (table, diags) = check("int n = int.Parse(Console.ReadLine());");
        assert_eq!(diags.error_count(), 0);
        assert_eq!(
            table.lookup("n").unwrap().declared_type,
            TypeDescriptor::Int
        );
    }

    #[test]
    fn test_readline_is_string() {
        let (_, diags) = check("string s = Console.ReadLine();");
        assert_eq!(diags.error_count(), 0);

        let (_, diags) = check("int n = Console.ReadLine();");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_parameters_enter_the_table() {
        let (table, diags) = check("class A { void M(int a) { a = 7; } }");
        assert_eq!(diags.error_count(), 0, "{:?}", diags.iter().collect::<Vec<_>>());
        assert!(table.contains("a"));
    }

    #[test]
    fn test_encounter_order() {
        let (_, diags) = check("int x = 5; y = 1; int x = 2;");
        let errors: Vec<_> = diags.errors().map(|d| d.message.clone()).collect();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("'y'"));
        assert!(errors[1].contains("'x'"));
    }
}
