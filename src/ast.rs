use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Access and storage modifiers on classes and members
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const STATIC = 1 << 3;
    }
}

/// A type as written in source. The parser accepts arbitrary `List` nesting;
/// the semantic checker is where lists-of-lists are rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeName {
    Int,
    Float,
    Double,
    Bool,
    String,
    Char,
    Var,
    List(Box<TypeName>),
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeName::Int => write!(f, "int"),
            TypeName::Float => write!(f, "float"),
            TypeName::Double => write!(f, "double"),
            TypeName::Bool => write!(f, "bool"),
            TypeName::String => write!(f, "string"),
            TypeName::Char => write!(f, "char"),
            TypeName::Var => write!(f, "var"),
            TypeName::List(inner) => write!(f, "List<{}>", inner),
        }
    }
}

// Program structure

#[derive(Debug, Default)]
pub struct Program {
    pub usings: Vec<UsingDecl>,
    pub classes: Vec<ClassDecl>,
}

#[derive(Debug)]
pub struct UsingDecl {
    pub name: String,
    pub line: usize,
}

#[derive(Debug)]
pub struct ClassDecl {
    pub modifiers: Modifiers,
    pub name: String,
    pub members: Vec<Member>,
    pub line: usize,
}

#[derive(Debug)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
}

#[derive(Debug)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub ty: TypeName,
    pub name: String,
    pub init: Option<Expr>,
    pub line: usize,
}

#[derive(Debug)]
pub enum ReturnType {
    Void,
    Type(TypeName),
}

#[derive(Debug)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub return_type: ReturnType,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug)]
pub struct ConstructorDecl {
    pub modifiers: Modifiers,
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub line: usize,
}

#[derive(Debug)]
pub struct Param {
    pub ty: TypeName,
    pub name: String,
}

// Statements

#[derive(Debug)]
pub enum Stmt {
    VarDecl {
        ty: TypeName,
        name: String,
        init: Option<Expr>,
        line: usize,
    },
    Assign {
        target: String,
        value: Expr,
        line: usize,
    },
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_part: Option<ElsePart>,
        line: usize,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        iter: Option<Box<Stmt>>,
        body: Vec<Stmt>,
        line: usize,
    },
    Return {
        value: Option<Expr>,
        line: usize,
    },
    /// Console.WriteLine(expr);
    Print {
        value: Expr,
        line: usize,
    },
    /// target[index] = value;
    ListAssign {
        target: String,
        index: Expr,
        value: Expr,
        line: usize,
    },
    /// target.Add(value);
    ListAdd {
        target: String,
        value: Expr,
        line: usize,
    },
    /// A bare expression statement, e.g. a function call
    Expr {
        expr: Expr,
        line: usize,
    },
}

#[derive(Debug)]
pub enum ElsePart {
    /// else { ... }
    Else(Vec<Stmt>),
    /// else if (...) { ... } — the boxed statement is always Stmt::If
    ElseIf(Box<Stmt>),
}

// Expressions
//
// A closed set of variants so type inference is an exhaustive match rather
// than string comparison on operator tags.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
    And,
    Or,
}

impl BinOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinOp::Gt | BinOp::Lt | BinOp::Ge | BinOp::Le | BinOp::Eq | BinOp::Ne
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    BoolLit(bool),
    Ident(String),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// name[index]
    Index {
        name: String,
        index: Box<Expr>,
    },
    /// new List<T>() or new List<T>{ ... }
    NewList {
        elem: TypeName,
        elems: Vec<Expr>,
    },
    /// int.Parse(arg) — the target type is whatever type keyword preceded .Parse
    Parse {
        target: TypeName,
        arg: Box<Expr>,
    },
    /// Console.ReadLine()
    ReadLine,
}
