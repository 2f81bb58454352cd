use super::{SymbolTable, TypeDescriptor};
use crate::ast::{Expr, UnaryOp};

fn is_numeric(ty: &TypeDescriptor) -> bool {
    matches!(
        ty,
        TypeDescriptor::Int | TypeDescriptor::Float | TypeDescriptor::Double
    )
}

/// Widen two numeric operand types: int < float < double
fn widen(lhs: TypeDescriptor, rhs: TypeDescriptor) -> TypeDescriptor {
    if lhs == TypeDescriptor::Double || rhs == TypeDescriptor::Double {
        TypeDescriptor::Double
    } else if lhs == TypeDescriptor::Float || rhs == TypeDescriptor::Float {
        TypeDescriptor::Float
    } else {
        TypeDescriptor::Int
    }
}

/// Infer the type of an expression against the current symbol table.
///
/// Errors are human-readable messages the caller reports as Semantic
/// diagnostics; inference never mutates the table.
pub fn infer_type(expr: &Expr, table: &SymbolTable) -> Result<TypeDescriptor, String> {
    match expr {
        Expr::IntLit(_) => Ok(TypeDescriptor::Int),
        Expr::FloatLit(_) => Ok(TypeDescriptor::Float),
        Expr::StringLit(_) => Ok(TypeDescriptor::String),
        Expr::BoolLit(_) => Ok(TypeDescriptor::Bool),

        Expr::Ident(name) => match table.lookup(name) {
            Some(entry) => Ok(entry.declared_type.clone()),
            None => Err(format!(
                "cannot infer the type of '{}': it is not declared",
                name
            )),
        },

        Expr::Binary { op, lhs, rhs } => {
            let lt = infer_type(lhs, table)?;
            let rt = infer_type(rhs, table)?;

            if op.is_arithmetic() {
                if lt == rt {
                    return Ok(lt);
                }
                if is_numeric(&lt) && is_numeric(&rt) {
                    return Ok(widen(lt, rt));
                }
                Err(format!(
                    "arithmetic between incompatible types: {} and {}",
                    lt, rt
                ))
            } else if op.is_logical() {
                if lt == TypeDescriptor::Bool && rt == TypeDescriptor::Bool {
                    return Ok(TypeDescriptor::Bool);
                }
                Err(format!(
                    "logical operator requires bool operands, got {} and {}",
                    lt, rt
                ))
            } else {
                // Relational: equal types or any numeric pair compare fine
                if lt == rt || (is_numeric(&lt) && is_numeric(&rt)) {
                    return Ok(TypeDescriptor::Bool);
                }
                Err(format!(
                    "comparison between incompatible types: {} and {}",
                    lt, rt
                ))
            }
        }

        Expr::Unary { op, operand } => {
            let ty = infer_type(operand, table)?;
            match op {
                UnaryOp::Not => {
                    if ty == TypeDescriptor::Bool {
                        Ok(TypeDescriptor::Bool)
                    } else {
                        Err(format!("operator '!' requires a bool operand, got {}", ty))
                    }
                }
                UnaryOp::Neg => {
                    if is_numeric(&ty) {
                        Ok(ty)
                    } else {
                        Err(format!(
                            "unary '-' requires a numeric operand, got {}",
                            ty
                        ))
                    }
                }
            }
        }

        // TODO: track method return types once declarations feed the symbol
        // table; until then calls and list indexing default to int
        Expr::Call { .. } => Ok(TypeDescriptor::Int),
        Expr::Index { .. } => Ok(TypeDescriptor::Int),

        Expr::NewList { elem, .. } => {
            let elem_ty = TypeDescriptor::from(elem);
            if matches!(elem_ty, TypeDescriptor::List(_)) {
                return Err("lists of lists are not allowed".to_string());
            }
            Ok(TypeDescriptor::List(Box::new(elem_ty)))
        }

        Expr::Parse { target, .. } => Ok(TypeDescriptor::from(target)),
        Expr::ReadLine => Ok(TypeDescriptor::String),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, TypeName};
    use crate::semantic::SymbolTableEntry;

    fn table_with(name: &str, ty: TypeDescriptor) -> SymbolTable {
        let mut table = SymbolTable::new();
        table.declare(SymbolTableEntry {
            name: name.to_string(),
            declared_type: ty,
            initialized: true,
            pending_inference: false,
        });
        table
    }

    fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    #[test]
    fn test_literals() {
        let table = SymbolTable::new();
        assert_eq!(
            infer_type(&Expr::IntLit(1), &table),
            Ok(TypeDescriptor::Int)
        );
        assert_eq!(
            infer_type(&Expr::FloatLit(1.5), &table),
            Ok(TypeDescriptor::Float)
        );
        assert_eq!(
            infer_type(&Expr::StringLit("s".into()), &table),
            Ok(TypeDescriptor::String)
        );
        assert_eq!(
            infer_type(&Expr::BoolLit(true), &table),
            Ok(TypeDescriptor::Bool)
        );
    }

    #[test]
    fn test_arithmetic_widening() {
        let table = SymbolTable::new();
        let e = bin(BinOp::Add, Expr::IntLit(1), Expr::FloatLit(2.0));
        assert_eq!(infer_type(&e, &table), Ok(TypeDescriptor::Float));

        let e = bin(BinOp::Mul, Expr::FloatLit(1.0), Expr::FloatLit(2.0));
        assert_eq!(infer_type(&e, &table), Ok(TypeDescriptor::Float));
    }

    #[test]
    fn test_double_dominates() {
        let table = table_with("d", TypeDescriptor::Double);
        let e = bin(BinOp::Add, Expr::Ident("d".into()), Expr::FloatLit(1.0));
        assert_eq!(infer_type(&e, &table), Ok(TypeDescriptor::Double));
    }

    #[test]
    fn test_arithmetic_on_string_and_int_fails() {
        let table = SymbolTable::new();
        let e = bin(BinOp::Add, Expr::StringLit("s".into()), Expr::IntLit(1));
        let err = infer_type(&e, &table).unwrap_err();
        assert!(err.contains("incompatible types"));
    }

    #[test]
    fn test_logical_requires_bool() {
        let table = SymbolTable::new();
        let ok = bin(BinOp::And, Expr::BoolLit(true), Expr::BoolLit(false));
        assert_eq!(infer_type(&ok, &table), Ok(TypeDescriptor::Bool));

        let bad = bin(BinOp::Or, Expr::IntLit(1), Expr::BoolLit(true));
        assert!(infer_type(&bad, &table).is_err());
    }

    #[test]
    fn test_relational_numeric_mix_is_bool() {
        let table = SymbolTable::new();
        let e = bin(BinOp::Lt, Expr::IntLit(1), Expr::FloatLit(2.0));
        assert_eq!(infer_type(&e, &table), Ok(TypeDescriptor::Bool));

        let bad = bin(BinOp::Eq, Expr::StringLit("s".into()), Expr::IntLit(1));
        assert!(infer_type(&bad, &table).is_err());
    }

    #[test]
    fn test_unary_operators() {
        let table = SymbolTable::new();
        let neg = Expr::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(Expr::FloatLit(1.0)),
        };
        assert_eq!(infer_type(&neg, &table), Ok(TypeDescriptor::Float));

        let not_bad = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::IntLit(1)),
        };
        assert!(infer_type(&not_bad, &table).is_err());
    }

    #[test]
    fn test_identifier_resolves_through_table() {
        let table = table_with("x", TypeDescriptor::String);
        assert_eq!(
            infer_type(&Expr::Ident("x".into()), &table),
            Ok(TypeDescriptor::String)
        );
        assert!(infer_type(&Expr::Ident("nope".into()), &table).is_err());
    }

    #[test]
    fn test_special_forms() {
        let table = SymbolTable::new();
        assert_eq!(
            infer_type(&Expr::ReadLine, &table),
            Ok(TypeDescriptor::String)
        );
        let parse = Expr::Parse {
            target: TypeName::Double,
            arg: Box::new(Expr::ReadLine),
        };
        assert_eq!(infer_type(&parse, &table), Ok(TypeDescriptor::Double));
        let call = Expr::Call {
            name: "f".into(),
            args: vec![],
        };
        assert_eq!(infer_type(&call, &table), Ok(TypeDescriptor::Int));
    }

    #[test]
    fn test_list_constructor_and_nesting() {
        let table = SymbolTable::new();
        let flat = Expr::NewList {
            elem: TypeName::Int,
            elems: vec![],
        };
        assert_eq!(
            infer_type(&flat, &table),
            Ok(TypeDescriptor::List(Box::new(TypeDescriptor::Int)))
        );

        let nested = Expr::NewList {
            elem: TypeName::List(Box::new(TypeName::Int)),
            elems: vec![],
        };
        assert!(infer_type(&nested, &table).is_err());
    }
}
