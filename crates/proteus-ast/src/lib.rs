//! # Proteus AST
//!
//! Abstract Syntax Tree definitions for the Proteus language: a small,
//! dynamically-typed language built on prototype objects with dotted slot
//! access.

use std::fmt;

// =============================================================================
// Core Types (kept in lib.rs - used by all modules)
// =============================================================================

/// Source location information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub file_id: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, file_id: usize) -> Self {
        Self { start, end, file_id }
    }

    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            file_id: self.file_id,
        }
    }
}

/// AST node wrapper that includes span information
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    pub span: Span,
    pub value: T,
}

impl<T> Node<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { span, value }
    }
}

/// Identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `null` is a keyword-like identifier naming the null object.
    pub fn is_null(&self) -> bool {
        self.name == "null"
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// =============================================================================
// Module Declarations
// =============================================================================

pub mod types;
pub mod expr;
pub mod stmt;
pub mod decl;
pub mod module;

// =============================================================================
// Re-exports
// =============================================================================

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use module::*;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_span() -> Span {
        Span::new(0, 0, 0)
    }

    fn ident(name: &str) -> Node<Ident> {
        Node::new(Ident::new(name), dummy_span())
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(format!("{}", TypeTag::Integer), "int");
        assert_eq!(format!("{}", TypeTag::Object), "object");
        assert!(TypeTag::Void.is_void());
        assert!(!TypeTag::Double.is_void());
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(4, 8, 0);
        let b = Span::new(1, 6, 0);
        assert_eq!(a.merge(&b), Span::new(1, 8, 0));
    }

    #[test]
    fn test_expressions() {
        let literal = Expr::Integer(42);
        assert!(matches!(literal, Expr::Integer(42)));

        let ident = Expr::Ident(Ident::new("x"));
        assert!(matches!(ident, Expr::Ident(_)));
        assert!(Ident::new("null").is_null());
    }

    #[test]
    fn test_binary_op() {
        assert_eq!(format!("{}", BinaryOp::Add), "+");
        assert_eq!(format!("{}", BinaryOp::Le), "<=");
        assert!(BinaryOp::Div.is_arithmetic());
        assert!(!BinaryOp::Eq.is_arithmetic());
    }

    #[test]
    fn test_reference() {
        let reference = Reference::from_segments(vec![ident("a"), ident("b"), ident("c")]).unwrap();
        assert!(Reference::from_segments(vec![]).is_none());
        assert_eq!(reference.len(), 3);
        assert!(!reference.is_single());
        assert_eq!(reference.first().value.name, "a");
        assert_eq!(reference.last().value.name, "c");
        assert_eq!(format!("{}", reference), "a.b.c");

        let single = Reference::single(ident("x"));
        assert!(single.is_single());
        assert_eq!(single.first(), single.last());
    }

    #[test]
    fn test_var_decl() {
        let decl = VarDecl {
            ty: Node::new(TypeTag::Integer, dummy_span()),
            name: ident("x"),
            init: Some(Node::new(Expr::Integer(10), dummy_span())),
        };

        assert_eq!(decl.ty.value, TypeTag::Integer);
        assert!(decl.init.is_some());
    }

    #[test]
    fn test_function_decl() {
        let func = FunctionDecl {
            ret: Node::new(TypeTag::Integer, dummy_span()),
            name: ident("add"),
            params: vec![
                Param {
                    ty: Node::new(TypeTag::Integer, dummy_span()),
                    name: ident("a"),
                },
                Param {
                    ty: Node::new(TypeTag::Integer, dummy_span()),
                    name: ident("b"),
                },
            ],
            body: Node::new(Block { stmts: vec![] }, dummy_span()),
        };

        assert_eq!(func.name.value.name, "add");
        assert_eq!(func.params.len(), 2);
    }
}
