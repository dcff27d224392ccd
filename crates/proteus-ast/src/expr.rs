//! Expression definitions for the AST

use super::*;
use std::fmt;

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Integer literal: 42
    Integer(i64),

    /// Double literal: 1.5
    Double(f64),

    /// String literal: "hello"
    Str(String),

    /// Identifier; `null` names the null object
    Ident(Ident),

    /// Dotted slot path: a.b.c
    Reference(Reference),

    /// Call of a named function: f(args)
    ///
    /// Only the first segment of `callee` names the function.
    Call {
        callee: Reference,
        args: Vec<Node<Expr>>,
    },

    /// Binary operation: left op right
    Binary {
        left: Box<Node<Expr>>,
        op: BinaryOp,
        right: Box<Node<Expr>>,
    },

    /// Assignment: target = value
    Assignment {
        target: Reference,
        value: Box<Node<Expr>>,
    },
}

/// Non-empty sequence of identifiers joined by `.`
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    segments: Vec<Node<Ident>>,
}

impl Reference {
    /// Single-segment reference
    pub fn single(ident: Node<Ident>) -> Self {
        Self { segments: vec![ident] }
    }

    /// Build a reference from a path; `None` if the path is empty.
    pub fn from_segments(segments: Vec<Node<Ident>>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Self { segments })
        }
    }

    /// Append a segment to the path.
    pub fn push(&mut self, segment: Node<Ident>) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[Node<Ident>] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_single(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn first(&self) -> &Node<Ident> {
        &self.segments[0]
    }

    pub fn last(&self) -> &Node<Ident> {
        &self.segments[self.segments.len() - 1]
    }

    /// Span covering every segment
    pub fn span(&self) -> Span {
        self.first().span.merge(&self.last().span)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment.value)?;
        }
        Ok(())
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}
