//! Value, place, and right-value definitions.

use std::fmt;

use crate::{BinOp, Constant, LocalId, TempId};

/// Represents a value that can be used in computations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Compile-time constant
    Const(Constant),
    /// Local variable reference
    Local(LocalId),
    /// Temporary value reference
    Temp(TempId),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Const(c) => write!(f, "const {}", c),
            Value::Local(id) => write!(f, "{}", id),
            Value::Temp(id) => write!(f, "{}", id),
        }
    }
}

/// A storage location that can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Place {
    Local(LocalId),
    Temp(TempId),
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Local(id) => write!(f, "{}", id),
            Place::Temp(id) => write!(f, "{}", id),
        }
    }
}

/// Right-hand side of an assignment - represents a computation.
#[derive(Debug, Clone, PartialEq)]
pub enum RValue {
    /// Use a value directly
    Use(Value),

    /// Binary operation
    BinaryOp {
        op: BinOp,
        left: Value,
        right: Value,
    },
}

impl fmt::Display for RValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RValue::Use(value) => write!(f, "{}", value),
            RValue::BinaryOp { op, left, right } => write!(f, "{} {} {}", left, op, right),
        }
    }
}
