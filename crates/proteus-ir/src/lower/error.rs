//! Lowering errors

use proteus_ast::{BinaryOp, Span};
use thiserror::Error;

/// Errors produced during lowering. Lowering stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LowerError {
    #[error("undefined function `{name}`")]
    UndefinedFunction { name: String, span: Span },

    #[error("operator `{op}` is not supported")]
    UnsupportedOperator { op: BinaryOp, span: Span },

    #[error("function `{name}` takes {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("function `{name}` is already declared")]
    DuplicateFunction { name: String, span: Span },

    #[error("expression has no value")]
    VoidValue { span: Span },

    #[error("variable `{name}` cannot have type void")]
    VoidVariable { name: String, span: Span },

    #[error("cannot assign to `{name}`")]
    InvalidAssignmentTarget { name: String, span: Span },
}

impl LowerError {
    /// Source location the error points at.
    pub fn span(&self) -> Span {
        match self {
            LowerError::UndefinedFunction { span, .. }
            | LowerError::UnsupportedOperator { span, .. }
            | LowerError::ArityMismatch { span, .. }
            | LowerError::DuplicateFunction { span, .. }
            | LowerError::VoidValue { span }
            | LowerError::VoidVariable { span, .. }
            | LowerError::InvalidAssignmentTarget { span, .. } => *span,
        }
    }
}
