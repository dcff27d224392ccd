//! Program root for the AST

use super::*;

/// Root AST node - represents a complete source file
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Block,
    pub span: Span,
}

impl Program {
    pub fn new(body: Block, span: Span) -> Self {
        Self { body, span }
    }
}
