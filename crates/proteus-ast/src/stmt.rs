//! Statement definitions for the AST

use super::*;

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// Expression statement
    Expr(Node<Expr>),

    /// Return statement: records the function's result, no control flow
    Return(Node<Expr>),

    /// Variable declaration: int x = value;
    VarDecl(VarDecl),

    /// Extern declaration: extern int f(int a);
    Extern(ExternDecl),

    /// Function declaration: int f(int a) { body }
    Function(FunctionDecl),
}

/// Block: ordered statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Node<Stmt>>,
}

impl Block {
    pub fn new(stmts: Vec<Node<Stmt>>) -> Self {
        Self { stmts }
    }
}
