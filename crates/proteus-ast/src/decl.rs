//! Declaration definitions for the AST

use super::*;

/// Variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub ty: Node<TypeTag>,
    pub name: Node<Ident>,
    pub init: Option<Node<Expr>>,
}

/// Typed parameter of an extern or function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Node<TypeTag>,
    pub name: Node<Ident>,
}

/// Extern declaration: a function provided at link time
#[derive(Debug, Clone, PartialEq)]
pub struct ExternDecl {
    pub ret: Node<TypeTag>,
    pub name: Node<Ident>,
    pub params: Vec<Param>,
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub ret: Node<TypeTag>,
    pub name: Node<Ident>,
    pub params: Vec<Param>,
    pub body: Node<Block>,
}
