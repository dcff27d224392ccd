//! Type tags for the AST
//!
//! Proteus is dynamically typed at the object level; type tags only decide
//! the machine representation of declared variables, parameters and return
//! values.

use std::fmt;

/// Declared type of a variable, parameter or function result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Integer,
    Double,
    String,
    Object,
    Void,
}

impl TypeTag {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeTag::Void)
    }

    /// Map a type keyword to its tag.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "bool" => Some(TypeTag::Bool),
            "int" => Some(TypeTag::Integer),
            "double" => Some(TypeTag::Double),
            "string" => Some(TypeTag::String),
            "object" => Some(TypeTag::Object),
            "void" => Some(TypeTag::Void),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeTag::Bool => "bool",
            TypeTag::Integer => "int",
            TypeTag::Double => "double",
            TypeTag::String => "string",
            TypeTag::Object => "object",
            TypeTag::Void => "void",
        };
        write!(f, "{}", s)
    }
}
