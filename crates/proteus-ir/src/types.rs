//! IR type system and related definitions.

use std::fmt;

use proteus_ast::TypeTag;

/// IR type system representing all possible types in the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    /// 64-bit signed integer
    I64,
    /// 64-bit floating point
    F64,
    /// Boolean type
    Bool,
    /// Pointer to a runtime object (may be null)
    Ptr,
    /// Pointer to a read-only, NUL-terminated byte buffer
    Str,
    /// Void/unit type (no value)
    Void,
}

impl IrType {
    /// Machine representation of a declared type.
    pub fn from_tag(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Bool => IrType::Bool,
            TypeTag::Integer => IrType::I64,
            TypeTag::Double => IrType::F64,
            TypeTag::String => IrType::Str,
            TypeTag::Object => IrType::Ptr,
            TypeTag::Void => IrType::Void,
        }
    }

    /// Returns true if this type is a pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(self, IrType::Ptr | IrType::Str)
    }

    /// Returns the size in bytes of this type (approximate for IR purposes).
    pub fn size_bytes(&self) -> usize {
        match self {
            IrType::I64 => 8,
            IrType::F64 => 8,
            IrType::Bool => 1,
            IrType::Ptr => 8,
            IrType::Str => 8,
            IrType::Void => 0,
        }
    }

    /// Zero value of the type: `0`, `0.0`, `false` or null.
    pub fn default_constant(&self) -> Option<Constant> {
        match self {
            IrType::I64 => Some(Constant::I64(0)),
            IrType::F64 => Some(Constant::F64(0.0)),
            IrType::Bool => Some(Constant::Bool(false)),
            IrType::Ptr | IrType::Str => Some(Constant::Null),
            IrType::Void => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I64 => write!(f, "i64"),
            IrType::F64 => write!(f, "f64"),
            IrType::Bool => write!(f, "bool"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Str => write!(f, "str"),
            IrType::Void => write!(f, "void"),
        }
    }
}

/// Function signature describing parameter and return types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FuncSignature {
    /// Parameter types
    pub params: Vec<IrType>,
    /// Return type
    pub return_type: IrType,
}

impl fmt::Display for FuncSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// Compile-time constant values.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// 64-bit signed integer constant
    I64(i64),
    /// 64-bit floating point constant
    F64(f64),
    /// Boolean constant
    Bool(bool),
    /// String literal constant (interned in the module's string_literals)
    Str(String),
    /// Null object pointer
    Null,
}

impl Constant {
    pub fn ty(&self) -> IrType {
        match self {
            Constant::I64(_) => IrType::I64,
            Constant::F64(_) => IrType::F64,
            Constant::Bool(_) => IrType::Bool,
            Constant::Str(_) => IrType::Str,
            Constant::Null => IrType::Ptr,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::I64(n) => write!(f, "{}", n),
            Constant::F64(n) => write!(f, "{:?}", n),
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Str(s) => write!(f, "{:?}", s),
            Constant::Null => write!(f, "null"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}
