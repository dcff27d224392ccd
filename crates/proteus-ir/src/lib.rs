//! Intermediate Representation (IR) for the Proteus compiler
//!
//! A small, explicitly typed representation between the AST and Cranelift.
//! Functions hold typed locals and temps, and a body made of basic blocks.
//! Every object operation is an ordinary call to one of the runtime functions
//! listed in [`builtins`].

pub mod builtins;
pub mod lower;
pub mod types;
pub mod value;
pub mod instruction;
pub mod function;
pub mod module;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a basic block within a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// Unique identifier for a local variable within a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalId(pub usize);

/// Unique identifier for a temporary value within a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub usize);

/// Unique identifier for a function within a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncId(pub usize);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

impl std::fmt::Display for LocalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_local{}", self.0)
    }
}

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "_temp{}", self.0)
    }
}

impl std::fmt::Display for FuncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "func{}", self.0)
    }
}

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;
pub use value::*;
pub use instruction::*;
pub use function::*;
pub use module::*;
pub use lower::{lower_program, LowerError, Lowerer};

#[cfg(test)]
mod tests {
    use super::*;
    use proteus_ast::TypeTag;

    fn empty_function() -> IrFunction {
        IrFunction::new(FuncId(0), "test".to_string(), vec![], IrType::Void)
    }

    #[test]
    fn test_block_creation() {
        let mut func = empty_function();
        let block_id = func.new_block();
        assert_eq!(block_id, BlockId(0));
        assert_eq!(func.blocks.len(), 1);
        assert_eq!(func.block(block_id).terminator, Terminator::Unreachable);
    }

    #[test]
    fn test_params_are_the_first_locals() {
        let mut func = IrFunction::new(
            FuncId(0),
            "f".to_string(),
            vec![(LocalId(0), IrType::I64), (LocalId(1), IrType::Ptr)],
            IrType::I64,
        );

        assert_eq!(func.add_local(IrType::F64), LocalId(2));
        assert_eq!(func.local_type(LocalId(1)), IrType::Ptr);
        assert_eq!(func.signature().to_string(), "fn(i64, ptr) -> i64");
    }

    #[test]
    fn test_temp_creation() {
        let mut func = empty_function();
        let temp1 = func.add_temp(IrType::I64);
        let temp2 = func.add_temp(IrType::F64);

        assert_eq!(temp1, TempId(0));
        assert_eq!(temp2, TempId(1));
        assert_eq!(func.value_type(&Value::Temp(temp2)), IrType::F64);
        assert_eq!(func.value_type(&Value::Const(Constant::Null)), IrType::Ptr);
    }

    #[test]
    fn test_string_interning() {
        let mut module = IrModule::new();
        let idx1 = module.intern_string("hello".to_string());
        let idx2 = module.intern_string("world".to_string());
        let idx3 = module.intern_string("hello".to_string());

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(module.string_literals.len(), 2);
        assert_eq!(module.string_index("world"), Some(1));
    }

    #[test]
    fn test_type_sizes() {
        assert_eq!(IrType::I64.size_bytes(), 8);
        assert_eq!(IrType::Bool.size_bytes(), 1);
        assert_eq!(IrType::Ptr.size_bytes(), 8);
        assert_eq!(IrType::Void.size_bytes(), 0);
        assert!(IrType::Str.is_pointer());
        assert!(!IrType::F64.is_pointer());
    }

    #[test]
    fn test_type_from_tag() {
        assert_eq!(IrType::from_tag(TypeTag::Integer), IrType::I64);
        assert_eq!(IrType::from_tag(TypeTag::Double), IrType::F64);
        assert_eq!(IrType::from_tag(TypeTag::Bool), IrType::Bool);
        assert_eq!(IrType::from_tag(TypeTag::Object), IrType::Ptr);
        assert_eq!(IrType::from_tag(TypeTag::String), IrType::Str);
        assert_eq!(IrType::from_tag(TypeTag::Void), IrType::Void);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(IrType::I64.default_constant(), Some(Constant::I64(0)));
        assert_eq!(IrType::Ptr.default_constant(), Some(Constant::Null));
        assert_eq!(IrType::Void.default_constant(), None);
    }

    #[test]
    fn test_callable_signature() {
        let mut module = IrModule::new();
        builtins::declare_runtime_externs(&mut module);

        let sig = module.callable_signature(builtins::GET_SLOT).unwrap();
        assert_eq!(sig.params, vec![IrType::Ptr, IrType::Str, IrType::I64]);
        assert!(module.callable_signature("nope").is_none());
    }
}
