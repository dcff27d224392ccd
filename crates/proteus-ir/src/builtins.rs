//! Functions every module declares.
//!
//! `newobj`, `getSlot` and `putSlot` form the object model and are provided
//! by the runtime library; `objalloc` is defined in every module on top of
//! `newobj`. The print functions are the core output routines.

use crate::{FuncSignature, IrModule, IrType};

pub const NEW_OBJ: &str = "newobj";
pub const GET_SLOT: &str = "getSlot";
pub const PUT_SLOT: &str = "putSlot";
pub const OBJ_ALLOC: &str = "objalloc";
pub const PRINT_INT: &str = "print_int";
pub const PRINT_DOUBLE: &str = "print_double";
pub const PRINT_STR: &str = "print_str";

/// Synthetic entry function holding the program's top-level statements.
pub const ENTRY: &str = "main";

/// Runtime-provided functions: (name, params, return type).
pub fn runtime_externs() -> Vec<(&'static str, Vec<IrType>, IrType)> {
    vec![
        (NEW_OBJ, vec![IrType::Ptr], IrType::Ptr),
        (GET_SLOT, vec![IrType::Ptr, IrType::Str, IrType::I64], IrType::Ptr),
        (PUT_SLOT, vec![IrType::Ptr, IrType::Str, IrType::Ptr], IrType::Void),
        (PRINT_INT, vec![IrType::I64], IrType::Void),
        (PRINT_DOUBLE, vec![IrType::F64], IrType::Void),
        (PRINT_STR, vec![IrType::Str], IrType::Void),
    ]
}

/// Declare every runtime extern in `module`, returning their signatures.
pub fn declare_runtime_externs(module: &mut IrModule) -> Vec<(String, FuncSignature)> {
    runtime_externs()
        .into_iter()
        .map(|(name, params, return_type)| {
            module.add_extern_function(name.to_string(), params.clone(), return_type);
            (name.to_string(), FuncSignature { params, return_type })
        })
        .collect()
}

pub fn objalloc_signature() -> FuncSignature {
    FuncSignature {
        params: vec![],
        return_type: IrType::Ptr,
    }
}

pub fn entry_signature() -> FuncSignature {
    FuncSignature {
        params: vec![],
        return_type: IrType::Void,
    }
}
