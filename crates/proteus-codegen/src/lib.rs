//! Proteus native code generation using Cranelift
//!
//! Translates an `IrModule` into machine code, either as a relocatable object
//! file ([`CodeGenerator::compile_module`]) or in process with the JIT
//! ([`JitProgram`]). Runtime functions are imported by name; the JIT binds
//! them to the addresses `proteus_runtime::symbols` reports.

mod error;
mod jit;
mod translator;

pub use error::CodegenError;
pub use jit::JitProgram;

use cranelift::codegen::isa::OwnedTargetIsa;
use cranelift::prelude::*;
use cranelift_module::{DataDescription, DataId, FuncId as ClifFuncId, Linkage, Module};
use cranelift_object::{ObjectBuilder, ObjectModule};
use std::collections::HashMap;
use tracing::{debug, trace};

use proteus_ir::{builtins, FuncSignature, IrFunction, IrModule, IrType};

use crate::translator::{clif_type, FunctionTranslator};

/// Build the host ISA.
pub(crate) fn native_isa(is_pic: bool) -> Result<OwnedTargetIsa, CodegenError> {
    let isa_builder = cranelift_native::builder()
        .map_err(|e| CodegenError::new(format!("Failed to create ISA builder: {}", e)))?;

    let mut flag_builder = settings::builder();
    flag_builder
        .set("is_pic", if is_pic { "true" } else { "false" })
        .map_err(|e| CodegenError::new(format!("Failed to set is_pic: {}", e)))?;
    if !is_pic {
        flag_builder
            .set("use_colocated_libcalls", "false")
            .map_err(|e| CodegenError::new(format!("Failed to set use_colocated_libcalls: {}", e)))?;
    }

    isa_builder
        .finish(settings::Flags::new(flag_builder))
        .map_err(|e| CodegenError::new(format!("Failed to create ISA: {}", e)))
}

/// Translates IR modules into a Cranelift module of any kind.
pub struct CodeGenerator<M: Module> {
    module: M,
    /// Cranelift context for function compilation
    ctx: codegen::Context,
    /// Function builder context (reused across functions)
    func_builder_ctx: FunctionBuilderContext,
    pointer_type: Type,
    /// Every declared callable by name
    func_ids: HashMap<String, ClifFuncId>,
    /// String literal index to data object
    string_data_map: HashMap<usize, DataId>,
}

impl CodeGenerator<ObjectModule> {
    /// Create an object-file generator for the host target
    pub fn new() -> Result<Self, CodegenError> {
        let triple = target_lexicon::Triple::host();
        debug!(%triple, "creating object backend");

        let isa = native_isa(true)?;
        let builder = ObjectBuilder::new(isa, "proteus_module", cranelift_module::default_libcall_names())
            .map_err(|e| CodegenError::new(format!("Failed to create object builder: {}", e)))?;

        Ok(Self::with_module(ObjectModule::new(builder)))
    }

    /// Compile a complete IR module to object file bytes
    pub fn compile_module(mut self, ir_module: &IrModule) -> Result<Vec<u8>, CodegenError> {
        self.define_module(ir_module)?;

        let product = self.module.finish();
        product
            .emit()
            .map_err(|e| CodegenError::new(format!("Failed to emit object file: {}", e)))
    }
}

impl<M: Module> CodeGenerator<M> {
    pub(crate) fn with_module(module: M) -> Self {
        let pointer_type = module.isa().pointer_type();
        Self {
            module,
            ctx: codegen::Context::new(),
            func_builder_ctx: FunctionBuilderContext::new(),
            pointer_type,
            func_ids: HashMap::new(),
            string_data_map: HashMap::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (M, HashMap<String, ClifFuncId>) {
        (self.module, self.func_ids)
    }

    /// Declare and define everything in `ir_module`.
    pub(crate) fn define_module(&mut self, ir_module: &IrModule) -> Result<(), CodegenError> {
        debug!(
            functions = ir_module.functions.len(),
            externs = ir_module.extern_functions.len(),
            "generating code"
        );

        for ext in &ir_module.extern_functions {
            self.declare_extern(&ext.name, &ext.signature())?;
        }

        // Declare all functions first so bodies can reference each other
        for function in &ir_module.functions {
            self.declare_function(function)?;
        }

        for (idx, string) in ir_module.string_literals.iter().enumerate() {
            self.declare_string_literal(idx, string)?;
        }

        for function in &ir_module.functions {
            self.compile_function(function, ir_module)?;
        }

        Ok(())
    }

    fn make_signature(&self, signature: &FuncSignature) -> Result<Signature, CodegenError> {
        let mut sig = self.module.make_signature();
        for ty in &signature.params {
            let cl_type = self.ir_type_to_cranelift(*ty)?;
            sig.params.push(AbiParam::new(cl_type));
        }
        if let Some(ret) = clif_type(signature.return_type, self.pointer_type) {
            sig.returns.push(AbiParam::new(ret));
        }
        Ok(sig)
    }

    fn declare_extern(&mut self, name: &str, signature: &FuncSignature) -> Result<(), CodegenError> {
        let sig = self.make_signature(signature)?;
        let id = self
            .module
            .declare_function(name, Linkage::Import, &sig)
            .map_err(|e| CodegenError::new(format!("Failed to declare extern {}: {}", name, e)))?;
        trace!(%name, "declared import");
        self.func_ids.insert(name.to_string(), id);
        Ok(())
    }

    fn declare_function(&mut self, ir_func: &IrFunction) -> Result<(), CodegenError> {
        let sig = self.make_signature(&ir_func.signature())?;

        let linkage = if ir_func.is_public || ir_func.name == builtins::ENTRY {
            Linkage::Export
        } else {
            Linkage::Local
        };

        let id = self
            .module
            .declare_function(&ir_func.name, linkage, &sig)
            .map_err(|e| CodegenError::new(format!("Failed to declare function {}: {}", ir_func.name, e)))?;
        self.func_ids.insert(ir_func.name.clone(), id);
        Ok(())
    }

    /// Private read-only data holding the literal and a NUL terminator
    fn declare_string_literal(&mut self, index: usize, string: &str) -> Result<(), CodegenError> {
        let mut data_desc = DataDescription::new();
        let mut bytes = string.as_bytes().to_vec();
        bytes.push(0);
        data_desc.define(bytes.into_boxed_slice());

        let name = format!("str_literal_{}", index);
        let data_id = self
            .module
            .declare_data(&name, Linkage::Local, false, false)
            .map_err(|e| CodegenError::new(format!("Failed to declare string literal: {}", e)))?;

        self.module
            .define_data(data_id, &data_desc)
            .map_err(|e| CodegenError::new(format!("Failed to define string literal: {}", e)))?;

        self.string_data_map.insert(index, data_id);
        Ok(())
    }

    fn compile_function(&mut self, ir_func: &IrFunction, ir_module: &IrModule) -> Result<(), CodegenError> {
        let clif_func_id = *self
            .func_ids
            .get(&ir_func.name)
            .ok_or_else(|| CodegenError::new(format!("Function {} not declared", ir_func.name)))?;

        trace!(function = %ir_func.name, "compiling");
        self.ctx.func.signature = self.make_signature(&ir_func.signature())?;

        let pointer_type = self.pointer_type;
        let builder = FunctionBuilder::new(&mut self.ctx.func, &mut self.func_builder_ctx);

        let mut translator = FunctionTranslator::new(
            &mut self.module,
            &self.func_ids,
            &self.string_data_map,
            ir_func,
            ir_module,
            pointer_type,
        );
        translator.translate(builder)?;

        if let Err(errors) = cranelift::codegen::verify_function(&self.ctx.func, self.module.isa()) {
            return Err(CodegenError::new(format!(
                "Verifier errors in function '{}':\n{}",
                ir_func.name, errors
            )));
        }

        self.module
            .define_function(clif_func_id, &mut self.ctx)
            .map_err(|e| CodegenError::new(format!("Failed to define function {}: {}", ir_func.name, e)))?;

        self.module.clear_context(&mut self.ctx);
        Ok(())
    }

    fn ir_type_to_cranelift(&self, ir_type: IrType) -> Result<Type, CodegenError> {
        clif_type(ir_type, self.pointer_type)
            .ok_or_else(|| CodegenError::new("Cannot convert Void to Cranelift type"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proteus_ir::{Constant, FuncId, Instruction, Place, RValue, Terminator, Value as IrValue};

    fn lower(source: &str) -> IrModule {
        let program = proteus_parser::parse_source(source, 0).unwrap();
        proteus_ir::lower_program(&program).unwrap()
    }

    #[test]
    fn test_codegen_creation() {
        assert!(CodeGenerator::new().is_ok());
    }

    #[test]
    fn test_type_conversion() {
        let codegen = CodeGenerator::new().unwrap();

        assert_eq!(codegen.ir_type_to_cranelift(IrType::I64).unwrap(), types::I64);
        assert_eq!(codegen.ir_type_to_cranelift(IrType::F64).unwrap(), types::F64);
        assert_eq!(codegen.ir_type_to_cranelift(IrType::Bool).unwrap(), types::I8);
        assert!(codegen.ir_type_to_cranelift(IrType::Ptr).is_ok());
        assert!(codegen.ir_type_to_cranelift(IrType::Void).is_err());
    }

    #[test]
    fn test_hand_built_function_compiles() {
        let mut module = IrModule::new();

        let mut func = IrFunction::new(FuncId(0), "answer".to_string(), vec![], IrType::I64);
        func.is_public = true;
        let entry = func.new_block();
        func.entry_block = entry;

        let result = func.add_temp(IrType::I64);
        func.block_mut(entry).push_instruction(Instruction::Assign {
            dest: Place::Temp(result),
            value: RValue::Use(IrValue::Const(Constant::I64(42))),
        });
        func.block_mut(entry)
            .set_terminator(Terminator::Return(Some(IrValue::Temp(result))));
        module.add_function(func);

        let bytes = CodeGenerator::new().unwrap().compile_module(&module).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_object_file_for_program() {
        let module = lower(
            r#"
            int add(int a, int b) { return a + b; }
            x.y = add(3, 4);
            print_int(x.y);
            print_str("done");
            double d = 1 / 0;
            "#,
        );
        let bytes = CodeGenerator::new().unwrap().compile_module(&module).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_unknown_callee_is_an_error() {
        let mut module = IrModule::new();
        let mut func = IrFunction::new(FuncId(0), "main".to_string(), vec![], IrType::Void);
        let entry = func.new_block();
        func.block_mut(entry).push_instruction(Instruction::Call {
            dest: None,
            callee: "nowhere".to_string(),
            args: vec![],
        });
        func.block_mut(entry).set_terminator(Terminator::Return(None));
        module.add_function(func);

        let err = CodeGenerator::new().unwrap().compile_module(&module).unwrap_err();
        assert!(err.message.contains("nowhere"));
    }
}
