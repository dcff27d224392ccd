//! In-process execution through the Cranelift JIT.

use cranelift_jit::{JITBuilder, JITModule};
use cranelift_module::{FuncId as ClifFuncId, Module};
use std::collections::HashMap;
use tracing::debug;

use proteus_ir::{builtins, IrModule};

use crate::{native_isa, CodeGenerator, CodegenError};

/// A module compiled into executable memory, bound to the runtime library.
pub struct JitProgram {
    module: JITModule,
    func_ids: HashMap<String, ClifFuncId>,
}

impl JitProgram {
    /// Compile and finalize every function of `ir_module`.
    pub fn compile(ir_module: &IrModule) -> Result<Self, CodegenError> {
        let isa = native_isa(false)?;
        let mut builder = JITBuilder::with_isa(isa, cranelift_module::default_libcall_names());
        for (name, addr) in proteus_runtime::symbols() {
            builder.symbol(name, addr);
        }

        let mut generator = CodeGenerator::with_module(JITModule::new(builder));
        generator.define_module(ir_module)?;
        let (mut module, func_ids) = generator.into_parts();

        module
            .finalize_definitions()
            .map_err(|e| CodegenError::new(format!("Failed to finalize JIT module: {}", e)))?;
        debug!(functions = ir_module.functions.len(), "JIT module finalized");

        Ok(Self { module, func_ids })
    }

    /// Address of a compiled function; `None` for imports and unknown names.
    pub fn function(&self, name: &str) -> Option<*const u8> {
        let id = *self.func_ids.get(name)?;
        if self.module.declarations().get_function_decl(id).linkage == cranelift_module::Linkage::Import {
            return None;
        }
        Some(self.module.get_finalized_function(id))
    }

    /// Invoke the entry function once.
    pub fn run(&self) -> Result<(), CodegenError> {
        let ptr = self
            .function(builtins::ENTRY)
            .ok_or_else(|| CodegenError::new("Entry function not found"))?;
        debug!("running entry");
        // SAFETY: the entry is compiled with signature `fn()` by the lowering
        let entry: extern "C" fn() = unsafe { std::mem::transmute(ptr) };
        entry();
        Ok(())
    }
}
