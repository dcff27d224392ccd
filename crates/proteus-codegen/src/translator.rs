//! Function translation logic for converting Proteus IR to Cranelift IR

use cranelift::prelude::*;
use cranelift_module::{DataId, FuncId as ClifFuncId, Module};
use std::collections::HashMap;

use proteus_ir::{
    BinOp, Block as IrBlock, BlockId, Constant, Instruction, IrFunction, IrModule, IrType,
    LocalId, Place, RValue, TempId, Terminator, Value as IrValue,
};

use crate::error::CodegenError;

use cranelift::prelude::Block as ClifBlock;
use cranelift::prelude::Value as ClifValue;

/// Context for translating a single function
pub(crate) struct FunctionTranslator<'a, M: Module> {
    /// Module reference for declaring function references
    module: &'a mut M,
    /// Every callable by name (defined functions and imports)
    func_ids: &'a HashMap<String, ClifFuncId>,
    /// Map from string literal indices to data IDs
    string_data_map: &'a HashMap<usize, DataId>,
    /// Params and temps map to SSA values, other locals to stack slot addresses
    value_map: HashMap<ValueKey, ClifValue>,
    /// Map from IR block IDs to Cranelift blocks
    block_map: HashMap<BlockId, ClifBlock>,
    ir_func: &'a IrFunction,
    ir_module: &'a IrModule,
    pointer_type: Type,
}

/// Key for value mapping (Local or Temp)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ValueKey {
    Local(LocalId),
    Temp(TempId),
}

/// Cranelift type of an IR type; `None` for void.
pub(crate) fn clif_type(ir_type: IrType, pointer_type: Type) -> Option<Type> {
    match ir_type {
        IrType::I64 => Some(types::I64),
        IrType::F64 => Some(types::F64),
        IrType::Bool => Some(types::I8),
        IrType::Ptr | IrType::Str => Some(pointer_type),
        IrType::Void => None,
    }
}

impl<'a, M: Module> FunctionTranslator<'a, M> {
    pub(crate) fn new(
        module: &'a mut M,
        func_ids: &'a HashMap<String, ClifFuncId>,
        string_data_map: &'a HashMap<usize, DataId>,
        ir_func: &'a IrFunction,
        ir_module: &'a IrModule,
        pointer_type: Type,
    ) -> Self {
        Self {
            module,
            func_ids,
            string_data_map,
            value_map: HashMap::new(),
            block_map: HashMap::new(),
            ir_func,
            ir_module,
            pointer_type,
        }
    }

    fn ir_type_to_cranelift(&self, ir_type: IrType) -> Result<Type, CodegenError> {
        clif_type(ir_type, self.pointer_type)
            .ok_or_else(|| CodegenError::new("Cannot convert Void to Cranelift type"))
    }

    fn is_param(&self, local: LocalId) -> bool {
        self.ir_func.params.iter().any(|(id, _)| *id == local)
    }

    /// Translate the entire function
    pub(crate) fn translate(&mut self, mut builder: FunctionBuilder) -> Result<(), CodegenError> {
        let entry_block = builder.create_block();
        builder.append_block_params_for_function_params(entry_block);
        builder.switch_to_block(entry_block);
        builder.seal_block(entry_block);

        for (i, (local_id, _)) in self.ir_func.params.iter().enumerate() {
            let value = builder.block_params(entry_block)[i];
            self.value_map.insert(ValueKey::Local(*local_id), value);
        }

        // One stack slot per non-parameter local
        for (local_id, ty) in &self.ir_func.locals {
            if self.value_map.contains_key(&ValueKey::Local(*local_id)) {
                continue;
            }
            let slot = builder.create_sized_stack_slot(StackSlotData::new(
                StackSlotKind::ExplicitSlot,
                ty.size_bytes() as u32,
                3,
            ));
            let addr = builder.ins().stack_addr(self.pointer_type, slot, 0);
            self.value_map.insert(ValueKey::Local(*local_id), addr);
        }

        for block in &self.ir_func.blocks {
            let clif_block = builder.create_block();
            self.block_map.insert(block.id, clif_block);
        }

        let target = *self.block_map.get(&self.ir_func.entry_block).ok_or_else(|| {
            CodegenError::new(format!("Entry block {} not found", self.ir_func.entry_block))
        })?;
        builder.ins().jump(target, &[]);

        let ir_func = self.ir_func;
        for ir_block in &ir_func.blocks {
            self.translate_block(&mut builder, ir_block)?;
        }

        builder.seal_all_blocks();
        builder.finalize();

        Ok(())
    }

    fn translate_block(&mut self, builder: &mut FunctionBuilder, ir_block: &IrBlock) -> Result<(), CodegenError> {
        let clif_block = *self.block_map.get(&ir_block.id).ok_or_else(|| {
            CodegenError::new(format!("Block {} not found in block_map", ir_block.id))
        })?;

        builder.switch_to_block(clif_block);

        for instr in &ir_block.instructions {
            self.translate_instruction(builder, instr)?;
        }

        self.translate_terminator(builder, &ir_block.terminator)
    }

    fn translate_instruction(&mut self, builder: &mut FunctionBuilder, instr: &Instruction) -> Result<(), CodegenError> {
        match instr {
            Instruction::Assign { dest, value } => {
                let (val, ty) = self.translate_rvalue(builder, value)?;
                self.store_to_place(builder, dest, val, ty)?;
            }
            Instruction::Call { dest, callee, args } => {
                let result = self.translate_call(builder, callee, args)?;
                if let (Some(dest), Some((val, ty))) = (dest, result) {
                    self.store_to_place(builder, dest, val, ty)?;
                }
            }
        }
        Ok(())
    }

    fn translate_terminator(&mut self, builder: &mut FunctionBuilder, terminator: &Terminator) -> Result<(), CodegenError> {
        match terminator {
            Terminator::Return(Some(value)) => {
                let ret = self.ir_func.return_type;
                if ret == IrType::Void {
                    builder.ins().return_(&[]);
                } else {
                    let val = self.translate_value(builder, value)?;
                    let from = self.ir_func.value_type(value);
                    let val = self.coerce(builder, val, from, ret)?;
                    builder.ins().return_(&[val]);
                }
            }
            Terminator::Return(None) => {
                if self.ir_func.return_type != IrType::Void {
                    return Err(CodegenError::new(format!(
                        "Function '{}' returns no value",
                        self.ir_func.name
                    )));
                }
                builder.ins().return_(&[]);
            }
            Terminator::Unreachable => {
                builder.ins().trap(TrapCode::unwrap_user(1));
            }
        }
        Ok(())
    }

    /// Translate an RValue, returning the value and its IR type
    fn translate_rvalue(
        &mut self,
        builder: &mut FunctionBuilder,
        rvalue: &RValue,
    ) -> Result<(ClifValue, IrType), CodegenError> {
        match rvalue {
            RValue::Use(value) => {
                let val = self.translate_value(builder, value)?;
                Ok((val, self.ir_func.value_type(value)))
            }
            RValue::BinaryOp { op, left, right } => {
                let left_ty = self.ir_func.value_type(left);
                let right_ty = self.ir_func.value_type(right);
                let ty = if left_ty == IrType::F64 || right_ty == IrType::F64 {
                    IrType::F64
                } else {
                    IrType::I64
                };

                let lhs = self.translate_value(builder, left)?;
                let lhs = self.coerce(builder, lhs, left_ty, ty)?;
                let rhs = self.translate_value(builder, right)?;
                let rhs = self.coerce(builder, rhs, right_ty, ty)?;

                Ok((self.translate_binop(builder, *op, lhs, rhs, ty == IrType::F64), ty))
            }
        }
    }

    fn translate_value(&mut self, builder: &mut FunctionBuilder, value: &IrValue) -> Result<ClifValue, CodegenError> {
        match value {
            IrValue::Const(constant) => self.translate_constant(builder, constant),

            IrValue::Local(local_id) => {
                let addr = self
                    .value_map
                    .get(&ValueKey::Local(*local_id))
                    .copied()
                    .ok_or_else(|| CodegenError::new(format!("Local {} not found", local_id)))?;

                if self.is_param(*local_id) {
                    return Ok(addr);
                }

                let cl_type = self.ir_type_to_cranelift(self.ir_func.local_type(*local_id))?;
                Ok(builder.ins().load(cl_type, MemFlags::new(), addr, 0))
            }

            IrValue::Temp(temp_id) => self
                .value_map
                .get(&ValueKey::Temp(*temp_id))
                .copied()
                .ok_or_else(|| CodegenError::new(format!("Temp {} not found", temp_id))),
        }
    }

    fn translate_constant(&mut self, builder: &mut FunctionBuilder, constant: &Constant) -> Result<ClifValue, CodegenError> {
        let val = match constant {
            Constant::I64(n) => builder.ins().iconst(types::I64, *n),
            Constant::F64(f) => builder.ins().f64const(*f),
            Constant::Bool(b) => builder.ins().iconst(types::I8, i64::from(*b)),
            Constant::Null => builder.ins().iconst(self.pointer_type, 0),
            Constant::Str(s) => {
                let data_id = self
                    .ir_module
                    .string_index(s)
                    .and_then(|idx| self.string_data_map.get(&idx))
                    .copied()
                    .ok_or_else(|| CodegenError::new(format!("String literal {:?} not interned in module", s)))?;
                let gv = self.module.declare_data_in_func(data_id, builder.func);
                builder.ins().global_value(self.pointer_type, gv)
            }
        };
        Ok(val)
    }

    fn translate_binop(
        &self,
        builder: &mut FunctionBuilder,
        op: BinOp,
        lhs: ClifValue,
        rhs: ClifValue,
        is_float: bool,
    ) -> ClifValue {
        match op {
            BinOp::Add if is_float => builder.ins().fadd(lhs, rhs),
            BinOp::Add => builder.ins().iadd(lhs, rhs),
            BinOp::Sub if is_float => builder.ins().fsub(lhs, rhs),
            BinOp::Sub => builder.ins().isub(lhs, rhs),
            BinOp::Mul if is_float => builder.ins().fmul(lhs, rhs),
            BinOp::Mul => builder.ins().imul(lhs, rhs),
            BinOp::Div if is_float => builder.ins().fdiv(lhs, rhs),
            BinOp::Div => {
                // sdiv traps on 0 and on MIN / -1. Divide by 1 in both cases,
                // then select 0 or the wrapping negation as the result.
                let zero = builder.ins().iconst(types::I64, 0);
                let is_zero = builder.ins().icmp(IntCC::Equal, rhs, zero);
                let is_neg_one = builder.ins().icmp_imm(IntCC::Equal, rhs, -1);
                let needs_guard = builder.ins().bor(is_zero, is_neg_one);
                let one = builder.ins().iconst(types::I64, 1);
                let safe_rhs = builder.ins().select(needs_guard, one, rhs);
                let quotient = builder.ins().sdiv(lhs, safe_rhs);
                let negated = builder.ins().ineg(lhs);
                let quotient = builder.ins().select(is_neg_one, negated, quotient);
                builder.ins().select(is_zero, zero, quotient)
            }
        }
    }

    /// Convert `val` (of IR type `from`) for use where `to` is expected.
    ///
    /// Numbers convert by value; a double moving into or out of a pointer
    /// word (an object slot) keeps its bits.
    fn coerce(
        &self,
        builder: &mut FunctionBuilder,
        val: ClifValue,
        from: IrType,
        to: IrType,
    ) -> Result<ClifValue, CodegenError> {
        let target = self.ir_type_to_cranelift(to)?;
        let actual = builder.func.dfg.value_type(val);

        if actual == target {
            return Ok(val);
        }

        let coerced = if actual.is_float() {
            if to.is_pointer() {
                let bits = builder.ins().bitcast(types::I64, MemFlags::new(), val);
                self.resize_int(builder, bits, target)
            } else if to == IrType::Bool {
                let zero = builder.ins().f64const(0.0);
                builder.ins().fcmp(FloatCC::NotEqual, val, zero)
            } else {
                builder.ins().fcvt_to_sint_sat(target, val)
            }
        } else if target.is_float() {
            let wide = self.resize_int(builder, val, types::I64);
            if from.is_pointer() {
                builder.ins().bitcast(types::F64, MemFlags::new(), wide)
            } else {
                builder.ins().fcvt_from_sint(types::F64, wide)
            }
        } else if to == IrType::Bool {
            builder.ins().icmp_imm(IntCC::NotEqual, val, 0)
        } else {
            self.resize_int(builder, val, target)
        };
        Ok(coerced)
    }

    fn resize_int(&self, builder: &mut FunctionBuilder, val: ClifValue, target: Type) -> ClifValue {
        let actual = builder.func.dfg.value_type(val);
        if actual.bits() < target.bits() {
            builder.ins().uextend(target, val)
        } else if actual.bits() > target.bits() {
            builder.ins().ireduce(target, val)
        } else {
            val
        }
    }

    /// Translate a call by name, returning the result and its IR type
    fn translate_call(
        &mut self,
        builder: &mut FunctionBuilder,
        callee: &str,
        args: &[IrValue],
    ) -> Result<Option<(ClifValue, IrType)>, CodegenError> {
        let signature = self
            .ir_module
            .callable_signature(callee)
            .ok_or_else(|| CodegenError::new(format!("Function '{}' not found in module or externs", callee)))?;
        let clif_func_id = *self
            .func_ids
            .get(callee)
            .ok_or_else(|| CodegenError::new(format!("Function '{}' not declared", callee)))?;

        if signature.params.len() != args.len() {
            return Err(CodegenError::new(format!(
                "Function '{}' expects {} arguments, got {}",
                callee,
                signature.params.len(),
                args.len()
            )));
        }

        let mut arg_vals = Vec::with_capacity(args.len());
        for (arg, expected) in args.iter().zip(&signature.params) {
            let val = self.translate_value(builder, arg)?;
            let from = self.ir_func.value_type(arg);
            arg_vals.push(self.coerce(builder, val, from, *expected)?);
        }

        let func_ref = self.module.declare_func_in_func(clif_func_id, builder.func);
        let call = builder.ins().call(func_ref, &arg_vals);

        Ok(builder
            .inst_results(call)
            .first()
            .map(|val| (*val, signature.return_type)))
    }

    fn store_to_place(
        &mut self,
        builder: &mut FunctionBuilder,
        place: &Place,
        value: ClifValue,
        value_ty: IrType,
    ) -> Result<(), CodegenError> {
        match place {
            Place::Local(local_id) => {
                if self.is_param(*local_id) {
                    return Err(CodegenError::new(format!("Cannot store to parameter {}", local_id)));
                }
                let addr = self
                    .value_map
                    .get(&ValueKey::Local(*local_id))
                    .copied()
                    .ok_or_else(|| CodegenError::new(format!("Local {} not found", local_id)))?;

                let value = self.coerce(builder, value, value_ty, self.ir_func.local_type(*local_id))?;
                builder.ins().store(MemFlags::new(), value, addr, 0);
            }
            Place::Temp(temp_id) => {
                let value = self.coerce(builder, value, value_ty, self.ir_func.temp_type(*temp_id))?;
                self.value_map.insert(ValueKey::Temp(*temp_id), value);
            }
        }
        Ok(())
    }
}
