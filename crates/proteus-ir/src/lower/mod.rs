//! AST → IR Lowering
//!
//! Translates a Proteus `Program` into an `IrModule` suitable for codegen.
//! Every function body, including the synthetic entry, lowers into a single
//! basic block: the language has no control flow, and a return statement only
//! records the value the function hands back once its body is done.

use std::collections::HashMap;

use proteus_ast::*;
use tracing::{debug, trace, warn};

use crate::{
    builtins, BinOp, BlockId, Constant, FuncId, FuncSignature, Instruction, IrFunction, IrModule,
    IrType, LocalId, Place, RValue, TempId, Terminator, Value,
};

mod error;
mod resolve;
mod scope;

pub use error::LowerError;
pub use scope::{Binding, Scope, ScopeStack};

/// Lower a whole program with a fresh [`Lowerer`].
pub fn lower_program(program: &Program) -> Result<IrModule, LowerError> {
    Lowerer::new().lower_program(program)
}

/// Main lowering context.
pub struct Lowerer {
    module: IrModule,
    next_func_id: usize,
    /// Scope stack (innermost last)
    scopes: ScopeStack,
    /// Every callable name: runtime externs, user externs, defined functions
    functions: HashMap<String, FuncSignature>,
}

/// Context for lowering a single function body.
pub(crate) struct FuncCtx<'a> {
    func: &'a mut IrFunction,
    current_block: BlockId,
}

impl<'a> FuncCtx<'a> {
    fn emit(&mut self, instr: Instruction) {
        self.func.block_mut(self.current_block).push_instruction(instr);
    }

    fn set_terminator(&mut self, term: Terminator) {
        self.func.block_mut(self.current_block).set_terminator(term);
    }

    fn add_local(&mut self, ty: IrType) -> LocalId {
        self.func.add_local(ty)
    }

    fn add_temp(&mut self, ty: IrType) -> TempId {
        self.func.add_temp(ty)
    }
}

impl Lowerer {
    pub fn new() -> Self {
        let mut module = IrModule::new();
        let functions = builtins::declare_runtime_externs(&mut module)
            .into_iter()
            .collect();

        Self {
            module,
            next_func_id: 0,
            scopes: ScopeStack::new(),
            functions,
        }
    }

    fn alloc_func_id(&mut self) -> FuncId {
        let id = FuncId(self.next_func_id);
        self.next_func_id += 1;
        id
    }

    /// Lower an entire program into an IR module.
    ///
    /// The module holds the runtime externs, the `objalloc` helper, every
    /// user function, and finally the parameterless `main` entry.
    pub fn lower_program(mut self, program: &Program) -> Result<IrModule, LowerError> {
        debug!(statements = program.body.stmts.len(), "lowering program");

        let entry_id = self.alloc_func_id();
        self.functions
            .insert(builtins::ENTRY.to_string(), builtins::entry_signature());
        self.define_objalloc();

        let mut entry_func = IrFunction::new(entry_id, builtins::ENTRY.to_string(), vec![], IrType::Void);
        entry_func.is_public = true;
        entry_func.span = Some(program.span);

        let entry = entry_func.new_block();
        entry_func.entry_block = entry;

        let mut ctx = FuncCtx {
            func: &mut entry_func,
            current_block: entry,
        };

        self.scopes.push();
        let result = self.emit_block(&mut ctx, &program.body);
        let frame = self.scopes.pop();
        result?;

        if frame.and_then(Scope::into_pending_return).is_some() {
            debug!("top-level return value ignored");
        }
        ctx.set_terminator(Terminator::Return(None));

        self.module.add_function(entry_func);

        debug!(
            functions = self.module.functions.len(),
            externs = self.module.extern_functions.len(),
            strings = self.module.string_literals.len(),
            "lowering finished"
        );
        Ok(self.module)
    }

    /// `object objalloc() { return newobj(null); }`
    fn define_objalloc(&mut self) {
        let signature = builtins::objalloc_signature();
        let mut func = IrFunction::new(
            self.alloc_func_id(),
            builtins::OBJ_ALLOC.to_string(),
            vec![],
            signature.return_type,
        );
        let entry = func.new_block();
        func.entry_block = entry;

        let mut ctx = FuncCtx {
            func: &mut func,
            current_block: entry,
        };
        let obj = self.emit_runtime_call(
            &mut ctx,
            builtins::NEW_OBJ,
            vec![Value::Const(Constant::Null)],
            IrType::Ptr,
        );
        ctx.set_terminator(Terminator::Return(Some(obj)));

        self.functions.insert(builtins::OBJ_ALLOC.to_string(), signature);
        self.module.add_function(func);
    }

    // =========================================================================
    // Statements
    // =========================================================================

    /// Emit each statement in order; the block's value is the last one's.
    fn emit_block(&mut self, ctx: &mut FuncCtx, block: &Block) -> Result<Option<Value>, LowerError> {
        let mut last = None;
        for stmt in &block.stmts {
            last = self.emit_stmt(ctx, &stmt.value, stmt.span)?;
        }
        Ok(last)
    }

    fn emit_stmt(&mut self, ctx: &mut FuncCtx, stmt: &Stmt, span: Span) -> Result<Option<Value>, LowerError> {
        match stmt {
            Stmt::Expr(expr) => self.emit_expr(ctx, expr),
            Stmt::Return(expr) => {
                // A value-returning function cannot return a void call
                let value = if ctx.func.return_type == IrType::Void {
                    self.emit_expr(ctx, expr)?
                } else {
                    Some(self.emit_value(ctx, expr)?)
                };
                if let Some(value) = &value {
                    trace!(%value, "pending return");
                    self.scopes.set_pending_return(value.clone());
                }
                Ok(value)
            }
            Stmt::VarDecl(decl) => self.emit_var_decl(ctx, decl),
            Stmt::Extern(decl) => {
                self.declare_extern(decl, span)?;
                Ok(None)
            }
            Stmt::Function(decl) => {
                self.lower_function(decl, span)?;
                Ok(None)
            }
        }
    }

    fn emit_var_decl(&mut self, ctx: &mut FuncCtx, decl: &VarDecl) -> Result<Option<Value>, LowerError> {
        let name = &decl.name.value.name;
        let ty = IrType::from_tag(decl.ty.value);
        let default = ty.default_constant().ok_or_else(|| LowerError::VoidVariable {
            name: name.clone(),
            span: decl.name.span,
        })?;
        trace!(%name, %ty, "variable declaration");

        let local = ctx.add_local(ty);
        ctx.emit(Instruction::Assign {
            dest: Place::Local(local),
            value: RValue::Use(Value::Const(default)),
        });
        self.scopes.bind(name, Binding { local, ty });

        if let Some(init) = &decl.init {
            let target = Reference::single(decl.name.clone());
            self.emit_assignment(ctx, &target, init)?;
        }
        Ok(None)
    }

    fn declare_extern(&mut self, decl: &ExternDecl, span: Span) -> Result<(), LowerError> {
        let name = &decl.name.value.name;
        let signature = self.signature_of(&decl.params, decl.ret.value)?;

        if let Some(existing) = self.functions.get(name) {
            // Restating a known extern verbatim is harmless
            if *existing == signature && self.module.find_extern(name).is_some() {
                trace!(%name, "extern redeclared");
                return Ok(());
            }
            return Err(LowerError::DuplicateFunction {
                name: name.clone(),
                span,
            });
        }

        debug!(%name, %signature, "extern declaration");
        self.module
            .add_extern_function(name.clone(), signature.params.clone(), signature.return_type);
        self.functions.insert(name.clone(), signature);
        Ok(())
    }

    fn lower_function(&mut self, decl: &FunctionDecl, span: Span) -> Result<(), LowerError> {
        let name = decl.name.value.name.clone();
        if self.functions.contains_key(&name) {
            return Err(LowerError::DuplicateFunction { name, span });
        }

        let signature = self.signature_of(&decl.params, decl.ret.value)?;
        debug!(%name, %signature, "lowering function");
        // Registered before the body so the function can call itself
        self.functions.insert(name.clone(), signature.clone());

        let func_id = self.alloc_func_id();
        let ir_params: Vec<(LocalId, IrType)> = signature
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| (LocalId(i), *ty))
            .collect();

        let mut ir_func = IrFunction::new(func_id, name.clone(), ir_params.clone(), signature.return_type);
        ir_func.span = Some(span);
        let entry = ir_func.new_block();
        ir_func.entry_block = entry;

        let mut ctx = FuncCtx {
            func: &mut ir_func,
            current_block: entry,
        };

        self.scopes.push();

        // Copy each incoming argument into its own storage
        for (param, (param_local, ty)) in decl.params.iter().zip(&ir_params) {
            let local = ctx.add_local(*ty);
            ctx.emit(Instruction::Assign {
                dest: Place::Local(local),
                value: RValue::Use(Value::Local(*param_local)),
            });
            self.scopes.bind(&param.name.value.name, Binding { local, ty: *ty });
        }

        let result = self.emit_block(&mut ctx, &decl.body.value);
        let frame = self.scopes.pop();
        result?;

        let pending = frame.and_then(Scope::into_pending_return);
        let terminator = match (signature.return_type, pending) {
            (IrType::Void, _) => Terminator::Return(None),
            (_, Some(value)) => Terminator::Return(Some(value)),
            (ret, None) => {
                warn!(function = %name, "no return statement, returning the default {} value", ret);
                Terminator::Return(ret.default_constant().map(Value::Const))
            }
        };
        ctx.set_terminator(terminator);

        self.module.add_function(ir_func);
        Ok(())
    }

    fn signature_of(&self, params: &[Param], ret: TypeTag) -> Result<FuncSignature, LowerError> {
        let mut types = Vec::with_capacity(params.len());
        for param in params {
            if param.ty.value.is_void() {
                return Err(LowerError::VoidVariable {
                    name: param.name.value.name.clone(),
                    span: param.name.span,
                });
            }
            types.push(IrType::from_tag(param.ty.value));
        }
        Ok(FuncSignature {
            params: types,
            return_type: IrType::from_tag(ret),
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn emit_expr(&mut self, ctx: &mut FuncCtx, expr: &Node<Expr>) -> Result<Option<Value>, LowerError> {
        let value = match &expr.value {
            Expr::Integer(n) => Value::Const(Constant::I64(*n)),
            Expr::Double(n) => Value::Const(Constant::F64(*n)),
            Expr::Str(s) => {
                self.module.intern_string(s.clone());
                Value::Const(Constant::Str(s.clone()))
            }
            Expr::Ident(ident) => self.emit_identifier(ctx, ident),
            Expr::Reference(reference) => {
                if reference.is_single() {
                    self.emit_identifier(ctx, &reference.first().value)
                } else {
                    self.resolve_reference(ctx, reference, false)
                }
            }
            Expr::Call { callee, args } => return self.emit_call(ctx, callee, args),
            Expr::Binary { left, op, right } => self.emit_binary(ctx, left, *op, right, expr.span)?,
            Expr::Assignment { target, value } => self.emit_assignment(ctx, target, value)?,
        };
        Ok(Some(value))
    }

    /// Emit an expression that must produce a value.
    fn emit_value(&mut self, ctx: &mut FuncCtx, expr: &Node<Expr>) -> Result<Value, LowerError> {
        self.emit_expr(ctx, expr)?
            .ok_or(LowerError::VoidValue { span: expr.span })
    }

    /// `null` is the null object; any other name not bound in the current
    /// frame is bound to a fresh `newobj(null)`.
    pub(crate) fn emit_identifier(&mut self, ctx: &mut FuncCtx, ident: &Ident) -> Value {
        if ident.is_null() {
            return Value::Const(Constant::Null);
        }

        match self.scopes.lookup(&ident.name) {
            Some(binding) => {
                let temp = ctx.add_temp(binding.ty);
                ctx.emit(Instruction::Assign {
                    dest: Place::Temp(temp),
                    value: RValue::Use(Value::Local(binding.local)),
                });
                Value::Temp(temp)
            }
            None => {
                trace!(name = %ident, "instantiating object");
                let obj = self.emit_runtime_call(
                    ctx,
                    builtins::NEW_OBJ,
                    vec![Value::Const(Constant::Null)],
                    IrType::Ptr,
                );
                let local = ctx.add_local(IrType::Ptr);
                ctx.emit(Instruction::Assign {
                    dest: Place::Local(local),
                    value: RValue::Use(obj.clone()),
                });
                self.scopes.bind(
                    &ident.name,
                    Binding {
                        local,
                        ty: IrType::Ptr,
                    },
                );
                obj
            }
        }
    }

    fn emit_call(
        &mut self,
        ctx: &mut FuncCtx,
        callee: &Reference,
        args: &[Node<Expr>],
    ) -> Result<Option<Value>, LowerError> {
        let head = callee.first();
        let name = &head.value.name;
        if !callee.is_single() {
            debug!(callee = %callee, "calling `{}`, trailing path ignored", name);
        }

        let signature = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| LowerError::UndefinedFunction {
                name: name.clone(),
                span: head.span,
            })?;

        if signature.params.len() != args.len() {
            return Err(LowerError::ArityMismatch {
                name: name.clone(),
                expected: signature.params.len(),
                found: args.len(),
                span: callee.span(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.emit_value(ctx, arg)?);
        }

        trace!(%name, args = values.len(), "call");
        if signature.return_type == IrType::Void {
            ctx.emit(Instruction::Call {
                dest: None,
                callee: name.clone(),
                args: values,
            });
            Ok(None)
        } else {
            Ok(Some(self.emit_runtime_call(ctx, name, values, signature.return_type)))
        }
    }

    fn emit_binary(
        &mut self,
        ctx: &mut FuncCtx,
        left: &Node<Expr>,
        op: BinaryOp,
        right: &Node<Expr>,
        span: Span,
    ) -> Result<Value, LowerError> {
        let ir_op = match op {
            BinaryOp::Add => BinOp::Add,
            BinaryOp::Sub => BinOp::Sub,
            BinaryOp::Mul => BinOp::Mul,
            BinaryOp::Div => BinOp::Div,
            _ => return Err(LowerError::UnsupportedOperator { op, span }),
        };

        let left = self.emit_value(ctx, left)?;
        let right = self.emit_value(ctx, right)?;

        let ty = if ctx.func.value_type(&left) == IrType::F64 || ctx.func.value_type(&right) == IrType::F64 {
            IrType::F64
        } else {
            IrType::I64
        };

        let temp = ctx.add_temp(ty);
        ctx.emit(Instruction::Assign {
            dest: Place::Temp(temp),
            value: RValue::BinaryOp {
                op: ir_op,
                left,
                right,
            },
        });
        Ok(Value::Temp(temp))
    }

    /// `x = v` stores into the binding of `x`; `a.b.c = v` becomes
    /// `putSlot(<a.b>, "c", v)`. The value of the expression is `v`.
    fn emit_assignment(
        &mut self,
        ctx: &mut FuncCtx,
        target: &Reference,
        value: &Node<Expr>,
    ) -> Result<Value, LowerError> {
        if target.is_single() {
            let ident = target.first();
            if ident.value.is_null() {
                return Err(LowerError::InvalidAssignmentTarget {
                    name: ident.value.name.clone(),
                    span: ident.span,
                });
            }

            let rhs = self.emit_value(ctx, value)?;
            let binding = match self.scopes.lookup(&ident.value.name) {
                Some(binding) => binding,
                None => {
                    let ty = ctx.func.value_type(&rhs);
                    let binding = Binding {
                        local: ctx.add_local(ty),
                        ty,
                    };
                    trace!(name = %ident.value, %ty, "declared by assignment");
                    self.scopes.bind(&ident.value.name, binding);
                    binding
                }
            };

            ctx.emit(Instruction::Assign {
                dest: Place::Local(binding.local),
                value: RValue::Use(rhs.clone()),
            });
            return Ok(rhs);
        }

        let base = self.resolve_reference(ctx, target, true);
        let key = self.slot_key(&target.last().value.name);
        let rhs = self.emit_value(ctx, value)?;
        trace!(slot = %target.last().value, "putSlot");
        ctx.emit(Instruction::Call {
            dest: None,
            callee: builtins::PUT_SLOT.to_string(),
            args: vec![base, key, rhs.clone()],
        });
        Ok(rhs)
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Interned slot name as a string constant.
    pub(crate) fn slot_key(&mut self, name: &str) -> Value {
        self.module.intern_string(name.to_string());
        Value::Const(Constant::Str(name.to_string()))
    }

    /// Emit `temp = callee(args)` and return the temp.
    pub(crate) fn emit_runtime_call(
        &mut self,
        ctx: &mut FuncCtx,
        callee: &str,
        args: Vec<Value>,
        ret: IrType,
    ) -> Value {
        let temp = ctx.add_temp(ret);
        ctx.emit(Instruction::Call {
            dest: Some(Place::Temp(temp)),
            callee: callee.to_string(),
            args,
        });
        Value::Temp(temp)
    }
}

impl Default for Lowerer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(source: &str) -> Result<IrModule, LowerError> {
        let program = proteus_parser::parse_source(source, 0).expect("source should parse");
        lower_program(&program)
    }

    fn entry(module: &IrModule) -> &IrFunction {
        module.find_function(builtins::ENTRY).expect("entry function")
    }

    fn instructions(func: &IrFunction) -> &[Instruction] {
        &func.block(func.entry_block).instructions
    }

    /// Argument lists of every call to `callee`, in emission order.
    fn calls<'a>(func: &'a IrFunction, callee: &str) -> Vec<&'a [Value]> {
        instructions(func)
            .iter()
            .filter_map(|instr| match instr {
                Instruction::Call { callee: name, args, .. } if name == callee => Some(args.as_slice()),
                _ => None,
            })
            .collect()
    }

    fn str_const(s: &str) -> Value {
        Value::Const(Constant::Str(s.to_string()))
    }

    #[test]
    fn test_module_layout() {
        let module = lower("").unwrap();

        let newobj = module.find_extern("newobj").unwrap();
        assert_eq!(newobj.params, vec![IrType::Ptr]);
        assert_eq!(newobj.return_type, IrType::Ptr);

        let get_slot = module.find_extern("getSlot").unwrap();
        assert_eq!(get_slot.params, vec![IrType::Ptr, IrType::Str, IrType::I64]);
        assert_eq!(get_slot.return_type, IrType::Ptr);

        let put_slot = module.find_extern("putSlot").unwrap();
        assert_eq!(put_slot.params, vec![IrType::Ptr, IrType::Str, IrType::Ptr]);
        assert_eq!(put_slot.return_type, IrType::Void);

        let objalloc = module.find_function("objalloc").unwrap();
        assert!(objalloc.params.is_empty());
        assert_eq!(objalloc.return_type, IrType::Ptr);
        assert_eq!(calls(objalloc, "newobj"), vec![&[Value::Const(Constant::Null)][..]]);

        let main = module.functions.last().unwrap();
        assert_eq!(main.name, "main");
        assert!(main.params.is_empty());
        assert_eq!(main.return_type, IrType::Void);
        assert!(main.is_public);
        assert_eq!(main.block(main.entry_block).terminator, Terminator::Return(None));
    }

    #[test]
    fn test_fresh_name_allocates_once() {
        let module = lower("x; x;").unwrap();
        let main = entry(&module);

        assert_eq!(calls(main, "newobj").len(), 1);
        assert_eq!(calls(main, "newobj")[0], &[Value::Const(Constant::Null)][..]);

        // The second mention loads the local bound by the first
        let bound = match &instructions(main)[1] {
            Instruction::Assign { dest: Place::Local(local), .. } => *local,
            other => panic!("expected binding store, got {:?}", other),
        };
        assert_eq!(main.local_type(bound), IrType::Ptr);
        assert!(matches!(
            &instructions(main)[2],
            Instruction::Assign { dest: Place::Temp(_), value: RValue::Use(Value::Local(l)) } if *l == bound
        ));
    }

    #[test]
    fn test_null_is_a_constant() {
        let module = lower("null;").unwrap();
        assert!(calls(entry(&module), "newobj").is_empty());
    }

    #[test]
    fn test_reference_chain_emits_n_minus_one_lookups() {
        let module = lower("a.b.c.d;").unwrap();
        let main = entry(&module);

        assert_eq!(calls(main, "newobj").len(), 1);
        let lookups = calls(main, "getSlot");
        assert_eq!(lookups.len(), 3);
        for (args, key) in lookups.iter().zip(["b", "c", "d"]) {
            assert_eq!(args[1], str_const(key));
            assert_eq!(args[2], Value::Const(Constant::I64(1)));
        }
        assert!(module.string_index("b").is_some());
    }

    #[test]
    fn test_chain_assignment_skips_last_lookup() {
        let module = lower("a.b.c.d = 1;").unwrap();
        let main = entry(&module);

        let lookups = calls(main, "getSlot");
        assert_eq!(lookups.len(), 2);
        assert!(lookups.iter().all(|args| args[2] == Value::Const(Constant::I64(1))));

        let stores = calls(main, "putSlot");
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0][1], str_const("d"));
        assert_eq!(stores[0][2], Value::Const(Constant::I64(1)));
    }

    #[test]
    fn test_slot_store_on_fresh_object() {
        let module = lower("x.y = 5;").unwrap();
        let main = entry(&module);

        assert_eq!(calls(main, "newobj").len(), 1);
        assert!(calls(main, "getSlot").is_empty());

        let stores = calls(main, "putSlot");
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0][1], str_const("y"));
        assert_eq!(stores[0][2], Value::Const(Constant::I64(5)));
    }

    #[test]
    fn test_assign_chain_to_fresh_local() {
        let module = lower("a = b.c.d;").unwrap();
        let main = entry(&module);

        assert_eq!(calls(main, "newobj").len(), 1);
        let lookups = calls(main, "getSlot");
        assert_eq!(lookups.len(), 2);
        assert_eq!(lookups[0][1], str_const("c"));
        assert_eq!(lookups[1][1], str_const("d"));

        // `a` was unbound, so it takes the type of the slot value
        let last = instructions(main).last().unwrap();
        match last {
            Instruction::Assign {
                dest: Place::Local(local),
                value: RValue::Use(Value::Temp(_)),
            } => assert_eq!(main.local_type(*local), IrType::Ptr),
            other => panic!("expected store into `a`, got {:?}", other),
        }
    }

    #[test]
    fn test_function_declaration() {
        let module = lower("int add(int a, int b) { return a + b; }").unwrap();
        let add = module.find_function("add").unwrap();

        assert_eq!(add.params, vec![(LocalId(0), IrType::I64), (LocalId(1), IrType::I64)]);
        assert_eq!(add.return_type, IrType::I64);
        assert!(!add.is_public);

        // Both arguments are copied into fresh locals before the body runs
        assert!(matches!(
            &instructions(add)[0],
            Instruction::Assign { dest: Place::Local(LocalId(2)), value: RValue::Use(Value::Local(LocalId(0))) }
        ));
        assert!(matches!(
            &instructions(add)[1],
            Instruction::Assign { dest: Place::Local(LocalId(3)), value: RValue::Use(Value::Local(LocalId(1))) }
        ));

        match &add.block(add.entry_block).terminator {
            Terminator::Return(Some(Value::Temp(temp))) => assert_eq!(add.temp_type(*temp), IrType::I64),
            other => panic!("expected value return, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_return_uses_default() {
        let module = lower("object make() { x; } int count() { 1; }").unwrap();

        let make = module.find_function("make").unwrap();
        assert_eq!(
            make.block(make.entry_block).terminator,
            Terminator::Return(Some(Value::Const(Constant::Null)))
        );

        let count = module.find_function("count").unwrap();
        assert_eq!(
            count.block(count.entry_block).terminator,
            Terminator::Return(Some(Value::Const(Constant::I64(0))))
        );
    }

    #[test]
    fn test_last_return_wins() {
        let module = lower("int f() { return 1; return 2; }").unwrap();
        let f = module.find_function("f").unwrap();
        assert_eq!(
            f.block(f.entry_block).terminator,
            Terminator::Return(Some(Value::Const(Constant::I64(2))))
        );
    }

    #[test]
    fn test_function_scope_does_not_see_outer_names() {
        let module = lower("x; object f() { return x; }").unwrap();
        let f = module.find_function("f").unwrap();
        assert_eq!(calls(f, "newobj").len(), 1);
    }

    #[test]
    fn test_recursive_call_resolves() {
        let module = lower("int f(int n) { return f(n); }").unwrap();
        let f = module.find_function("f").unwrap();
        assert_eq!(calls(f, "f").len(), 1);
    }

    #[test]
    fn test_variable_declaration() {
        let module = lower("double d = 2; d;").unwrap();
        let main = entry(&module);

        assert!(matches!(
            &instructions(main)[0],
            Instruction::Assign { dest: Place::Local(_), value: RValue::Use(Value::Const(Constant::F64(_))) }
        ));
        assert!(matches!(
            &instructions(main)[1],
            Instruction::Assign { dest: Place::Local(_), value: RValue::Use(Value::Const(Constant::I64(2))) }
        ));
        assert!(calls(main, "newobj").is_empty());
    }

    #[test]
    fn test_mixed_arithmetic_is_double() {
        let module = lower("x = 1 + 2.5;").unwrap();
        let main = entry(&module);
        match &instructions(main)[0] {
            Instruction::Assign { dest: Place::Temp(temp), value: RValue::BinaryOp { op: BinOp::Add, .. } } => {
                assert_eq!(main.temp_type(*temp), IrType::F64)
            }
            other => panic!("expected addition, got {:?}", other),
        }
    }

    #[test]
    fn test_string_literals_are_interned() {
        let module = lower(r#"print_str("hi"); print_str("hi");"#).unwrap();
        assert_eq!(module.string_literals, vec!["hi".to_string()]);
        assert_eq!(calls(entry(&module), "print_str").len(), 2);
    }

    #[test]
    fn test_extern_declaration() {
        let module = lower("extern int abs(int n); abs(0 - 3);").unwrap();
        let ext = module.find_extern("abs").unwrap();
        assert_eq!(ext.params, vec![IrType::I64]);
        assert_eq!(calls(entry(&module), "abs").len(), 1);

        // Restating a runtime extern with its own signature is accepted
        assert!(lower("extern void print_int(int n); print_int(1);").is_ok());
    }

    #[test]
    fn test_call_uses_first_segment() {
        let module = lower("print_int.anything(1);").unwrap();
        assert_eq!(calls(entry(&module), "print_int").len(), 1);
    }

    #[test]
    fn test_undefined_function() {
        let err = lower("missing(1);").unwrap_err();
        assert!(matches!(err, LowerError::UndefinedFunction { ref name, .. } if name == "missing"));
        assert_eq!(err.to_string(), "undefined function `missing`");
    }

    #[test]
    fn test_unsupported_operator() {
        let err = lower("x = 1 < 2;").unwrap_err();
        assert!(matches!(err, LowerError::UnsupportedOperator { op: BinaryOp::Lt, .. }));
    }

    #[test]
    fn test_arity_mismatch() {
        let err = lower("print_int(1, 2);").unwrap_err();
        assert!(matches!(err, LowerError::ArityMismatch { expected: 1, found: 2, .. }));
    }

    #[test]
    fn test_duplicate_function() {
        let err = lower("int f() { return 1; } int f() { return 2; }").unwrap_err();
        assert!(matches!(err, LowerError::DuplicateFunction { ref name, .. } if name == "f"));

        let err = lower("void main() { }").unwrap_err();
        assert!(matches!(err, LowerError::DuplicateFunction { .. }));

        let err = lower("extern int print_int(int n);").unwrap_err();
        assert!(matches!(err, LowerError::DuplicateFunction { .. }));
    }

    #[test]
    fn test_void_value() {
        let err = lower("x = print_int(1);").unwrap_err();
        assert!(matches!(err, LowerError::VoidValue { .. }));
    }

    #[test]
    fn test_void_return_value() {
        let err = lower("int f() { return print_int(1); }").unwrap_err();
        assert!(matches!(err, LowerError::VoidValue { .. }));

        // Void functions and the top level may still return a void call
        assert!(lower("void g() { return print_int(1); }").is_ok());
        assert!(lower("return print_int(1);").is_ok());
    }

    #[test]
    fn test_void_variable() {
        let err = lower("void v;").unwrap_err();
        assert!(matches!(err, LowerError::VoidVariable { ref name, .. } if name == "v"));
    }

    #[test]
    fn test_assign_to_null() {
        let err = lower("null = 1;").unwrap_err();
        assert!(matches!(err, LowerError::InvalidAssignmentTarget { .. }));
    }

    #[test]
    fn test_error_span_points_at_callee() {
        let err = lower("x;\nnope();").unwrap_err();
        assert_eq!(err.span(), Span::new(3, 7, 0));
    }

    #[test]
    fn test_hand_built_program() {
        let span = Span::new(0, 0, 0);
        let ident = |name: &str| Node::new(Ident::new(name), span);
        let target = Reference::from_segments(vec![ident("o"), ident("k")]).unwrap();
        let program = Program::new(
            Block::new(vec![Node::new(
                Stmt::Expr(Node::new(
                    Expr::Assignment {
                        target,
                        value: Box::new(Node::new(Expr::Str("v".to_string()), span)),
                    },
                    span,
                )),
                span,
            )]),
            span,
        );

        let module = lower_program(&program).unwrap();
        let stores = calls(entry(&module), "putSlot");
        assert_eq!(stores[0][1], str_const("k"));
        assert_eq!(stores[0][2], str_const("v"));
    }
}
