//! Block-scoped symbol table.
//!
//! Only the innermost frame is ever consulted: a name missing from it is a
//! fresh object, never a reference to an enclosing block.

use std::collections::HashMap;

use crate::{IrType, LocalId, Value};

/// Storage bound to a variable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub local: LocalId,
    pub ty: IrType,
}

/// One frame per function body (and one for the program entry).
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Binding>,
    pending_return: Option<Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value recorded by the last return statement, if any.
    pub fn into_pending_return(self) -> Option<Value> {
        self.pending_return
    }
}

/// Stack of scope frames, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Scope>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.frames.push(Scope::new());
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.frames.pop()
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Look a name up in the top frame only.
    pub fn lookup(&self, name: &str) -> Option<Binding> {
        self.frames.last().and_then(|frame| frame.vars.get(name).copied())
    }

    pub fn bind(&mut self, name: &str, binding: Binding) {
        if let Some(frame) = self.frames.last_mut() {
            frame.vars.insert(name.to_string(), binding);
        }
    }

    /// Record the enclosing function's result. A later return overwrites it.
    pub fn set_pending_return(&mut self, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pending_return = Some(value);
        }
    }
}
