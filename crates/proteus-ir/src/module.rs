//! IR module definition representing a compilation unit.

use std::collections::HashMap;

use crate::{FuncSignature, IrFunction, IrType};

/// An extern (imported) function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternFunction {
    /// Function name (as it appears in the object file)
    pub name: String,
    /// Parameter types
    pub params: Vec<IrType>,
    /// Return type
    pub return_type: IrType,
}

impl ExternFunction {
    pub fn signature(&self) -> FuncSignature {
        FuncSignature {
            params: self.params.clone(),
            return_type: self.return_type,
        }
    }
}

/// A complete IR module representing a compilation unit.
#[derive(Debug, Clone)]
pub struct IrModule {
    /// All functions in this module
    pub functions: Vec<IrFunction>,

    /// String literals used in the module (for deduplication)
    pub string_literals: Vec<String>,

    /// Extern function declarations (runtime or FFI)
    pub extern_functions: Vec<ExternFunction>,

    /// HashMap for O(1) string dedup lookups
    string_index_map: HashMap<String, usize>,
}

impl IrModule {
    /// Creates a new empty IR module.
    pub fn new() -> Self {
        IrModule {
            functions: Vec::new(),
            string_literals: Vec::new(),
            extern_functions: Vec::new(),
            string_index_map: HashMap::new(),
        }
    }

    /// Adds an extern function declaration.
    pub fn add_extern_function(&mut self, name: String, params: Vec<IrType>, return_type: IrType) {
        self.extern_functions.push(ExternFunction {
            name,
            params,
            return_type,
        });
    }

    /// Adds a function to the module.
    pub fn add_function(&mut self, function: IrFunction) {
        self.functions.push(function);
    }

    /// Interns a string literal and returns its index.
    pub fn intern_string(&mut self, s: String) -> usize {
        if let Some(&index) = self.string_index_map.get(&s) {
            index
        } else {
            let index = self.string_literals.len();
            self.string_index_map.insert(s.clone(), index);
            self.string_literals.push(s);
            index
        }
    }

    /// Index of an interned string literal.
    pub fn string_index(&self, s: &str) -> Option<usize> {
        self.string_index_map.get(s).copied()
    }

    /// Finds a function by name.
    pub fn find_function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Finds an extern declaration by name.
    pub fn find_extern(&self, name: &str) -> Option<&ExternFunction> {
        self.extern_functions.iter().find(|f| f.name == name)
    }

    /// Signature of any callable (defined or extern) by name.
    pub fn callable_signature(&self, name: &str) -> Option<FuncSignature> {
        self.find_function(name)
            .map(IrFunction::signature)
            .or_else(|| self.find_extern(name).map(ExternFunction::signature))
    }
}

impl Default for IrModule {
    fn default() -> Self {
        Self::new()
    }
}
