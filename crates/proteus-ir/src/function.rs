//! IR function definition.

use proteus_ast::Span;

use crate::{Block, BlockId, FuncId, FuncSignature, IrType, LocalId, TempId, Value};

/// An IR function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct IrFunction {
    /// Function identifier
    pub id: FuncId,

    /// Function name (the symbol it is linked under)
    pub name: String,

    /// Function parameters with their types
    pub params: Vec<(LocalId, IrType)>,

    /// Return type
    pub return_type: IrType,

    /// Local variables (including params) with their types
    pub locals: Vec<(LocalId, IrType)>,

    /// Temporary values with their types
    pub temps: Vec<(TempId, IrType)>,

    /// Basic blocks comprising the function body
    pub blocks: Vec<Block>,

    /// Entry block (first block to execute)
    pub entry_block: BlockId,

    /// Whether this function is public/exported
    pub is_public: bool,

    /// Optional source span for debugging
    pub span: Option<Span>,
}

impl IrFunction {
    /// Creates a new function with the given name and signature.
    pub fn new(id: FuncId, name: String, params: Vec<(LocalId, IrType)>, return_type: IrType) -> Self {
        IrFunction {
            id,
            name,
            params: params.clone(),
            return_type,
            locals: params,
            temps: Vec::new(),
            blocks: Vec::new(),
            entry_block: BlockId(0),
            is_public: false,
            span: None,
        }
    }

    /// Adds a new local variable.
    pub fn add_local(&mut self, ty: IrType) -> LocalId {
        let id = LocalId(self.locals.len());
        self.locals.push((id, ty));
        id
    }

    /// Adds a new temporary value.
    pub fn add_temp(&mut self, ty: IrType) -> TempId {
        let id = TempId(self.temps.len());
        self.temps.push((id, ty));
        id
    }

    /// Creates a new basic block.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(Block::new(id));
        id
    }

    /// Gets a mutable reference to a block.
    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.blocks[id.0]
    }

    /// Gets an immutable reference to a block.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    pub fn local_type(&self, id: LocalId) -> IrType {
        self.locals.get(id.0).map_or(IrType::Void, |(_, ty)| *ty)
    }

    pub fn temp_type(&self, id: TempId) -> IrType {
        self.temps.get(id.0).map_or(IrType::Void, |(_, ty)| *ty)
    }

    /// Type of a value used inside this function.
    pub fn value_type(&self, value: &Value) -> IrType {
        match value {
            Value::Const(c) => c.ty(),
            Value::Local(id) => self.local_type(*id),
            Value::Temp(id) => self.temp_type(*id),
        }
    }

    /// Returns the function signature.
    pub fn signature(&self) -> FuncSignature {
        FuncSignature {
            params: self.params.iter().map(|(_, ty)| *ty).collect(),
            return_type: self.return_type,
        }
    }
}
