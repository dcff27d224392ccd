//! IR instructions and control flow primitives.

use std::fmt;

use proteus_ast::Span;

use crate::{BlockId, Place, RValue, Value};

/// A single IR instruction within a basic block.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Assignment: dest = value
    Assign {
        dest: Place,
        value: RValue,
    },

    /// Call of a module function or extern by name: dest = callee(args)
    Call {
        dest: Option<Place>,
        callee: String,
        args: Vec<Value>,
    },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, value } => write!(f, "{} = {}", dest, value),
            Instruction::Call { dest, callee, args } => {
                if let Some(dest) = dest {
                    write!(f, "{} = ", dest)?;
                }
                write!(f, "call {}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Terminator instruction that ends a basic block.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminator {
    /// Return from function
    Return(Option<Value>),

    /// Block not yet terminated
    Unreachable,
}

impl fmt::Display for Terminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminator::Return(Some(value)) => write!(f, "return {}", value),
            Terminator::Return(None) => write!(f, "return"),
            Terminator::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// A basic block in the control flow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Unique identifier for this block
    pub id: BlockId,

    /// Instructions in this block (excluding terminator)
    pub instructions: Vec<Instruction>,

    /// Terminator instruction (control flow exit)
    pub terminator: Terminator,

    /// Optional source span for debugging
    pub span: Option<Span>,
}

impl Block {
    /// Creates a new basic block with the given ID.
    pub fn new(id: BlockId) -> Self {
        Block {
            id,
            instructions: Vec::new(),
            terminator: Terminator::Unreachable,
            span: None,
        }
    }

    /// Adds an instruction to this block.
    pub fn push_instruction(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Sets the terminator for this block.
    pub fn set_terminator(&mut self, terminator: Terminator) {
        self.terminator = terminator;
    }
}
