//! # Proteus Parser
//!
//! Recursive descent parser for Proteus.
//! Uses precedence climbing for binary expressions.

use proteus_ast::*;
use proteus_lexer::{Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod expr;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Tokenize and parse a whole source file.
pub fn parse_source(source: &str, file_id: usize) -> Result<Program, Vec<ParseError>> {
    let tokens = proteus_lexer::Lexer::with_file_id(source, file_id).tokenize();
    Parser::new(tokens).parse_program()
}

// =============================================================================
// Tests
// =============================================================================
